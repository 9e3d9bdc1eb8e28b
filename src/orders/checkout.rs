use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::repo;
use super::services::seal_order;
use crate::catalog::{Handle, Hinge, Material};
use crate::error::{StoreError, StoreResult};
use crate::orders::dto::CustomerContact;
use crate::orders::pricing::{compute_cost, PricingError};
use crate::orders::repo_types::{Order, OrderItem};
use crate::state::AppState;

/// What the customer configured for one cabinet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CabinetSpec {
    pub room: String,
    pub cabinet_type: String,
    pub front_type: String,
    pub width: i32,
    pub height: i32,
    pub thickness: i32,
    pub handedness: String,
}

/// A priced cabinet waiting for checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftItem {
    pub spec: CabinetSpec,
    pub material_id: i64,
    pub handle_id: i64,
    pub hinge_id: i64,
    pub cost: Decimal,
}

impl DraftItem {
    /// `FRONT CABINET HANDEDNESS`, as shown in the cart.
    pub fn display_name(&self) -> String {
        format!(
            "{} {} {}",
            self.spec.front_type, self.spec.cabinet_type, self.spec.handedness
        )
    }
}

/// Cart contents collected before the customer confirms an order.
#[derive(Debug, Clone, Default)]
pub struct OrderDraft {
    pub user_id: i64,
    items: Vec<DraftItem>,
}

impl OrderDraft {
    pub fn new(user_id: i64) -> Self {
        Self { user_id, items: Vec::new() }
    }

    /// Price the cabinet against the chosen catalog entries and add it.
    pub fn add_item(
        &mut self,
        spec: CabinetSpec,
        material: &Material,
        handle: &Handle,
        hinge: &Hinge,
    ) -> Result<&DraftItem, PricingError> {
        let cost = compute_cost(material, handle, hinge, spec.width, spec.height, spec.thickness)?;
        self.items.push(DraftItem {
            spec,
            material_id: material.id,
            handle_id: handle.id,
            hinge_id: hinge.id,
            cost,
        });
        Ok(&self.items[self.items.len() - 1])
    }

    pub fn remove_item(&mut self, index: usize) -> Option<DraftItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn items(&self) -> &[DraftItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.items.iter().map(|i| i.cost).sum()
    }
}

/// Store the draft as a new order with its lines in one transaction.
/// Returns the new order id.
#[instrument(skip(st, draft, contact), fields(user_id = draft.user_id, items = draft.items.len()))]
pub async fn place_order(
    st: &AppState,
    draft: &OrderDraft,
    contact: CustomerContact,
) -> StoreResult<i64> {
    if draft.is_empty() {
        return Err(StoreError::InvalidInput("order has no items".into()));
    }
    let db = st.pool().await?;

    let now = OffsetDateTime::now_utc();
    let mut order = Order::new(draft.user_id, draft.total()).with_contact(contact);
    order.created_date = now;
    seal_order(&st.cipher, &mut order);

    let mut tx = db.begin().await?;
    let order_id = repo::insert_order(&mut *tx, &order).await?;
    for d in &draft.items {
        let item = OrderItem {
            id: 0,
            order_id,
            room: d.spec.room.clone(),
            cabinet_type: d.spec.cabinet_type.clone(),
            front_type: d.spec.front_type.clone(),
            width: d.spec.width,
            height: d.spec.height,
            thickness: d.spec.thickness,
            handedness: d.spec.handedness.clone(),
            material_id: d.material_id,
            handle_id: d.handle_id,
            hinge_id: d.hinge_id,
            cost: d.cost,
            created_date: now,
        };
        repo::insert_item(&mut *tx, &item).await?;
    }
    tx.commit().await?;

    info!(order_id, total = %order.total_cost, "order placed");
    Ok(order_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{get_handle_by_id, get_hinge_by_id, get_material_by_id};
    use crate::orders::services::{get_order_by_id, get_order_details, get_order_items};
    use crate::state::test_state;
    use rust_decimal_macros::dec;

    fn base_cabinet() -> CabinetSpec {
        CabinetSpec {
            room: "Keittiö".into(),
            cabinet_type: "Alakaappi".into(),
            front_type: "Ovi".into(),
            width: 600,
            height: 720,
            thickness: 18,
            handedness: "Vasen".into(),
        }
    }

    fn contact() -> CustomerContact {
        CustomerContact {
            name: "Maija Virtanen".into(),
            email: "maija@example.fi".into(),
            phone: "0501112222".into(),
        }
    }

    async fn catalog(st: &AppState, m: i64, h: i64, g: i64) -> (Material, Handle, Hinge) {
        (
            get_material_by_id(st, m).await.unwrap().unwrap(),
            get_handle_by_id(st, h).await.unwrap().unwrap(),
            get_hinge_by_id(st, g).await.unwrap().unwrap(),
        )
    }

    #[tokio::test]
    async fn draft_prices_items_and_sums_total() {
        let (_tmp, st) = test_state();
        let (m, h, g) = catalog(&st, 1, 2, 2).await;
        let (m2, none_handle, no_hinge) = catalog(&st, 4, 1, 1).await;

        let mut draft = OrderDraft::new(3);
        let first = draft.add_item(base_cabinet(), &m, &h, &g).unwrap();
        assert_eq!(first.cost, dec!(25.81));
        assert_eq!(first.display_name(), "Ovi Alakaappi Vasen");

        // 18 * 400 * 720 / 1e6 * 0.50 = 2.592
        let spec = CabinetSpec { width: 400, ..base_cabinet() };
        draft.add_item(spec, &m2, &none_handle, &no_hinge).unwrap();

        assert_eq!(draft.items().len(), 2);
        assert_eq!(draft.items()[1].cost, dec!(2.59));
        assert_eq!(draft.total(), dec!(28.40));

        assert!(draft.remove_item(5).is_none());
        assert_eq!(draft.remove_item(1).unwrap().material_id, 4);
        assert_eq!(draft.total(), dec!(25.81));
    }

    #[tokio::test]
    async fn negative_dimensions_are_not_added() {
        let (_tmp, st) = test_state();
        let (m, h, g) = catalog(&st, 1, 2, 2).await;
        let mut draft = OrderDraft::new(0);
        let spec = CabinetSpec { height: -1, ..base_cabinet() };
        assert!(matches!(
            draft.add_item(spec, &m, &h, &g),
            Err(PricingError::NegativeDimension { .. })
        ));
        assert!(draft.is_empty());
    }

    #[tokio::test]
    async fn place_order_stores_order_and_lines() {
        let (_tmp, st) = test_state();
        let (m, h, g) = catalog(&st, 1, 2, 2).await;
        let mut draft = OrderDraft::new(9);
        draft.add_item(base_cabinet(), &m, &h, &g).unwrap();
        draft.add_item(base_cabinet(), &m, &h, &g).unwrap();

        let id = place_order(&st, &draft, contact()).await.unwrap();

        let order = get_order_by_id(&st, id).await.unwrap().unwrap();
        assert_eq!(order.user_id, 9);
        assert_eq!(order.total_cost, dec!(51.62));
        assert_eq!(order.contact(&st.cipher), contact());

        let items = get_order_items(&st, id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.order_id == id && i.cost == dec!(25.81)));

        let details = get_order_details(&st, id).await.unwrap().unwrap();
        assert_eq!(details.items[0].material_name, "Tammi Luonnonvalkoinen");
    }

    #[tokio::test]
    async fn empty_draft_is_rejected() {
        let (_tmp, st) = test_state();
        let err = place_order(&st, &OrderDraft::new(1), contact()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
        assert!(get_order_by_id(&st, 1).await.unwrap().is_none());
    }
}
