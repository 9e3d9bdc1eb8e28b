use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

use crate::db::decode_decimal;
use crate::error::StoreError;
use crate::orders::repo_types::{Order, OrderStatus, UnknownStatus};

/// Label used by the admin view for "no status filter".
pub const ALL_STATUSES_LABEL: &str = "Kaikki";

/// Customer contact details entered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

impl FromStr for StatusFilter {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == ALL_STATUSES_LABEL {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

/// Admin listing filter. Date bounds are inclusive and compare calendar
/// dates only.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: StatusFilter,
    pub from: Option<Date>,
    pub to: Option<Date>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        if let StatusFilter::Only(status) = self.status {
            if order.status != status {
                return false;
            }
        }
        let day = order.created_date.date();
        if self.from.is_some_and(|from| day < from) {
            return false;
        }
        if self.to.is_some_and(|to| day > to) {
            return false;
        }
        true
    }
}

/// Order line joined with catalog names. A name is empty when the catalog
/// row it pointed to no longer exists.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemDetail {
    pub id: i64,
    pub order_id: i64,
    pub room: String,
    pub cabinet_type: String,
    pub front_type: String,
    pub width: i32,
    pub height: i32,
    pub thickness: i32,
    pub handedness: String,
    pub material_name: String,
    pub handle_name: String,
    pub hinge_name: String,
    pub cost: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
}

#[derive(Debug, FromRow)]
pub(crate) struct OrderItemDetailRow {
    pub id: i64,
    pub order_id: i64,
    pub room: String,
    pub cabinet_type: String,
    pub front_type: String,
    pub width: i32,
    pub height: i32,
    pub thickness: i32,
    pub handedness: String,
    pub material_name: String,
    pub handle_name: String,
    pub hinge_name: String,
    pub cost: String,
    pub created_date: OffsetDateTime,
}

impl TryFrom<OrderItemDetailRow> for OrderItemDetail {
    type Error = StoreError;

    fn try_from(r: OrderItemDetailRow) -> Result<Self, Self::Error> {
        Ok(Self {
            cost: decode_decimal("order item", r.id, &r.cost)?,
            id: r.id,
            order_id: r.order_id,
            room: r.room,
            cabinet_type: r.cabinet_type,
            front_type: r.front_type,
            width: r.width,
            height: r.height,
            thickness: r.thickness,
            handedness: r.handedness,
            material_name: r.material_name,
            handle_name: r.handle_name,
            hinge_name: r.hinge_name,
            created_date: r.created_date,
        })
    }
}
