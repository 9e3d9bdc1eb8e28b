use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::crypto::FieldCipher;
use crate::db::decode_decimal;
use crate::error::StoreError;
use crate::orders::dto::CustomerContact;

/// Lifecycle label of an order. Stored as its Finnish label.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Uusi")]
    New,
    #[serde(rename = "Käsittelyssä")]
    Processing,
    #[serde(rename = "Valmis")]
    Ready,
    #[serde(rename = "Toimitettu")]
    Delivered,
    #[serde(rename = "Peruutettu")]
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::New,
        OrderStatus::Processing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::New => "Uusi",
            OrderStatus::Processing => "Käsittelyssä",
            OrderStatus::Ready => "Valmis",
            OrderStatus::Delivered => "Toimitettu",
            OrderStatus::Cancelled => "Peruutettu",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A customer order. The `customer_*` plaintext fields only carry values
/// that are about to be written; reads leave them empty and expose the
/// decrypted contact through [`Order::contact`].
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64, // 0 for guest checkout
    pub total_cost: Decimal,
    pub status: OrderStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
    #[serde(skip)]
    pub customer_name: Option<String>,
    #[serde(skip)]
    pub customer_email: Option<String>,
    #[serde(skip)]
    pub customer_phone: Option<String>,
    #[serde(skip)]
    pub customer_name_encrypted: String,
    #[serde(skip)]
    pub customer_email_encrypted: String,
    #[serde(skip)]
    pub customer_phone_encrypted: String,
}

impl Order {
    pub fn new(user_id: i64, total_cost: Decimal) -> Self {
        Self {
            id: 0,
            user_id,
            total_cost,
            status: OrderStatus::New,
            created_date: OffsetDateTime::now_utc(),
            customer_name: None,
            customer_email: None,
            customer_phone: None,
            customer_name_encrypted: String::new(),
            customer_email_encrypted: String::new(),
            customer_phone_encrypted: String::new(),
        }
    }

    pub fn with_contact(mut self, contact: CustomerContact) -> Self {
        self.customer_name = Some(contact.name);
        self.customer_email = Some(contact.email);
        self.customer_phone = Some(contact.phone);
        self
    }

    /// Decrypted customer contact details.
    pub fn contact(&self, cipher: &FieldCipher) -> CustomerContact {
        CustomerContact {
            name: cipher.decrypt(&self.customer_name_encrypted),
            email: cipher.decrypt(&self.customer_email_encrypted),
            phone: cipher.decrypt(&self.customer_phone_encrypted),
        }
    }

    /// Creation date as `dd.MM.yyyy`.
    pub fn formatted_created_date(&self) -> String {
        let fmt = format_description!("[day].[month].[year]");
        self.created_date
            .format(&fmt)
            .unwrap_or_else(|_| "Ei päivämäärää".to_string())
    }
}

/// One cabinet line of an order. Catalog references use 0 when nothing was
/// selected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub room: String,
    pub cabinet_type: String,
    pub front_type: String,
    pub width: i32,     // mm
    pub height: i32,    // mm
    pub thickness: i32, // mm
    pub handedness: String,
    pub material_id: i64,
    pub handle_id: i64,
    pub hinge_id: i64,
    pub cost: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
}

impl OrderItem {
    /// `WIDTHxHEIGHTxTHICKNESS`
    pub fn dimensions(&self) -> String {
        format!("{}x{}x{}", self.width, self.height, self.thickness)
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct OrderRow {
    pub id: i64,
    pub user_id: i64,
    pub total_cost: String,
    pub status: String,
    pub created_date: OffsetDateTime,
    pub customer_name_encrypted: String,
    pub customer_email_encrypted: String,
    pub customer_phone_encrypted: String,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(r: OrderRow) -> Result<Self, Self::Error> {
        let status = r.status.parse::<OrderStatus>().map_err(|e| StoreError::Corrupt {
            entity: "order",
            id: r.id,
            reason: e.to_string(),
        })?;
        Ok(Self {
            total_cost: decode_decimal("order", r.id, &r.total_cost)?,
            id: r.id,
            user_id: r.user_id,
            status,
            created_date: r.created_date,
            customer_name: None,
            customer_email: None,
            customer_phone: None,
            customer_name_encrypted: r.customer_name_encrypted,
            customer_email_encrypted: r.customer_email_encrypted,
            customer_phone_encrypted: r.customer_phone_encrypted,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct OrderItemRow {
    pub id: i64,
    pub order_id: i64,
    pub room: String,
    pub cabinet_type: String,
    pub front_type: String,
    pub width: i32,
    pub height: i32,
    pub thickness: i32,
    pub handedness: String,
    pub material_id: i64,
    pub handle_id: i64,
    pub hinge_id: i64,
    pub cost: String,
    pub created_date: OffsetDateTime,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = StoreError;

    fn try_from(r: OrderItemRow) -> Result<Self, Self::Error> {
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
            material_id: r.material_id,
            handle_id: r.handle_id,
            hinge_id: r.hinge_id,
            created_date: r.created_date,
        })
    }
}
