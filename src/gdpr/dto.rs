use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::auth::repo_types::User;
use crate::crypto::FieldCipher;
use crate::orders::repo_types::{Order, OrderStatus};

/// Placeholder email written over an anonymized account.
pub fn anonymous_email(user_id: i64) -> String {
    format!("anonymous_{user_id}@gdpr.protected")
}

pub const ANONYMOUS_NAME: &str = "GDPR Deleted User";
pub const ANONYMOUS_PHONE: &str = "0000000000";

#[derive(Debug, Serialize)]
pub struct UserExport {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
    pub gdpr_consent: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub gdpr_consent_date: Option<OffsetDateTime>,
}

impl From<User> for UserExport {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email.unwrap_or_default(),
            name: u.name.unwrap_or_default(),
            created_date: u.created_date,
            gdpr_consent: u.gdpr_consent,
            gdpr_consent_date: u.gdpr_consent_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderExport {
    pub id: i64,
    pub total_cost: Decimal,
    pub status: OrderStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
}

impl OrderExport {
    pub fn from_order(order: &Order, cipher: &FieldCipher) -> Self {
        let contact = order.contact(cipher);
        Self {
            id: order.id,
            total_cost: order.total_cost,
            status: order.status,
            created_date: order.created_date,
            customer_name: contact.name,
            customer_email: contact.email,
            customer_phone: contact.phone,
        }
    }
}

/// Everything stored about one data subject.
#[derive(Debug, Serialize)]
pub struct UserDataExport {
    pub user: UserExport,
    pub orders: Vec<OrderExport>,
    pub export_date: String, // YYYY-MM-DD HH:MM:SS, UTC
}
