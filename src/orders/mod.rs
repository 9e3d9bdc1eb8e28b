pub mod checkout;
pub mod dto;
pub mod pricing;
mod repo;
pub mod repo_types;
pub mod services;

pub(crate) use repo::replace_contact_for_user;
pub use repo_types::{Order, OrderItem, OrderStatus};
