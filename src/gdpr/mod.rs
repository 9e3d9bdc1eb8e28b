pub mod dto;
pub mod services;

pub use services::{anonymize_user, export_user_data};
