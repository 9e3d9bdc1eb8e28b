pub mod dto;
mod repo;
pub mod services;

pub use dto::{AdminStatistics, MaterialStats};
pub use services::{admin_statistics, get_popular_materials, try_admin_statistics};
