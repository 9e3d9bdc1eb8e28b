//! Data layer of the PintaLab cabinet ordering app: catalog, accounts,
//! orders with encrypted contact fields, GDPR export/anonymization and
//! admin reporting over one embedded SQLite store.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod gdpr;
pub mod orders;
pub mod reports;
pub mod state;

pub use config::AppConfig;
pub use error::{StoreError, StoreResult};
pub use state::AppState;
