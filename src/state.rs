use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::password::PasswordHasher;
use crate::config::AppConfig;
use crate::crypto::FieldCipher;
use crate::db::Database;
use crate::error::{StoreError, StoreResult};

/// Everything the stores and services share: one lazily opened database plus
/// the field cipher and credential hasher built from configuration.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<AppConfig>,
    pub cipher: FieldCipher,
    pub hasher: PasswordHasher,
}

impl AppState {
    /// Builds the state without touching the store; the database is opened
    /// by the first operation that needs it.
    pub fn init(config: AppConfig) -> Result<Self, StoreError> {
        let cipher = FieldCipher::from_secret(&config.security.field_key);
        let hasher = PasswordHasher::new(&config.security.password_pepper)?;
        let db = Arc::new(Database::new(
            config.database_path.clone(),
            config.max_connections,
        ));
        Ok(Self {
            db,
            config: Arc::new(config),
            cipher,
            hasher,
        })
    }

    pub async fn pool(&self) -> StoreResult<&SqlitePool> {
        self.db.pool().await
    }

    #[cfg(test)]
    pub(crate) fn fake(dir: &std::path::Path) -> Self {
        use crate::config::SecurityConfig;

        Self::init(AppConfig {
            database_path: dir.join("pintalab-test.db"),
            max_connections: 2,
            security: SecurityConfig {
                field_key: "test-field-key".into(),
                password_pepper: "test-pepper".into(),
            },
        })
        .expect("test state")
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> (tempfile::TempDir, AppState) {
    let dir = tempfile::tempdir().expect("temp dir");
    let state = AppState::fake(dir.path());
    (dir, state)
}
