use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::catalog;
use crate::error::{StoreError, StoreResult};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Embedded SQLite store. The pool is opened, migrated and seeded on first
/// use; concurrent first callers wait on the same initialization.
pub struct Database {
    path: PathBuf,
    max_connections: u32,
    pool: OnceCell<SqlitePool>,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>, max_connections: u32) -> Self {
        Self {
            path: path.into(),
            max_connections: max_connections.max(1),
            pool: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_initialized(&self) -> bool {
        self.pool.initialized()
    }

    /// Returns the shared pool, initializing the store if needed. A failed
    /// initialization is reported and retried on the next call.
    pub async fn pool(&self) -> StoreResult<&SqlitePool> {
        self.pool.get_or_try_init(|| self.open()).await
    }

    async fn open(&self) -> StoreResult<SqlitePool> {
        info!(path = %self.path.display(), "opening store");
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(dir) {
                error!(error = %e, dir = %dir.display(), "create store directory failed");
                return Err(StoreError::Init(sqlx::Error::Io(e)));
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                error!(error = %e, "connect to store failed");
                StoreError::Init(e)
            })?;

        MIGRATOR.run(&pool).await.map_err(|e| {
            error!(error = %e, "schema migration failed");
            StoreError::Init(e.into())
        })?;

        catalog::seed::seed_if_empty(&pool).await.map_err(|e| {
            error!(error = %e, "catalog seeding failed");
            StoreError::Init(e)
        })?;

        info!("store ready");
        Ok(pool)
    }

    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
        }
    }
}

/// Money columns are stored as canonical decimal text.
pub(crate) fn decode_decimal(entity: &'static str, id: i64, raw: &str) -> StoreResult<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|e| StoreError::Corrupt {
        entity,
        id,
        reason: format!("bad decimal {raw:?}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_stored_decimals() {
        assert_eq!(decode_decimal("order", 1, "25.81").unwrap().to_string(), "25.81");
        assert!(matches!(
            decode_decimal("order", 7, "abc"),
            Err(StoreError::Corrupt { id: 7, .. })
        ));
    }

    #[tokio::test]
    async fn pool_is_opened_lazily() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("store.db");
        let db = Database::new(&path, 2);
        assert!(!db.is_initialized());
        assert!(!path.exists());

        db.pool().await.expect("init");
        assert!(db.is_initialized());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn concurrent_first_calls_share_one_pool() {
        let tmp = tempfile::tempdir().unwrap();
        let db = Database::new(tmp.path().join("store.db"), 2);
        let (a, b) = tokio::join!(db.pool(), db.pool());
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(std::ptr::eq(a, b));

        let materials: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM materials")
            .fetch_one(a)
            .await
            .unwrap();
        assert_eq!(materials, 5);
    }

    #[tokio::test]
    async fn unusable_location_is_an_init_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let db = Database::new(blocker.join("store.db"), 1);
        let err = db.pool().await.unwrap_err();
        assert!(matches!(err, StoreError::Init(_)));
        assert!(!db.is_initialized());
    }
}
