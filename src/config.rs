use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

const DATABASE_DIR: &str = "Database";
const DATABASE_FILE: &str = "pintalab.db";

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Secret the field encryption key is derived from.
    pub field_key: String,
    /// Application-wide secret mixed into every password hash.
    pub password_pepper: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub max_connections: u32,
    pub security: SecurityConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_path = match std::env::var("PINTALAB_DATABASE_PATH") {
            Ok(p) => PathBuf::from(p),
            Err(_) => {
                let data_dir = std::env::var("PINTALAB_DATA_DIR").ok().map(PathBuf::from);
                resolve_database_path(data_dir.as_deref())
            }
        };
        let security = SecurityConfig {
            field_key: std::env::var("PINTALAB_FIELD_KEY")
                .context("PINTALAB_FIELD_KEY must be set")?,
            password_pepper: std::env::var("PINTALAB_PASSWORD_PEPPER")
                .context("PINTALAB_PASSWORD_PEPPER must be set")?,
        };
        let max_connections = std::env::var("PINTALAB_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(4);
        Ok(Self {
            database_path,
            max_connections,
            security,
        })
    }
}

/// Picks `<base>/Database/pintalab.db`, creating the directory. Falls back to
/// the working directory when the preferred location is not writable.
pub fn resolve_database_path(base: Option<&Path>) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let base = base.map(Path::to_path_buf).unwrap_or_else(|| cwd.clone());
    let dir = base.join(DATABASE_DIR);
    match std::fs::create_dir_all(&dir) {
        Ok(()) => dir.join(DATABASE_FILE),
        Err(e) => {
            warn!(
                error = %e,
                dir = %dir.display(),
                "database dir not writable; using working directory"
            );
            cwd.join(DATABASE_FILE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_into_database_subdir() {
        let tmp = tempfile::tempdir().unwrap();
        let path = resolve_database_path(Some(tmp.path()));
        assert_eq!(path, tmp.path().join("Database").join("pintalab.db"));
        assert!(tmp.path().join("Database").is_dir());
    }

    #[test]
    fn falls_back_to_working_directory() {
        let tmp = tempfile::tempdir().unwrap();
        // a regular file where the base directory should be makes create_dir_all fail
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let path = resolve_database_path(Some(&blocker));
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(path, cwd.join("pintalab.db"));
    }
}
