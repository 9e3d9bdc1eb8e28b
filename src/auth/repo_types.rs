use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// User account. `email` and `name` are transient plaintext copies: they are
/// filled on read and cleared once encrypted on write. Only the `*_encrypted`
/// columns reach the store.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,                        // 0 until inserted
    pub email: Option<String>,          // plaintext, never persisted
    pub name: Option<String>,           // plaintext, never persisted
    #[serde(skip_serializing)]
    pub email_encrypted: String,
    #[serde(skip_serializing)]
    pub name_encrypted: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub gdpr_consent: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub gdpr_consent_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
}

impl User {
    /// A not yet persisted user carrying plaintext fields.
    pub fn new(email: &str, name: &str, password_hash: String) -> Self {
        Self {
            id: 0,
            email: Some(email.to_string()),
            name: Some(name.to_string()),
            email_encrypted: String::new(),
            name_encrypted: String::new(),
            password_hash,
            gdpr_consent: false,
            gdpr_consent_date: None,
            created_date: OffsetDateTime::now_utc(),
        }
    }
}

/// Row as stored in `users`.
#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: i64,
    pub email_encrypted: String,
    pub name_encrypted: String,
    pub password_hash: String,
    pub gdpr_consent: bool,
    pub gdpr_consent_date: Option<OffsetDateTime>,
    pub created_date: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            email: None,
            name: None,
            email_encrypted: r.email_encrypted,
            name_encrypted: r.name_encrypted,
            password_hash: r.password_hash,
            gdpr_consent: r.gdpr_consent,
            gdpr_consent_date: r.gdpr_consent_date,
            created_date: r.created_date,
        }
    }
}
