use sqlx::{Executor, Sqlite, SqlitePool};

use crate::auth::repo_types::{User, UserRow};

const USER_COLUMNS: &str = "id, email_encrypted, name_encrypted, password_hash, gdpr_consent, \
                            gdpr_consent_date, created_date";

/// Insert a user row and return its new id.
pub async fn insert<'e, E>(db: E, user: &User) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(
        r#"
        INSERT INTO users (email_encrypted, name_encrypted, password_hash,
                           gdpr_consent, gdpr_consent_date, created_date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&user.email_encrypted)
    .bind(&user.name_encrypted)
    .bind(&user.password_hash)
    .bind(user.gdpr_consent)
    .bind(user.gdpr_consent_date)
    .bind(user.created_date)
    .execute(db)
    .await?;
    Ok(res.last_insert_rowid())
}

/// Overwrite every mutable column of an existing user. Returns the number of
/// rows touched.
pub async fn update<'e, E>(db: E, user: &User) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(
        r#"
        UPDATE users
           SET email_encrypted = ?1,
               name_encrypted = ?2,
               password_hash = ?3,
               gdpr_consent = ?4,
               gdpr_consent_date = ?5
         WHERE id = ?6
        "#,
    )
    .bind(&user.email_encrypted)
    .bind(&user.name_encrypted)
    .bind(&user.password_hash)
    .bind(user.gdpr_consent)
    .bind(user.gdpr_consent_date)
    .bind(user.id)
    .execute(db)
    .await?;
    Ok(res.rows_affected())
}

/// Find a user by the encrypted email token.
pub async fn find_by_email_token(
    db: &SqlitePool,
    token: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email_encrypted = ?1 ORDER BY id LIMIT 1"
    ))
    .bind(token)
    .fetch_optional(db)
    .await
}

pub async fn find_by_id<'e, E>(db: E, id: i64) -> Result<Option<UserRow>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn list_all(db: &SqlitePool) -> Result<Vec<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
        .fetch_all(db)
        .await
}

pub async fn count(db: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await
}
