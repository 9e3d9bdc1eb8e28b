use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::repo;
use crate::auth::dto::{LoginOutcome, RegisterRequest};
use crate::auth::repo_types::User;
use crate::crypto::FieldCipher;
use crate::error::{StoreError, StoreResult};
use crate::state::AppState;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("name and password are required")]
    MissingFields,
    #[error("privacy policy consent is required")]
    ConsentRequired,
    #[error("email already registered")]
    EmailTaken,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Moves populated plaintext fields into their encrypted columns. A field
/// whose encrypted column is already set is left as is.
fn seal_user(cipher: &FieldCipher, user: &mut User) {
    if user.email_encrypted.is_empty() {
        if let Some(email) = user.email.take().filter(|e| !e.is_empty()) {
            user.email_encrypted = cipher.encrypt(&email);
        }
    }
    if user.name_encrypted.is_empty() {
        if let Some(name) = user.name.take().filter(|n| !n.is_empty()) {
            user.name_encrypted = cipher.encrypt(&name);
        }
    }
}

fn open_user(cipher: &FieldCipher, mut user: User) -> User {
    if !user.email_encrypted.is_empty() {
        user.email = Some(cipher.decrypt(&user.email_encrypted));
    }
    if !user.name_encrypted.is_empty() {
        user.name = Some(cipher.decrypt(&user.name_encrypted));
    }
    user
}

/// Insert or update a user, encrypting plaintext email/name first. Returns
/// the user's id; `user.id` is set after an insert.
#[instrument(skip(st, user), fields(user_id = user.id))]
pub async fn save_user(st: &AppState, user: &mut User) -> StoreResult<i64> {
    let db = st.pool().await?;
    seal_user(&st.cipher, user);

    if user.id != 0 {
        if repo::update(db, user).await? == 0 {
            warn!(user_id = user.id, "update of unknown user");
            return Err(StoreError::NotFound { entity: "user", id: user.id });
        }
        info!(user_id = user.id, "user updated");
    } else {
        user.id = repo::insert(db, user).await?;
        info!(user_id = user.id, "user created");
    }
    Ok(user.id)
}

/// Look a user up by plaintext email. Works because encryption is
/// deterministic: the query value encrypts to the stored token.
#[instrument(skip(st, email))]
pub async fn find_user_by_email(st: &AppState, email: &str) -> StoreResult<Option<User>> {
    let db = st.pool().await?;
    let token = st.cipher.encrypt(email);
    if token.is_empty() {
        return Ok(None);
    }
    let row = repo::find_by_email_token(db, &token).await?;
    Ok(row.map(|r| open_user(&st.cipher, r.into())))
}

#[instrument(skip(st))]
pub async fn find_user_by_id(st: &AppState, id: i64) -> StoreResult<Option<User>> {
    let db = st.pool().await?;
    let row = repo::find_by_id(db, id).await?;
    Ok(row.map(|r| open_user(&st.cipher, r.into())))
}

#[instrument(skip(st))]
pub async fn list_users(st: &AppState) -> StoreResult<Vec<User>> {
    let db = st.pool().await?;
    let rows = repo::list_all(db).await?;
    Ok(rows
        .into_iter()
        .map(|r| open_user(&st.cipher, r.into()))
        .collect())
}

/// Create an account, or complete one that exists without consent.
#[instrument(skip(st, req))]
pub async fn register(st: &AppState, req: RegisterRequest) -> Result<User, RegisterError> {
    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        warn!("register with invalid email");
        return Err(RegisterError::InvalidEmail);
    }
    let name = req.name.trim();
    if name.is_empty() || req.password.is_empty() {
        return Err(RegisterError::MissingFields);
    }
    if !req.gdpr_consent {
        return Err(RegisterError::ConsentRequired);
    }

    let password_hash = st.hasher.hash(&req.password).map_err(StoreError::from)?;
    let now = OffsetDateTime::now_utc();

    if let Some(mut existing) = find_user_by_email(st, &email).await? {
        if existing.gdpr_consent {
            warn!(user_id = existing.id, "email already registered");
            return Err(RegisterError::EmailTaken);
        }
        existing.gdpr_consent = true;
        existing.gdpr_consent_date = Some(now);
        existing.name = Some(name.to_string());
        existing.name_encrypted.clear();
        existing.password_hash = password_hash;
        save_user(st, &mut existing).await?;
        info!(user_id = existing.id, "consent granted for existing account");
        return Ok(open_user(&st.cipher, existing));
    }

    let mut user = User::new(&email, name, password_hash);
    user.gdpr_consent = true;
    user.gdpr_consent_date = Some(now);
    match save_user(st, &mut user).await {
        Ok(_) => {}
        // a concurrent registration inserted the same email first
        Err(e) if e.is_unique_violation() => {
            warn!("email already registered");
            return Err(RegisterError::EmailTaken);
        }
        Err(e) => return Err(e.into()),
    }
    info!(user_id = user.id, "user registered");
    Ok(open_user(&st.cipher, user))
}

#[instrument(skip(st, email, password))]
pub async fn authenticate(st: &AppState, email: &str, password: &str) -> StoreResult<LoginOutcome> {
    let email = normalize_email(email);
    let Some(user) = find_user_by_email(st, &email).await? else {
        warn!("login unknown email");
        return Ok(LoginOutcome::InvalidCredentials);
    };
    if !st.hasher.verify(password, &user.password_hash) {
        warn!(user_id = user.id, "login invalid password");
        return Ok(LoginOutcome::InvalidCredentials);
    }
    if !user.gdpr_consent {
        info!(user_id = user.id, "login requires consent");
        return Ok(LoginOutcome::ConsentRequired(user));
    }
    info!(user_id = user.id, "user logged in");
    Ok(LoginOutcome::Authenticated(user))
}

/// Record consent for an existing user. Returns false when the user does not exist.
#[instrument(skip(st))]
pub async fn grant_consent(st: &AppState, user_id: i64) -> StoreResult<bool> {
    let Some(mut user) = find_user_by_id(st, user_id).await? else {
        return Ok(false);
    };
    user.gdpr_consent = true;
    user.gdpr_consent_date = Some(OffsetDateTime::now_utc());
    save_user(st, &mut user).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;

    fn request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            name: "Maija Meikäläinen".into(),
            password: password.into(),
            gdpr_consent: true,
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("maija@example.fi"));
        assert!(!is_valid_email("maija@example"));
        assert!(!is_valid_email("maija example.fi"));
        assert!(!is_valid_email(""));
    }

    #[tokio::test]
    async fn save_user_encrypts_and_clears_plaintext() {
        let (_tmp, st) = test_state();
        let hash = st.hasher.hash("salasana").unwrap();
        let mut user = User::new("maija@example.fi", "Maija", hash);

        let id = save_user(&st, &mut user).await.unwrap();
        assert!(id > 0);
        assert_eq!(user.id, id);
        assert!(user.email.is_none());
        assert!(user.name.is_none());
        assert_eq!(user.email_encrypted, st.cipher.encrypt("maija@example.fi"));

        let db = st.pool().await.unwrap();
        let (email_col, name_col): (String, String) =
            sqlx::query_as("SELECT email_encrypted, name_encrypted FROM users WHERE id = ?1")
                .bind(id)
                .fetch_one(db)
                .await
                .unwrap();
        assert!(!email_col.is_empty() && !email_col.contains("maija"));
        assert_eq!(st.cipher.decrypt(&name_col), "Maija");
    }

    #[tokio::test]
    async fn finds_user_by_email_and_id_with_decrypted_fields() {
        let (_tmp, st) = test_state();
        let hash = st.hasher.hash("salasana").unwrap();
        let mut user = User::new("maija@example.fi", "Maija", hash);
        let id = save_user(&st, &mut user).await.unwrap();

        let found = find_user_by_email(&st, "maija@example.fi").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.email.as_deref(), Some("maija@example.fi"));
        assert_eq!(found.name.as_deref(), Some("Maija"));

        let by_id = find_user_by_id(&st, id).await.unwrap().unwrap();
        assert_eq!(by_id.email.as_deref(), Some("maija@example.fi"));

        assert!(find_user_by_email(&st, "other@example.fi").await.unwrap().is_none());
        assert!(find_user_by_email(&st, "").await.unwrap().is_none());
        assert!(find_user_by_id(&st, 4242).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn saving_a_loaded_user_keeps_identity_fields() {
        let (_tmp, st) = test_state();
        let hash = st.hasher.hash("salasana").unwrap();
        let mut user = User::new("maija@example.fi", "Maija", hash);
        let id = save_user(&st, &mut user).await.unwrap();

        let mut loaded = find_user_by_id(&st, id).await.unwrap().unwrap();
        loaded.gdpr_consent = true;
        assert_eq!(save_user(&st, &mut loaded).await.unwrap(), id);

        let again = find_user_by_id(&st, id).await.unwrap().unwrap();
        assert!(again.gdpr_consent);
        assert_eq!(again.email.as_deref(), Some("maija@example.fi"));
        assert_eq!(list_users(&st).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn saving_unknown_user_id_is_not_found() {
        let (_tmp, st) = test_state();
        let hash = st.hasher.hash("salasana").unwrap();
        let mut ghost = User::new("ghost@example.fi", "Ghost", hash);
        ghost.id = 4242;

        let err = save_user(&st, &mut ghost).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "user", id: 4242 }));
        assert!(find_user_by_id(&st, 4242).await.unwrap().is_none());
        assert!(list_users(&st).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_insert_is_rejected_by_store() {
        let (_tmp, st) = test_state();
        let hash = st.hasher.hash("salasana").unwrap();
        save_user(&st, &mut User::new("maija@example.fi", "Maija", hash.clone()))
            .await
            .unwrap();

        let err = save_user(&st, &mut User::new("maija@example.fi", "Toinen", hash))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(list_users(&st).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_registrations_create_one_account() {
        let (_tmp, st) = test_state();
        let (a, b) = tokio::join!(
            register(&st, request("maija@example.fi", "kaappi123")),
            register(&st, request("maija@example.fi", "kaappi123")),
        );

        let created: Vec<&User> = [&a, &b]
            .into_iter()
            .filter_map(|r| r.as_ref().ok())
            .collect();
        assert_eq!(created.len(), 1);
        let taken = [&a, &b]
            .into_iter()
            .filter(|r| matches!(r, Err(RegisterError::EmailTaken)))
            .count();
        assert_eq!(taken, 1);
        assert_eq!(list_users(&st).await.unwrap().len(), 1);

        match authenticate(&st, "maija@example.fi", "kaappi123").await.unwrap() {
            LoginOutcome::Authenticated(u) => assert_eq!(u.id, created[0].id),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let (_tmp, st) = test_state();
        let user = register(&st, request(" Maija@Example.FI ", "kaappi123")).await.unwrap();
        assert_eq!(user.email.as_deref(), Some("maija@example.fi"));
        assert!(user.gdpr_consent);
        assert!(user.gdpr_consent_date.is_some());

        match authenticate(&st, "maija@example.fi", "kaappi123").await.unwrap() {
            LoginOutcome::Authenticated(u) => assert_eq!(u.id, user.id),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(matches!(
            authenticate(&st, "maija@example.fi", "wrong").await.unwrap(),
            LoginOutcome::InvalidCredentials
        ));
        assert!(matches!(
            authenticate(&st, "nobody@example.fi", "kaappi123").await.unwrap(),
            LoginOutcome::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn register_rejects_bad_input_and_duplicates() {
        let (_tmp, st) = test_state();
        assert!(matches!(
            register(&st, request("not-an-email", "x")).await,
            Err(RegisterError::InvalidEmail)
        ));
        assert!(matches!(
            register(&st, request("maija@example.fi", "")).await,
            Err(RegisterError::MissingFields)
        ));
        let mut no_consent = request("maija@example.fi", "kaappi123");
        no_consent.gdpr_consent = false;
        assert!(matches!(
            register(&st, no_consent).await,
            Err(RegisterError::ConsentRequired)
        ));

        register(&st, request("maija@example.fi", "kaappi123")).await.unwrap();
        assert!(matches!(
            register(&st, request("maija@example.fi", "other")).await,
            Err(RegisterError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn account_without_consent_is_completed_by_register() {
        let (_tmp, st) = test_state();
        let hash = st.hasher.hash("old-password").unwrap();
        let mut legacy = User::new("maija@example.fi", "Old Name", hash);
        let id = save_user(&st, &mut legacy).await.unwrap();

        assert!(matches!(
            authenticate(&st, "maija@example.fi", "old-password").await.unwrap(),
            LoginOutcome::ConsentRequired(_)
        ));

        let user = register(&st, request("maija@example.fi", "new-password")).await.unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.name.as_deref(), Some("Maija Meikäläinen"));

        let stored = find_user_by_id(&st, id).await.unwrap().unwrap();
        assert_eq!(stored.name.as_deref(), Some("Maija Meikäläinen"));
        assert!(st.hasher.verify("new-password", &stored.password_hash));
        assert!(!st.hasher.verify("old-password", &stored.password_hash));
    }

    #[tokio::test]
    async fn grant_consent_sets_flag_and_date() {
        let (_tmp, st) = test_state();
        let hash = st.hasher.hash("pw").unwrap();
        let mut user = User::new("maija@example.fi", "Maija", hash);
        let id = save_user(&st, &mut user).await.unwrap();

        assert!(grant_consent(&st, id).await.unwrap());
        let stored = find_user_by_id(&st, id).await.unwrap().unwrap();
        assert!(stored.gdpr_consent);
        assert!(stored.gdpr_consent_date.is_some());
        assert!(!grant_consent(&st, id + 100).await.unwrap());
    }
}
