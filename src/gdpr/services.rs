use rand::distributions::Alphanumeric;
use rand::Rng;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::auth::repo_types::User;
use crate::auth::services::find_user_by_id;
use crate::auth::{find_user_row, update_user_row};
use crate::error::StoreResult;
use crate::gdpr::dto::{
    anonymous_email, OrderExport, UserDataExport, UserExport, ANONYMOUS_NAME, ANONYMOUS_PHONE,
};
use crate::orders::replace_contact_for_user;
use crate::orders::services::get_user_orders;
use crate::state::AppState;

fn random_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Build the data-subject export for `user_id` as pretty-printed JSON.
/// `Ok(None)` when the user does not exist.
#[instrument(skip(st))]
pub async fn export_user_data(st: &AppState, user_id: i64) -> StoreResult<Option<String>> {
    let Some(user) = find_user_by_id(st, user_id).await? else {
        warn!(user_id, "export for unknown user");
        return Ok(None);
    };
    let orders = get_user_orders(st, user_id).await?;

    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let export = UserDataExport {
        user: UserExport::from(user),
        orders: orders
            .iter()
            .map(|o| OrderExport::from_order(o, &st.cipher))
            .collect(),
        export_date: OffsetDateTime::now_utc().format(&fmt)?,
    };
    let json = serde_json::to_string_pretty(&export)?;
    info!(user_id, orders = export.orders.len(), "user data exported");
    Ok(Some(json))
}

/// Replace the user's identifying fields and the contact details of every
/// order they own with placeholders, in one transaction. Rows are kept.
/// Returns false when the user does not exist.
#[instrument(skip(st))]
pub async fn anonymize_user(st: &AppState, user_id: i64) -> StoreResult<bool> {
    let password_hash = st.hasher.hash(&random_password())?;
    let email = anonymous_email(user_id);
    let email_token = st.cipher.encrypt(&email);
    let name_token = st.cipher.encrypt(ANONYMOUS_NAME);
    let phone_token = st.cipher.encrypt(ANONYMOUS_PHONE);

    let db = st.pool().await?;
    let mut tx = db.begin().await?;

    let Some(row) = find_user_row(&mut *tx, user_id).await? else {
        warn!(user_id, "anonymize for unknown user");
        return Ok(false);
    };
    let mut user = User::from(row);
    user.email_encrypted = email_token.clone();
    user.name_encrypted = name_token.clone();
    user.password_hash = password_hash;
    user.gdpr_consent = false;
    user.gdpr_consent_date = None;
    update_user_row(&mut *tx, &user).await?;

    let orders =
        replace_contact_for_user(&mut *tx, user_id, &name_token, &email_token, &phone_token).await?;
    tx.commit().await?;

    info!(user_id, orders, "user anonymized");
    Ok(true)
}
