use serde::Deserialize;

use crate::auth::repo_types::User;

/// Input for account registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub gdpr_consent: bool,
}

/// Result of a login attempt.
#[derive(Debug)]
pub enum LoginOutcome {
    Authenticated(User),
    /// Credentials are valid but the privacy policy has not been accepted.
    ConsentRequired(User),
    InvalidCredentials,
}
