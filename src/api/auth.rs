//! Sign-in, sign-out and the remote session check.

use serde::de::IgnoredAny;
use serde_json::json;
use tracing::info;

use super::types::{AuthStatus, LoginRequest};
use crate::error::ApiError;
use crate::http::{ApiClient, RequestBody, RequestOptions};
use crate::router::AuthStatusCheck;

const UNAUTHORIZED: u16 = 401;

/// `POST /auth/login`. Marks the session flag on success.
///
/// A wrong password comes back as the raw [`ApiError::Rejected`] 401 and
/// leaves the session flag alone.
///
/// # Errors
///
/// Any [`ApiError`] from the request, or [`ApiError::Storage`] if the flag
/// cannot be written.
pub async fn login(client: &ApiClient, credentials: &LoginRequest) -> Result<(), ApiError> {
    let body = RequestBody::Json(json!({
        "username": credentials.username,
        "password": credentials.password,
    }));
    client.post::<IgnoredAny>("/auth/login", body, RequestOptions::new().login()).await?;
    client
        .session()
        .set_authenticated(true)
        .map_err(|e| ApiError::Storage(e.to_string()))?;
    info!(username = %credentials.username, "signed in");
    Ok(())
}

/// `POST /auth/logout`. The session flag is cleared whatever the outcome; a
/// 401 means the server already forgot the session and counts as success.
///
/// # Errors
///
/// Any [`ApiError`] from the request other than a 401, or
/// [`ApiError::Storage`] if the flag cannot be cleared.
pub async fn logout(client: &ApiClient) -> Result<(), ApiError> {
    let result = client
        .post::<IgnoredAny>("/auth/logout", RequestBody::Empty, RequestOptions::new().skip_auth_handler())
        .await;
    client
        .session()
        .set_authenticated(false)
        .map_err(|e| ApiError::Storage(e.to_string()))?;
    match result {
        Ok(_) | Err(ApiError::Rejected { status: UNAUTHORIZED, .. }) => {
            info!("signed out");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// `GET /auth/status`, silently and without triggering the expiry flow.
/// A successful answer (or a 401) reconciles the cached session flag.
///
/// # Errors
///
/// Any [`ApiError`] from the request other than a 401.
pub async fn check_auth_status(client: &ApiClient) -> Result<bool, ApiError> {
    let options = RequestOptions::new().skip_auth_handler().silent();
    let authenticated = match client.get::<AuthStatus>("/auth/status", options).await {
        Ok(status) => status.authenticated,
        Err(ApiError::Rejected { status: UNAUTHORIZED, .. }) => false,
        Err(e) => return Err(e),
    };
    if client.session().is_authenticated() != authenticated {
        if let Err(e) = client.session().set_authenticated(authenticated) {
            tracing::warn!(error = %e, "failed to reconcile session flag");
        }
    }
    Ok(authenticated)
}

#[async_trait::async_trait]
impl AuthStatusCheck for ApiClient {
    async fn check_auth_status(&self) -> Result<bool, ApiError> {
        check_auth_status(self).await
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
