//! Login, registration and logout
//!
//! These are the only places a token is written or deleted.

use crate::client::{ClientError, DashboardApi};
use crate::notify::Notifier;
use crate::session::{Session, SessionError, TokenStore};

/// Errors from the auth flows
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Client(#[from] ClientError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Exchange credentials for a token, persist it and return the new session
pub async fn login(
    api: &dyn DashboardApi,
    store: &dyn TokenStore,
    notifier: &mut Notifier,
    email: &str,
    password: &str,
) -> Result<Session, AuthError> {
    let result = async {
        let response = api.login(email, password).await?;
        let token = response.access_token.ok_or_else(|| {
            ClientError::request_failed("Login failed: No access token received.")
        })?;
        Ok::<_, AuthError>(Session::establish(store, &token)?)
    }
    .await;

    match &result {
        Ok(_) => {
            tracing::info!(%email, "Logged in");
            notifier.success("Login successful!");
        }
        Err(e) => notifier.error(e.to_string()),
    }
    result
}

/// Create a tenant account. When the backend answers with a token the new
/// account is signed in; otherwise `current` is returned unchanged.
pub async fn register(
    api: &dyn DashboardApi,
    store: &dyn TokenStore,
    notifier: &mut Notifier,
    current: Session,
    tenant_name: &str,
    email: &str,
    password: &str,
) -> Result<Session, AuthError> {
    let result = async move {
        let response = api.register(tenant_name, email, password).await?;
        match response.access_token.filter(|t| !t.is_empty()) {
            Some(token) => Ok::<_, AuthError>(Session::establish(store, &token)?),
            None => Ok(current),
        }
    }
    .await;

    match &result {
        Ok(_) => {
            tracing::info!(%tenant_name, %email, "Registered tenant");
            notifier.success("Registration successful!");
        }
        Err(e) => notifier.error(e.to_string()),
    }
    result
}

/// Forget the token
pub fn logout(
    session: &mut Session,
    store: &dyn TokenStore,
    notifier: &mut Notifier,
) -> Result<(), AuthError> {
    session.end(store)?;
    tracing::info!("Logged out");
    notifier.success("Logged out.");
    Ok(())
}
