use axum::async_trait;
use axum::extract::FromRequestParts;
use http::request::Parts;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::cookie::token_from_headers;
use crate::state::AppState;
use crate::utils::http_helpers::ApiError;

/// The authenticated caller, as decoded from the session token. Scoped to a
/// single request; never shared across requests.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
}

impl Identity {
    /// Owner-only gate: the authenticated email must match the email the
    /// resource is scoped to, otherwise the caller gets a 403.
    pub fn require_owner(&self, email: &str) -> Result<(), ApiError> {
        if self.email == email {
            Ok(())
        } else {
            debug!(
                "Identity '{}' denied access to resources of '{}'",
                self.email, email
            );
            Err(ApiError::Forbidden)
        }
    }
}

/// Extractor implementation: authenticates the request from its session
/// cookie. Rejection is fail-closed: a missing cookie and a token that fails
/// verification are both a 401, and the downstream handler never runs.
#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = token_from_headers(&parts.headers).ok_or(ApiError::Unauthorized)?;

        state
            .tokens
            .verify(&token)
            .map_err(|_| ApiError::Unauthorized)
    }
}
