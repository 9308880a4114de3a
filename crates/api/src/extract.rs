//! Request extractors for the caller's identity and admin access.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::UserId;
use document_store::DocumentStore;
use domain::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the authenticated shopper's id, set by the session layer
/// in front of this service.
pub const USER_HEADER: &str = "x-user-id";

/// Header carrying the back-office token.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// The caller of a shopper route.
///
/// A request without [`USER_HEADER`] is anonymous; the services decide
/// whether that is allowed. A header that is not a UUID is rejected.
#[derive(Debug)]
pub struct Caller(pub RequestContext);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(USER_HEADER) else {
            return Ok(Self(RequestContext::anonymous()));
        };

        let user_id = value
            .to_str()
            .ok()
            .and_then(|raw| UserId::parse(raw.trim()).ok())
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid {USER_HEADER} header")))?;
        Ok(Self(RequestContext::authenticated(user_id)))
    }
}

/// Proof that the request carried the configured admin token.
#[derive(Debug)]
pub struct AdminAccess;

impl<S> FromRequestParts<Arc<AppState<S>>> for AdminAccess
where
    S: DocumentStore + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let expected = state.admin_token.as_deref().ok_or(ApiError::Forbidden)?;
        let given = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());

        if given != Some(expected) {
            metrics::counter!("admin_auth_failures_total").increment(1);
            tracing::warn!(path = %parts.uri.path(), "rejected admin request");
            return Err(ApiError::Forbidden);
        }
        Ok(Self)
    }
}
