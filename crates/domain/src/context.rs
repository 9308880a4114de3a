//! Per-request caller context.

use common::UserId;

use crate::error::DomainError;

/// Identity of the caller, passed explicitly into every cart, checkout
/// and order operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestContext {
    user: Option<UserId>,
}

impl RequestContext {
    /// A caller without a session.
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    /// A caller authenticated as the given user.
    pub fn authenticated(user: UserId) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<UserId> {
        self.user
    }

    /// Returns the authenticated user, or `Unauthorized`.
    pub fn user_id(&self) -> Result<UserId, DomainError> {
        self.user.ok_or(DomainError::Unauthorized)
    }
}
