use async_trait::async_trait;
use thiserror::Error;

use super::types::{AuthRequest, Identity};

/// Why a request could not be tied to a catalog account.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credentials were sent. Public catalog routes still serve the request.
    #[error("Authentication required")]
    NotAuthenticated,

    /// Credentials were sent but do not match a host or listener account.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The account store could not be consulted.
    #[error("Authentication service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Label used for the auth failure counter.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::NotAuthenticated => "not_authenticated",
            AuthError::InvalidCredentials(_) => "invalid_credentials",
            AuthError::ServiceUnavailable(_) => "internal_error",
        }
    }
}

/// Resolves the caller of a catalog request to an [`Identity`].
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolve the request to a signed-in user or an anonymous identity.
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError>;

    /// Name reported in `Identity::method`.
    fn method_name(&self) -> &'static str;
}
