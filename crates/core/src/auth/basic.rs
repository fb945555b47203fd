//! HTTP Basic authentication against user accounts.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::{AuthError, AuthRequest, Authenticator, Identity};
use crate::account::{AccountError, AccountService};

/// Authenticator that checks `Authorization: Basic base64(email:password)`
/// against registered accounts.
pub struct BasicAuthenticator {
    accounts: AccountService,
}

impl BasicAuthenticator {
    pub fn new(accounts: AccountService) -> Self {
        Self { accounts }
    }

    /// Extract `(email, password)` from the Authorization header.
    fn extract_credentials(request: &AuthRequest) -> Result<(String, String), AuthError> {
        let header = request
            .headers
            .get("authorization")
            .ok_or(AuthError::NotAuthenticated)?;

        let encoded = match header.split_once(' ') {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("basic") => rest,
            _ => return Err(AuthError::NotAuthenticated),
        };

        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::InvalidCredentials("Malformed credentials".to_string()))?;
        let decoded = String::from_utf8(decoded)
            .map_err(|_| AuthError::InvalidCredentials("Malformed credentials".to_string()))?;

        let (email, password) = decoded
            .split_once(':')
            .ok_or_else(|| AuthError::InvalidCredentials("Malformed credentials".to_string()))?;

        Ok((email.to_string(), password.to_string()))
    }
}

#[async_trait]
impl Authenticator for BasicAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let (email, password) = Self::extract_credentials(request)?;

        match self.accounts.verify_credentials(&email, &password) {
            Ok(user) => Ok(Identity::authenticated(user, self.method_name())),
            Err(AccountError::InvalidCredentials) => Err(AuthError::InvalidCredentials(
                "Wrong email or password".to_string(),
            )),
            Err(e) => Err(AuthError::ServiceUnavailable(e.to_string())),
        }
    }

    fn method_name(&self) -> &'static str {
        "basic"
    }
}

/// Build an `Authorization` header value for the given credentials.
pub fn basic_authorization(email: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", email, password)))
}
