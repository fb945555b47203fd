mod basic;
mod none;
mod traits;
mod types;

pub use basic::*;
pub use none::*;
pub use traits::*;
pub use types::*;

use crate::account::AccountService;
use crate::config::{AuthConfig, AuthMethod};

/// Factory function to create authenticator from config
pub fn create_authenticator(
    config: &AuthConfig,
    accounts: AccountService,
) -> Result<Box<dyn Authenticator>, AuthError> {
    match config.method {
        AuthMethod::None => Ok(Box::new(NoneAuthenticator::new())),
        AuthMethod::Basic => Ok(Box::new(BasicAuthenticator::new(accounts))),
    }
}
