//! User accounts: registration, credential checks and profiles.

mod password;
mod types;

pub use password::{hash_password, verify_password};
pub use types::*;

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::store::{CatalogStore, StoreError};

/// Errors for account operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("There is a user with that email already")]
    EmailTaken,

    #[error("Wrong email or password")]
    InvalidCredentials,

    #[error("User not found")]
    NotFound,

    #[error("Internal server error occurred.")]
    Internal,
}

/// Account operations over the catalog store.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn CatalogStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Register a user. The password is hashed before it reaches the store.
    pub fn create_account(&self, input: &CreateAccountInput) -> Result<UserId, AccountError> {
        let email = input.email.trim();
        if !is_plausible_email(email) {
            return Err(AccountError::InvalidEmail(email.to_string()));
        }
        if input.password.is_empty() {
            return Err(AccountError::EmptyPassword);
        }

        let password_hash = hash_password(&input.password).map_err(|e| {
            error!(operation = "create_account", error = %e, "Password hashing failed");
            AccountError::Internal
        })?;
        let user = self
            .store
            .create_user(email, &password_hash, input.role)
            .map_err(|e| match e {
                StoreError::Conflict(_) => AccountError::EmailTaken,
                e => internal("create_account", e),
            })?;

        info!(user_id = user.id, role = %user.role, "Created account");
        Ok(user.id)
    }

    /// Look up a user by email and check the password.
    pub fn verify_credentials(&self, email: &str, password: &str) -> Result<User, AccountError> {
        let user = self
            .store
            .find_user_by_email(email)
            .map_err(|e| internal("verify_credentials", e))?
            .ok_or(AccountError::InvalidCredentials)?;

        if verify_password(password, &user.password_hash) {
            Ok(user)
        } else {
            Err(AccountError::InvalidCredentials)
        }
    }

    pub fn see_profile(&self, user_id: UserId) -> Result<User, AccountError> {
        self.store
            .find_user(user_id)
            .map_err(|e| internal("see_profile", e))?
            .ok_or(AccountError::NotFound)
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}

fn internal(operation: &'static str, e: StoreError) -> AccountError {
    error!(operation, error = %e, "Catalog store failure");
    AccountError::Internal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteCatalogStore;
    use crate::testing::UnavailableStore;

    fn service() -> AccountService {
        AccountService::new(Arc::new(SqliteCatalogStore::in_memory().unwrap()))
    }

    fn input(email: &str, password: &str, role: UserRole) -> CreateAccountInput {
        CreateAccountInput {
            email: email.to_string(),
            password: password.to_string(),
            role,
        }
    }

    #[test]
    fn test_create_account_and_see_profile() {
        let accounts = service();
        let id = accounts
            .create_account(&input("host@example.com", "s3cret", UserRole::Host))
            .unwrap();

        let user = accounts.see_profile(id).unwrap();
        assert_eq!(user.email, "host@example.com");
        assert_eq!(user.role, UserRole::Host);
        assert_ne!(user.password_hash, "s3cret");
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let accounts = service();
        accounts
            .create_account(&input("a@example.com", "pw", UserRole::Listener))
            .unwrap();
        let result = accounts.create_account(&input("a@example.com", "pw2", UserRole::Host));
        assert_eq!(result, Err(AccountError::EmailTaken));
    }

    #[test]
    fn test_invalid_input_rejected() {
        let accounts = service();
        assert!(matches!(
            accounts.create_account(&input("not-an-email", "pw", UserRole::Host)),
            Err(AccountError::InvalidEmail(_))
        ));
        assert_eq!(
            accounts.create_account(&input("b@example.com", "", UserRole::Host)),
            Err(AccountError::EmptyPassword)
        );
    }

    #[test]
    fn test_verify_credentials() {
        let accounts = service();
        accounts
            .create_account(&input("c@example.com", "right", UserRole::Listener))
            .unwrap();

        assert!(accounts.verify_credentials("c@example.com", "right").is_ok());
        assert_eq!(
            accounts.verify_credentials("c@example.com", "wrong"),
            Err(AccountError::InvalidCredentials)
        );
        assert_eq!(
            accounts.verify_credentials("nobody@example.com", "right"),
            Err(AccountError::InvalidCredentials)
        );
    }

    #[test]
    fn test_see_missing_profile() {
        assert_eq!(service().see_profile(99), Err(AccountError::NotFound));
    }

    #[test]
    fn test_store_failure_is_internal() {
        let accounts = AccountService::new(Arc::new(UnavailableStore));
        assert_eq!(accounts.see_profile(1), Err(AccountError::Internal));
        assert_eq!(
            accounts.verify_credentials("d@example.com", "pw"),
            Err(AccountError::Internal)
        );
    }

    #[test]
    fn test_is_plausible_email() {
        assert!(is_plausible_email("user@example.com"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("user@localhost"));
        assert!(!is_plausible_email("user@@example.com"));
    }
}
