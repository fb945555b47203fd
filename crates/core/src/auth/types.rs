use std::collections::HashMap;
use std::net::IpAddr;

use crate::account::{User, UserRole};

/// Request information for authentication
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub headers: HashMap<String, String>,
    pub source_ip: IpAddr,
}

/// Authenticated identity
#[derive(Debug, Clone)]
pub struct Identity {
    /// The signed-in account, `None` for anonymous callers.
    pub user: Option<User>,
    pub method: String,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            user: None,
            method: "none".to_string(),
        }
    }

    pub fn authenticated(user: User, method: &str) -> Self {
        Self {
            user: Some(user),
            method: method.to_string(),
        }
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user.as_ref().map(|user| user.role)
    }

    pub fn is_anonymous(&self) -> bool {
        self.user.is_none()
    }
}
