use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// Role a user acts under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    Host,
    Listener,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Host => "Host",
            UserRole::Listener => "Listener",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Host" => Ok(UserRole::Host),
            "Listener" => Ok(UserRole::Listener),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// bcrypt hash of the password. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountInput {
    pub email: String,
    pub password: String,
    pub role: UserRole,
}
