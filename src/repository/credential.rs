use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Role attached to a credential. The core performs exactly one role check,
/// [`Role::is_admin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            other => Err(AuthError::DatabaseError(format!("unknown role '{other}'"))),
        }
    }
}

/// One administrator account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(any(test, feature = "mocks"))]
impl Credential {
    pub fn mock_from_credentials(username: &str, password_hash: &str) -> Self {
        Credential {
            id: 1,
            username: username.to_owned(),
            password_hash: password_hash.to_owned(),
            role: Role::Admin,
            last_login_at: None,
            created_at: Utc::now(),
        }
    }
}

/// Narrow query interface onto the credential table.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, AuthError>;

    async fn update_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), AuthError>;

    async fn count_credentials(&self) -> Result<u64, AuthError>;

    async fn create_credential(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<Credential, AuthError>;
}
