//! Account roles.
//!
//! A role is fixed per account. Stored as lowercase text in `users.role`
//! and carried as the `role` claim of access tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const ROLE_HOSTELLER: &str = "hosteller";
pub const ROLE_DAYSCHOLAR: &str = "dayscholar";
pub const ROLE_ADMIN: &str = "admin";

/// Closed set of account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Requester: posts delivery requests and lists products.
    Hosteller,
    /// Fulfiller: claims and completes delivery requests.
    DayScholar,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Hosteller => ROLE_HOSTELLER,
            Role::DayScholar => ROLE_DAYSCHOLAR,
            Role::Admin => ROLE_ADMIN,
        }
    }

    pub fn is_requester(self) -> bool {
        self == Role::Hosteller
    }

    pub fn is_fulfiller(self) -> bool {
        self == Role::DayScholar
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_HOSTELLER => Ok(Role::Hosteller),
            ROLE_DAYSCHOLAR => Ok(Role::DayScholar),
            ROLE_ADMIN => Ok(Role::Admin),
            other => Err(CoreError::Validation(format!("Unknown role '{other}'"))),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The authenticated user performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: DbId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Reject unless the actor holds `role`.
    pub fn require_role(&self, role: Role, action: &str) -> Result<(), CoreError> {
        if self.role == role {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "Only {role} accounts can {action}"
            )))
        }
    }
}
