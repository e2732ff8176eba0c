use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// A schemaless stored record. Every persisted document carries an `_id`.
pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "_id";
pub const EMAIL_FIELD: &str = "email";
pub const ROLE_FIELD: &str = "role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Tools,
    Orders,
    Reviews,
    Payments,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Tools => "tools",
            Collection::Orders => "orders",
            Collection::Reviews => "reviews",
            Collection::Payments => "payments",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Reads the role flag of a user document. Records without one are plain users.
    pub fn of(user: &Document) -> Role {
        user.get(ROLE_FIELD)
            .and_then(Value::as_str)
            .and_then(|r| r.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role {other}")),
        }
    }
}
