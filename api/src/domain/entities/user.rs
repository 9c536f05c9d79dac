//! Portal user domain entity
//!
//! Users authenticate with an API key. Their role decides which parts of the
//! portal they can reach.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CompanyId;

/// Unique identifier for a portal user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Portal role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access including the admin console
    Admin,
    /// Internal sales staff acting on behalf of any company
    Sales,
    /// Customer user bound to a single company
    Customer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Sales => write!(f, "sales"),
            Role::Customer => write!(f, "customer"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "sales" => Ok(Role::Sales),
            "customer" => Ok(Role::Customer),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// An authenticated portal user
#[derive(Debug, Clone, Serialize)]
pub struct PortalUser {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub company_id: Option<CompanyId>,
    #[serde(skip_serializing)]
    pub api_key_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl PortalUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Staff users may act for any company
    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Sales)
    }

    /// Resolve the company a request acts for.
    ///
    /// Customers are pinned to their own company and may not name another one.
    /// Staff may name any company, otherwise their own assignment is used.
    pub fn effective_company(&self, requested: Option<CompanyId>) -> Option<CompanyId> {
        match (self.role, requested) {
            (Role::Customer, Some(id)) if Some(id) != self.company_id => None,
            (Role::Customer, _) => self.company_id,
            (_, Some(id)) => Some(id),
            (_, None) => self.company_id,
        }
    }

    /// Whether the user may see records belonging to a company
    pub fn can_access(&self, company_id: &CompanyId) -> bool {
        self.is_staff() || self.company_id.as_ref() == Some(company_id)
    }
}

/// Data needed to create a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub company_id: Option<CompanyId>,
    pub api_key_hash: String,
}
