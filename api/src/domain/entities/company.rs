//! Company domain entity
//!
//! A company is a B2B customer of the portal. It maps onto an SAP sold-to
//! party in one sales area.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub Uuid);

impl CompanyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CompanyId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for CompanyId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CompanyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// SAP sales area (sales organization / distribution channel / division)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesArea {
    pub sales_org: String,
    pub distribution_channel: String,
    pub division: String,
}

impl SalesArea {
    pub fn validate(&self) -> Result<(), String> {
        check_code("sales_org", &self.sales_org, 4)?;
        check_code("distribution_channel", &self.distribution_channel, 2)?;
        check_code("division", &self.division, 2)
    }
}

/// A B2B customer company
#[derive(Debug, Clone, Serialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    /// SAP customer number of the sold-to party
    pub sold_to: String,
    pub sales_area: SalesArea,
    /// Ship-to party used when the order does not name one
    pub default_ship_to: Option<String>,
    /// SAP sales document type for orders (e.g. `OR`, `TA`)
    pub order_type: String,
    /// SAP sales document type for quotations (e.g. `AG`, `QT`)
    pub quote_type: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Company {
    /// Ship-to party for a document, falling back to the company default
    /// and finally to the sold-to party itself.
    pub fn ship_to_or_default(&self, requested: Option<&str>) -> String {
        requested
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().to_string())
            .or_else(|| self.default_ship_to.clone())
            .unwrap_or_else(|| self.sold_to.clone())
    }
}

/// Sales document type used for orders unless the company overrides it
pub const DEFAULT_ORDER_TYPE: &str = "OR";
/// Sales document type used for quotations unless the company overrides it
pub const DEFAULT_QUOTE_TYPE: &str = "AG";

/// Data needed to create a new company
#[derive(Debug, Clone, Deserialize)]
pub struct NewCompany {
    pub name: String,
    pub sold_to: String,
    pub sales_area: SalesArea,
    #[serde(default)]
    pub default_ship_to: Option<String>,
    #[serde(default)]
    pub order_type: Option<String>,
    #[serde(default)]
    pub quote_type: Option<String>,
}

impl NewCompany {
    pub fn order_type(&self) -> String {
        document_type(self.order_type.as_deref(), DEFAULT_ORDER_TYPE)
    }

    pub fn quote_type(&self) -> String {
        document_type(self.quote_type.as_deref(), DEFAULT_QUOTE_TYPE)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() || self.name.len() > 200 {
            return Err("Company name must be between 1 and 200 characters".to_string());
        }
        check_code("sold_to", &self.sold_to, 10)?;
        if let Some(ship_to) = &self.default_ship_to {
            check_code("default_ship_to", ship_to, 10)?;
        }
        self.sales_area.validate()
    }
}

/// Partial update of a company
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyUpdate {
    pub name: Option<String>,
    pub sales_area: Option<SalesArea>,
    pub default_ship_to: Option<String>,
    pub order_type: Option<String>,
    pub quote_type: Option<String>,
    pub active: Option<bool>,
}

fn document_type(value: Option<&str>, default: &str) -> String {
    value
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn check_code(field: &str, value: &str, max_len: usize) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.len() > max_len {
        return Err(format!(
            "{} must be between 1 and {} characters",
            field, max_len
        ));
    }
    Ok(())
}
