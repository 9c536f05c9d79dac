//! SAP-facing domain types
//!
//! These types are the portal's view of SAP documents and of the outcome of
//! SAP calls, independent of whether the OData services or the RFC bridge
//! produced them.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Cart, Characteristic, Company, CompanyId};

// ============================================================================
// Connection
// ============================================================================

/// How sales documents are created in the connected system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderChannel {
    /// S/4HANA OData deep insert
    OData,
    /// ECC RFC JSON bridge (BAPIs)
    Rfc,
}

impl std::fmt::Display for OrderChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderChannel::OData => write!(f, "odata"),
            OrderChannel::Rfc => write!(f, "rfc"),
        }
    }
}

impl std::str::FromStr for OrderChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "odata" => Ok(OrderChannel::OData),
            "rfc" => Ok(OrderChannel::Rfc),
            _ => Err(format!("Unknown order channel: {}", s)),
        }
    }
}

/// Stored SAP credentials for a company
#[derive(Debug, Clone, Serialize)]
pub struct SapConnection {
    pub company_id: CompanyId,
    /// Scheme + host of the SAP gateway, e.g. `https://sap.example.com:44300`
    pub base_url: String,
    /// SAP client (mandant), sent as the `sap-client` query parameter
    pub client: Option<String>,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub order_channel: OrderChannel,
    pub updated_at: DateTime<Utc>,
}

impl SapConnection {
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Data for creating or replacing a company's SAP connection
#[derive(Debug, Clone, Deserialize)]
pub struct NewSapConnection {
    pub base_url: String,
    #[serde(default)]
    pub client: Option<String>,
    pub username: String,
    pub password: String,
    pub order_channel: OrderChannel,
}

impl NewSapConnection {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err("base_url must be an http(s) URL".to_string());
        }
        if let Some(client) = &self.client {
            if client.len() != 3 || !client.chars().all(|c| c.is_ascii_digit()) {
                return Err("client must be a three digit SAP client".to_string());
            }
        }
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err("username and password are required".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Messages and results
// ============================================================================

/// Severity of an SAP message (BAPI TYPE or OData severity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSeverity {
    Success,
    Info,
    Warning,
    Error,
    Abort,
}

impl MessageSeverity {
    /// Map a BAPI `TYPE` letter (S/I/W/E/A)
    pub fn from_bapi_type(kind: &str) -> Option<Self> {
        match kind.trim().to_uppercase().as_str() {
            "S" => Some(Self::Success),
            "I" => Some(Self::Info),
            "W" => Some(Self::Warning),
            "E" => Some(Self::Error),
            "A" | "X" => Some(Self::Abort),
            _ => None,
        }
    }

    /// Map an OData severity string
    pub fn from_odata(severity: &str) -> Self {
        match severity.trim().to_lowercase().as_str() {
            "success" => Self::Success,
            "info" | "information" => Self::Info,
            "warning" => Self::Warning,
            "abort" => Self::Abort,
            _ => Self::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error | Self::Abort)
    }
}

/// A single normalised SAP message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SapMessage {
    pub severity: MessageSeverity,
    /// Message class and number (`V1/311`) or OData error code
    pub code: Option<String>,
    pub text: String,
}

impl SapMessage {
    pub fn new(severity: MessageSeverity, code: Option<String>, text: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            text: text.into(),
        }
    }
}

/// Uniform outcome of a document-creating SAP call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SapResult {
    pub success: bool,
    pub document_number: Option<String>,
    pub messages: Vec<SapMessage>,
}

impl SapResult {
    /// A call succeeded when SAP handed out a document number and did not
    /// report any error or abort message.
    pub fn from_messages(document_number: Option<String>, messages: Vec<SapMessage>) -> Self {
        let document_number = document_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let success =
            document_number.is_some() && !messages.iter().any(|m| m.severity.is_error());
        Self {
            success,
            document_number,
            messages,
        }
    }

    pub fn failed(messages: Vec<SapMessage>) -> Self {
        Self {
            success: false,
            document_number: None,
            messages,
        }
    }

    /// First error text, used for logging and notifications
    pub fn first_error(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.severity.is_error())
            .map(|m| m.text.as_str())
    }
}

/// Priced line of an order simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedItem {
    pub item_number: String,
    pub material: String,
    pub quantity: Decimal,
    pub net_value: Decimal,
    pub currency: Option<String>,
}

/// Result of simulating an order (pricing / availability check)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub success: bool,
    pub items: Vec<SimulatedItem>,
    pub net_value: Decimal,
    pub currency: Option<String>,
    pub messages: Vec<SapMessage>,
}

// ============================================================================
// Documents read from SAP
// ============================================================================

/// Header-level summary of a sales order or quotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesDocumentSummary {
    pub number: String,
    pub doc_type: Option<String>,
    pub created_on: Option<NaiveDate>,
    pub purchase_order: Option<String>,
    pub net_value: Option<Decimal>,
    pub currency: Option<String>,
    pub status: Option<String>,
    /// Requested delivery date (orders) or end of validity (quotations)
    pub due_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryItem {
    pub item_number: String,
    pub material: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub reference_document: Option<String>,
}

/// Outbound delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub number: String,
    pub delivery_date: Option<NaiveDate>,
    pub goods_issue_date: Option<NaiveDate>,
    pub goods_movement_status: Option<String>,
    pub ship_to: Option<String>,
    pub items: Vec<DeliveryItem>,
}

/// Billing document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub number: String,
    pub billing_date: Option<NaiveDate>,
    pub billing_type: Option<String>,
    pub net_amount: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
    pub currency: Option<String>,
    pub cancelled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: String,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

/// Business partner (sold-to or ship-to party)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub number: String,
    pub name: String,
    pub category: Option<String>,
    pub addresses: Vec<Address>,
}

/// Where a document list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSource {
    Sap,
    Demo,
}

// ============================================================================
// Requests sent to SAP
// ============================================================================

/// A line of a sales document request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestItem {
    pub material: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub plant: Option<String>,
    pub configuration: Vec<Characteristic>,
}

/// Channel-independent description of an order, quotation or simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SalesDocumentRequest {
    pub doc_type: String,
    pub sold_to: String,
    pub ship_to: String,
    pub sales_org: String,
    pub distribution_channel: String,
    pub division: String,
    pub purchase_order: Option<String>,
    pub requested_date: Option<NaiveDate>,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub items: Vec<RequestItem>,
}

impl SalesDocumentRequest {
    /// Build a request from a company and the ordered lines of a cart
    pub fn from_cart(company: &Company, cart: &Cart, doc_type: &str, ship_to: Option<&str>) -> Self {
        Self {
            doc_type: doc_type.to_string(),
            sold_to: company.sold_to.clone(),
            ship_to: company.ship_to_or_default(ship_to),
            sales_org: company.sales_area.sales_org.clone(),
            distribution_channel: company.sales_area.distribution_channel.clone(),
            division: company.sales_area.division.clone(),
            purchase_order: None,
            requested_date: None,
            valid_from: None,
            valid_to: None,
            items: cart
                .ordered_items()
                .into_iter()
                .map(|i| RequestItem {
                    material: i.material.clone(),
                    quantity: i.quantity,
                    unit: i.unit.clone(),
                    plant: i.plant.clone(),
                    configuration: i.configuration.clone(),
                })
                .collect(),
        }
    }

    pub fn with_purchase_order(mut self, purchase_order: Option<String>) -> Self {
        self.purchase_order = purchase_order.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn with_requested_date(mut self, date: Option<NaiveDate>) -> Self {
        self.requested_date = date;
        self
    }

    pub fn with_validity(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.valid_from = Some(from);
        self.valid_to = Some(to);
        self
    }
}
