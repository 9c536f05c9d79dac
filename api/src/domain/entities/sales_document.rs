//! Orders and quotes placed through the portal
//!
//! SAP owns the documents themselves. These records keep what the portal
//! sent, what SAP answered and who asked for it.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CompanyId, SalesDocumentRequest, SapMessage, SapResult, UserId};

/// Unique identifier for a portal order record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl From<Uuid> for OrderId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a portal quote record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub Uuid);

impl From<Uuid> for QuoteId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for QuoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of submitting a document to SAP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Created,
    Failed,
}

impl DocumentStatus {
    pub fn from_result(result: &SapResult) -> Self {
        if result.success {
            DocumentStatus::Created
        } else {
            DocumentStatus::Failed
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentStatus::Created => write!(f, "created"),
            DocumentStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" => Ok(DocumentStatus::Created),
            "failed" => Ok(DocumentStatus::Failed),
            _ => Err(format!("Unknown document status: {}", s)),
        }
    }
}

/// Snapshot of a submitted line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLine {
    pub item_number: String,
    pub material: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
}

impl DocumentLine {
    /// Snapshot the lines of a request with their positional item numbers
    pub fn from_request(request: &SalesDocumentRequest) -> Vec<DocumentLine> {
        request
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| DocumentLine {
                item_number: ((index + 1) * 10).to_string(),
                material: item.material.clone(),
                quantity: item.quantity,
                unit: item.unit.clone(),
            })
            .collect()
    }
}

/// Order placed through the portal
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub company_id: CompanyId,
    pub user_id: UserId,
    pub sap_document: Option<String>,
    pub status: DocumentStatus,
    pub purchase_order: Option<String>,
    pub ship_to: String,
    pub requested_date: Option<NaiveDate>,
    pub net_value: Option<Decimal>,
    pub currency: Option<String>,
    pub lines: Vec<DocumentLine>,
    pub messages: Vec<SapMessage>,
    pub created_at: DateTime<Utc>,
}

/// Data needed to record an order
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub company_id: CompanyId,
    pub user_id: UserId,
    pub sap_document: Option<String>,
    pub status: DocumentStatus,
    pub purchase_order: Option<String>,
    pub ship_to: String,
    pub requested_date: Option<NaiveDate>,
    pub net_value: Option<Decimal>,
    pub currency: Option<String>,
    pub lines: Vec<DocumentLine>,
    pub messages: Vec<SapMessage>,
}

/// Quote requested through the portal
#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    pub id: QuoteId,
    pub company_id: CompanyId,
    pub user_id: UserId,
    pub sap_document: Option<String>,
    pub status: DocumentStatus,
    pub purchase_order: Option<String>,
    pub ship_to: String,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub lines: Vec<DocumentLine>,
    pub messages: Vec<SapMessage>,
    pub created_at: DateTime<Utc>,
}

/// Data needed to record a quote
#[derive(Debug, Clone)]
pub struct NewQuote {
    pub company_id: CompanyId,
    pub user_id: UserId,
    pub sap_document: Option<String>,
    pub status: DocumentStatus,
    pub purchase_order: Option<String>,
    pub ship_to: String,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub lines: Vec<DocumentLine>,
    pub messages: Vec<SapMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::MessageSeverity;

    #[test]
    fn status_follows_result() {
        let ok = SapResult::from_messages(Some("4711".to_string()), vec![]);
        let failed = SapResult::failed(vec![SapMessage::new(
            MessageSeverity::Error,
            None,
            "Sold-to party not maintained",
        )]);

        assert_eq!(DocumentStatus::from_result(&ok), DocumentStatus::Created);
        assert_eq!(DocumentStatus::from_result(&failed), DocumentStatus::Failed);
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(
            "CREATED".parse::<DocumentStatus>().unwrap(),
            DocumentStatus::Created
        );
        assert!("pending".parse::<DocumentStatus>().is_err());
    }
}
