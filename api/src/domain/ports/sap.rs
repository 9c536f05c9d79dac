//! SAP gateway port trait
//!
//! Defines the interface the application layer uses to talk to SAP. The
//! adapter decides per connection whether documents go through OData or the
//! RFC bridge.

use async_trait::async_trait;

use crate::domain::entities::{
    Delivery, Invoice, Partner, SalesDocumentRequest, SalesDocumentSummary, SapConnection,
    SapResult, Simulation,
};
use crate::error::SapError;

/// Port trait for SAP operations
#[async_trait]
pub trait SapGateway: Send + Sync {
    // Document creation

    /// Create a sales order
    async fn create_order(
        &self,
        connection: &SapConnection,
        request: &SalesDocumentRequest,
    ) -> Result<SapResult, SapError>;

    /// Create a sales quotation
    async fn create_quote(
        &self,
        connection: &SapConnection,
        request: &SalesDocumentRequest,
    ) -> Result<SapResult, SapError>;

    /// Price an order without saving it
    async fn simulate_order(
        &self,
        connection: &SapConnection,
        request: &SalesDocumentRequest,
    ) -> Result<Simulation, SapError>;

    // Document retrieval

    /// Sales orders of a sold-to party, newest first
    async fn list_sales_orders(
        &self,
        connection: &SapConnection,
        sold_to: &str,
        top: u32,
    ) -> Result<Vec<SalesDocumentSummary>, SapError>;

    /// Quotations of a sold-to party, newest first
    async fn list_quotations(
        &self,
        connection: &SapConnection,
        sold_to: &str,
        top: u32,
    ) -> Result<Vec<SalesDocumentSummary>, SapError>;

    /// Outbound deliveries of a sold-to party with their items
    async fn list_deliveries(
        &self,
        connection: &SapConnection,
        sold_to: &str,
        top: u32,
    ) -> Result<Vec<Delivery>, SapError>;

    /// Billing documents of a sold-to party
    async fn list_invoices(
        &self,
        connection: &SapConnection,
        sold_to: &str,
        top: u32,
    ) -> Result<Vec<Invoice>, SapError>;

    // Partners

    /// Business partner with addresses
    async fn get_partner(
        &self,
        connection: &SapConnection,
        number: &str,
    ) -> Result<Partner, SapError>;

    /// Ship-to parties assigned to a sold-to party in a sales area
    async fn list_ship_to_parties(
        &self,
        connection: &SapConnection,
        sold_to: &str,
        sales_org: &str,
        distribution_channel: &str,
        division: &str,
    ) -> Result<Vec<String>, SapError>;

    // Connectivity

    /// Verify credentials by performing the CSRF handshake
    async fn ping(&self, connection: &SapConnection) -> Result<(), SapError>;
}
