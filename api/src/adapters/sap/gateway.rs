//! `SapGateway` implementation
//!
//! Document creation and simulation go through the channel configured on the
//! connection. Reads, partner lookups and the connectivity check always use
//! the OData services.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::adapters::sap::odata::{
    self, business_rejection, create_outcome, map_collection, ODataClient, BILLING_SERVICE,
    BUSINESS_PARTNER_SERVICE, DELIVERY_SERVICE, SALES_ORDER_SERVICE, SALES_QUOTATION_SERVICE,
    SIMULATION_SERVICE,
};
use crate::adapters::sap::payload::{
    filter_literal, odata_order_payload, odata_quote_payload, odata_simulation_payload,
    rfc_order_payload, rfc_quote_payload, rfc_simulate_payload, RfcDocument, PARTNER_SHIP_TO,
    SIMULATE_FUNCTION,
};
use crate::adapters::sap::response::odata_entity;
use crate::adapters::sap::rfc::{self, RfcClient};
use crate::adapters::sap::session::SessionStore;
use crate::domain::entities::{
    Delivery, Invoice, OrderChannel, Partner, SalesDocumentRequest, SalesDocumentSummary,
    SapConnection, SapResult, Simulation,
};
use crate::domain::ports::{SapGateway, SessionCache};
use crate::error::SapError;

pub struct SapGatewayImpl {
    odata: ODataClient,
    rfc: RfcClient,
}

impl SapGatewayImpl {
    pub fn new(
        cache: Arc<dyn SessionCache>,
        csrf_ttl_secs: u64,
        timeout: Duration,
    ) -> Result<Self, SapError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            odata: ODataClient::new(http.clone(), SessionStore::new(cache, csrf_ttl_secs)),
            rfc: RfcClient::new(http),
        })
    }
}

fn list_query(filter: String, orderby: &str, top: u32) -> Vec<(&'static str, String)> {
    vec![
        ("$filter", filter),
        ("$orderby", orderby.to_string()),
        ("$top", top.to_string()),
    ]
}

fn sold_to_filter(sold_to: &str) -> String {
    format!("SoldToParty eq {}", filter_literal(sold_to.trim()))
}

fn log_result(connection: &SapConnection, kind: &str, result: &SapResult) {
    if result.success {
        tracing::info!(
            company_id = %connection.company_id,
            channel = %connection.order_channel,
            document = result.document_number.as_deref().unwrap_or_default(),
            "SAP {} created",
            kind
        );
    } else {
        tracing::warn!(
            company_id = %connection.company_id,
            channel = %connection.order_channel,
            error = result.first_error().unwrap_or_default(),
            "SAP {} rejected",
            kind
        );
    }
}

#[async_trait]
impl SapGateway for SapGatewayImpl {
    async fn create_order(
        &self,
        connection: &SapConnection,
        request: &SalesDocumentRequest,
    ) -> Result<SapResult, SapError> {
        let result = match connection.order_channel {
            OrderChannel::OData => {
                let payload = odata_order_payload(request)?;
                let response = self
                    .odata
                    .post(connection, SALES_ORDER_SERVICE, "A_SalesOrder", &payload)
                    .await;
                create_outcome(response, "SalesOrder")?
            }
            OrderChannel::Rfc => {
                let payload = rfc_order_payload(request)?;
                self.rfc
                    .create_and_commit(connection, RfcDocument::Order.function(), &payload)
                    .await?
            }
        };
        log_result(connection, "order", &result);
        Ok(result)
    }

    async fn create_quote(
        &self,
        connection: &SapConnection,
        request: &SalesDocumentRequest,
    ) -> Result<SapResult, SapError> {
        let result = match connection.order_channel {
            OrderChannel::OData => {
                let payload = odata_quote_payload(request)?;
                let response = self
                    .odata
                    .post(connection, SALES_QUOTATION_SERVICE, "A_SalesQuotation", &payload)
                    .await;
                create_outcome(response, "SalesQuotation")?
            }
            OrderChannel::Rfc => {
                let payload = rfc_quote_payload(request)?;
                self.rfc
                    .create_and_commit(connection, RfcDocument::Quotation.function(), &payload)
                    .await?
            }
        };
        log_result(connection, "quotation", &result);
        Ok(result)
    }

    async fn simulate_order(
        &self,
        connection: &SapConnection,
        request: &SalesDocumentRequest,
    ) -> Result<Simulation, SapError> {
        match connection.order_channel {
            OrderChannel::OData => {
                let payload = odata_simulation_payload(request)?;
                match self
                    .odata
                    .post(connection, SIMULATION_SERVICE, "A_SalesOrderSimulation", &payload)
                    .await
                {
                    Ok(response) => Ok(odata::map_simulation(response)),
                    Err(e) => business_rejection(e).map(odata::failed_simulation),
                }
            }
            OrderChannel::Rfc => {
                let payload = rfc_simulate_payload(request)?;
                let body = self.rfc.call(connection, SIMULATE_FUNCTION, &payload).await?;
                Ok(rfc::map_simulation(&body, request))
            }
        }
    }

    async fn list_sales_orders(
        &self,
        connection: &SapConnection,
        sold_to: &str,
        top: u32,
    ) -> Result<Vec<SalesDocumentSummary>, SapError> {
        let query = list_query(sold_to_filter(sold_to), "CreationDate desc", top);
        let response = self
            .odata
            .get(connection, SALES_ORDER_SERVICE, "A_SalesOrder", &query)
            .await?;
        Ok(map_collection(&response.body, odata::map_sales_order))
    }

    async fn list_quotations(
        &self,
        connection: &SapConnection,
        sold_to: &str,
        top: u32,
    ) -> Result<Vec<SalesDocumentSummary>, SapError> {
        let query = list_query(sold_to_filter(sold_to), "CreationDate desc", top);
        let response = self
            .odata
            .get(connection, SALES_QUOTATION_SERVICE, "A_SalesQuotation", &query)
            .await?;
        Ok(map_collection(&response.body, odata::map_quotation))
    }

    async fn list_deliveries(
        &self,
        connection: &SapConnection,
        sold_to: &str,
        top: u32,
    ) -> Result<Vec<Delivery>, SapError> {
        let mut query = list_query(sold_to_filter(sold_to), "DeliveryDate desc", top);
        query.push(("$expand", "to_DeliveryDocumentItem".to_string()));
        let response = self
            .odata
            .get(connection, DELIVERY_SERVICE, "A_OutbDeliveryHeader", &query)
            .await?;
        Ok(map_collection(&response.body, odata::map_delivery))
    }

    async fn list_invoices(
        &self,
        connection: &SapConnection,
        sold_to: &str,
        top: u32,
    ) -> Result<Vec<Invoice>, SapError> {
        let query = list_query(sold_to_filter(sold_to), "BillingDocumentDate desc", top);
        let response = self
            .odata
            .get(connection, BILLING_SERVICE, "A_BillingDocument", &query)
            .await?;
        Ok(map_collection(&response.body, odata::map_invoice))
    }

    async fn get_partner(
        &self,
        connection: &SapConnection,
        number: &str,
    ) -> Result<Partner, SapError> {
        let path = format!("A_BusinessPartner({})", filter_literal(number.trim()));
        let query = [("$expand", "to_BusinessPartnerAddress".to_string())];
        let response = self
            .odata
            .get(connection, BUSINESS_PARTNER_SERVICE, &path, &query)
            .await?;
        odata::map_partner(odata_entity(&response.body)).ok_or_else(|| SapError::OData {
            status: 404,
            code: None,
            message: format!("Business partner {} not found", number),
            details: vec![],
        })
    }

    async fn list_ship_to_parties(
        &self,
        connection: &SapConnection,
        sold_to: &str,
        sales_org: &str,
        distribution_channel: &str,
        division: &str,
    ) -> Result<Vec<String>, SapError> {
        let filter = format!(
            "Customer eq {} and SalesOrganization eq {} and DistributionChannel eq {} and Division eq {} and PartnerFunction eq {}",
            filter_literal(sold_to.trim()),
            filter_literal(sales_org),
            filter_literal(distribution_channel),
            filter_literal(division),
            filter_literal(PARTNER_SHIP_TO),
        );
        let query = [
            ("$filter", filter),
            ("$select", "BPCustomerNumber".to_string()),
        ];
        let response = self
            .odata
            .get(connection, BUSINESS_PARTNER_SERVICE, "A_CustSalesPartnerFunc", &query)
            .await?;
        Ok(odata::ship_to_numbers(&response.body))
    }

    async fn ping(&self, connection: &SapConnection) -> Result<(), SapError> {
        self.odata
            .handshake(connection, SALES_ORDER_SERVICE)
            .await
            .map(|_| ())
    }
}
