//! OData V2 client for the S/4HANA API services
//!
//! Reads are plain Basic-auth GETs. Writes carry a CSRF token and the session
//! cookies it was issued with; a rejected token is refreshed once.

use reqwest::{header, Client, Response};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::adapters::sap::response::{
    classify, field, field_date, field_decimal, field_str, navigation_results, odata_entity,
    odata_results, parse_sap_message_header,
};
use crate::adapters::sap::session::{
    basic_auth, client_query, fetch_csrf, is_csrf_rejection, CsrfSession, SessionStore,
    CSRF_HEADER,
};
use crate::domain::entities::{
    Address, Delivery, DeliveryItem, Invoice, MessageSeverity, Partner, SalesDocumentSummary,
    SapConnection, SapMessage, SapResult, SimulatedItem, Simulation,
};
use crate::error::SapError;

pub const ODATA_ROOT: &str = "/sap/opu/odata/sap";

pub const SALES_ORDER_SERVICE: &str = "API_SALES_ORDER_SRV";
pub const SALES_QUOTATION_SERVICE: &str = "API_SALES_QUOTATION_SRV";
pub const SIMULATION_SERVICE: &str = "API_SALES_ORDER_SIMULATION_SRV";
pub const DELIVERY_SERVICE: &str = "API_OUTBOUND_DELIVERY_SRV;v=0002";
pub const BILLING_SERVICE: &str = "API_BILLING_DOCUMENT_SRV";
pub const BUSINESS_PARTNER_SERVICE: &str = "API_BUSINESS_PARTNER";

const SAP_MESSAGE_HEADER: &str = "sap-message";

/// Parsed OData body plus the messages SAP put into the `sap-message` header
#[derive(Debug, Clone)]
pub struct ODataResponse {
    pub body: Value,
    pub messages: Vec<SapMessage>,
}

#[derive(Clone)]
pub struct ODataClient {
    http: Client,
    sessions: SessionStore,
}

impl ODataClient {
    pub fn new(http: Client, sessions: SessionStore) -> Self {
        Self { http, sessions }
    }

    pub fn service_url(connection: &SapConnection, service: &str) -> String {
        format!("{}{}/{}", connection.base(), ODATA_ROOT, service)
    }

    fn resource_url(connection: &SapConnection, service: &str, path: &str) -> String {
        format!(
            "{}/{}",
            Self::service_url(connection, service),
            path.trim_start_matches('/')
        )
    }

    async fn read(response: Response) -> Result<ODataResponse, SapError> {
        let status = response.status().as_u16();
        let messages = response
            .headers()
            .get(SAP_MESSAGE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(parse_sap_message_header)
            .unwrap_or_default();
        let text = response.text().await?;
        let body = classify(status, &text)?;
        Ok(ODataResponse { body, messages })
    }

    /// GET an entity set or entity below a service
    pub async fn get(
        &self,
        connection: &SapConnection,
        service: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ODataResponse, SapError> {
        let url = Self::resource_url(connection, service, path);
        tracing::debug!(company_id = %connection.company_id, url = %url, "OData GET");

        let response = self
            .http
            .get(&url)
            .header(
                header::AUTHORIZATION,
                basic_auth(&connection.username, &connection.password),
            )
            .header(header::ACCEPT, "application/json")
            .query(&client_query(connection))
            .query(&[("$format", "json")])
            .query(query)
            .send()
            .await?;

        Self::read(response).await
    }

    /// Fetch a fresh CSRF session and remember it
    pub async fn handshake(
        &self,
        connection: &SapConnection,
        service: &str,
    ) -> Result<CsrfSession, SapError> {
        let session =
            fetch_csrf(&self.http, connection, &Self::service_url(connection, service)).await?;
        self.sessions.put(connection, service, &session).await;
        Ok(session)
    }

    async fn session(
        &self,
        connection: &SapConnection,
        service: &str,
    ) -> Result<CsrfSession, SapError> {
        match self.sessions.get(connection, service).await {
            Some(session) => Ok(session),
            None => self.handshake(connection, service).await,
        }
    }

    /// POST a JSON body to an entity set.
    ///
    /// A 403 with `x-csrf-token: Required` drops the cached session and the
    /// request is repeated once with a fresh handshake.
    pub async fn post(
        &self,
        connection: &SapConnection,
        service: &str,
        path: &str,
        body: &Value,
    ) -> Result<ODataResponse, SapError> {
        let url = Self::resource_url(connection, service, path);
        let mut session = self.session(connection, service).await?;
        let mut retried = false;

        loop {
            tracing::debug!(company_id = %connection.company_id, url = %url, retried, "OData POST");

            let mut request = self
                .http
                .post(&url)
                .header(
                    header::AUTHORIZATION,
                    basic_auth(&connection.username, &connection.password),
                )
                .header(header::ACCEPT, "application/json")
                .header(CSRF_HEADER, &session.token)
                .query(&client_query(connection))
                .json(body);
            if let Some(cookie) = &session.cookie {
                request = request.header(header::COOKIE, cookie);
            }

            let response = request.send().await?;

            if is_csrf_rejection(&response) {
                self.sessions.invalidate(connection, service).await;
                if retried {
                    return Err(SapError::CsrfRejected);
                }
                tracing::info!(
                    company_id = %connection.company_id,
                    service,
                    "CSRF token rejected, refreshing session"
                );
                retried = true;
                session = self.handshake(connection, service).await?;
                continue;
            }

            return Self::read(response).await;
        }
    }
}

// ============================================================================
// Mapping to domain types
// ============================================================================

fn field_bool(value: &Value, name: &str) -> bool {
    match field(value, name) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim(), "X" | "x" | "true"),
        _ => false,
    }
}

/// Messages of a business rejection.
///
/// An OData error document on a write means SAP looked at the document and
/// refused it. A 404 means the service itself is missing and stays an error,
/// as does anything without an error document.
pub fn business_rejection(error: SapError) -> Result<Vec<SapMessage>, SapError> {
    match error {
        SapError::OData {
            status,
            code,
            message,
            mut details,
        } if status != 404 => {
            if details.is_empty() {
                details.push(SapMessage::new(MessageSeverity::Error, code, message));
            }
            Ok(details)
        }
        other => Err(other),
    }
}

/// Outcome of a deep insert
pub fn create_outcome(
    response: Result<ODataResponse, SapError>,
    number_field: &str,
) -> Result<SapResult, SapError> {
    match response {
        Ok(r) => {
            let number = field_str(odata_entity(&r.body), number_field);
            Ok(SapResult::from_messages(number, r.messages))
        }
        Err(e) => business_rejection(e).map(SapResult::failed),
    }
}

/// Simulation result from an `A_SalesOrderSimulation` response
pub fn map_simulation(response: ODataResponse) -> Simulation {
    let entity = odata_entity(&response.body);
    let header_currency = field_str(entity, "TransactionCurrency");

    let items: Vec<SimulatedItem> = navigation_results(entity, "to_Item")
        .into_iter()
        .map(|item| SimulatedItem {
            item_number: field_str(item, "SalesOrderItem").unwrap_or_default(),
            material: field_str(item, "Material").unwrap_or_default(),
            quantity: field_decimal(item, "RequestedQuantity").unwrap_or_default(),
            net_value: field_decimal(item, "NetAmount").unwrap_or_default(),
            currency: field_str(item, "TransactionCurrency").or_else(|| header_currency.clone()),
        })
        .collect();

    let net_value = field_decimal(entity, "TotalNetAmount")
        .unwrap_or_else(|| items.iter().map(|i| i.net_value).sum::<Decimal>());

    let success = !response.messages.iter().any(|m| m.severity.is_error());
    Simulation {
        success,
        items,
        net_value,
        currency: header_currency,
        messages: response.messages,
    }
}

/// Simulation SAP refused outright
pub fn failed_simulation(messages: Vec<SapMessage>) -> Simulation {
    Simulation {
        success: false,
        items: vec![],
        net_value: Decimal::ZERO,
        currency: None,
        messages,
    }
}

pub fn map_sales_order(entity: &Value) -> Option<SalesDocumentSummary> {
    Some(SalesDocumentSummary {
        number: field_str(entity, "SalesOrder")?,
        doc_type: field_str(entity, "SalesOrderType"),
        created_on: field_date(entity, "CreationDate"),
        purchase_order: field_str(entity, "PurchaseOrderByCustomer"),
        net_value: field_decimal(entity, "TotalNetAmount"),
        currency: field_str(entity, "TransactionCurrency"),
        status: field_str(entity, "OverallSDProcessStatus"),
        due_on: field_date(entity, "RequestedDeliveryDate"),
    })
}

pub fn map_quotation(entity: &Value) -> Option<SalesDocumentSummary> {
    Some(SalesDocumentSummary {
        number: field_str(entity, "SalesQuotation")?,
        doc_type: field_str(entity, "SalesQuotationType"),
        created_on: field_date(entity, "CreationDate"),
        purchase_order: field_str(entity, "PurchaseOrderByCustomer"),
        net_value: field_decimal(entity, "TotalNetAmount"),
        currency: field_str(entity, "TransactionCurrency"),
        status: field_str(entity, "OverallSDProcessStatus"),
        due_on: field_date(entity, "BindingPeriodValidityEndDate"),
    })
}

pub fn map_delivery(entity: &Value) -> Option<Delivery> {
    let items = navigation_results(entity, "to_DeliveryDocumentItem")
        .into_iter()
        .filter_map(|item| {
            Some(DeliveryItem {
                item_number: field_str(item, "DeliveryDocumentItem")?,
                material: field_str(item, "Material").unwrap_or_default(),
                quantity: field_decimal(item, "ActualDeliveryQuantity").unwrap_or_default(),
                unit: field_str(item, "DeliveryQuantityUnit"),
                reference_document: field_str(item, "ReferenceSDDocument"),
            })
        })
        .collect();

    Some(Delivery {
        number: field_str(entity, "DeliveryDocument")?,
        delivery_date: field_date(entity, "DeliveryDate"),
        goods_issue_date: field_date(entity, "ActualGoodsMovementDate"),
        goods_movement_status: field_str(entity, "OverallGoodsMovementStatus"),
        ship_to: field_str(entity, "ShipToParty"),
        items,
    })
}

pub fn map_invoice(entity: &Value) -> Option<Invoice> {
    Some(Invoice {
        number: field_str(entity, "BillingDocument")?,
        billing_date: field_date(entity, "BillingDocumentDate"),
        billing_type: field_str(entity, "BillingDocumentType"),
        net_amount: field_decimal(entity, "TotalNetAmount"),
        tax_amount: field_decimal(entity, "TotalTaxAmount"),
        currency: field_str(entity, "TransactionCurrency"),
        cancelled: field_bool(entity, "BillingDocumentIsCancelled"),
    })
}

pub fn map_partner(entity: &Value) -> Option<Partner> {
    let number = field_str(entity, "BusinessPartner")?;
    let name = field_str(entity, "BusinessPartnerFullName")
        .or_else(|| field_str(entity, "BusinessPartnerName"))
        .or_else(|| field_str(entity, "OrganizationBPName1"))
        .unwrap_or_else(|| number.clone());

    let addresses = navigation_results(entity, "to_BusinessPartnerAddress")
        .into_iter()
        .filter_map(|a| {
            Some(Address {
                id: field_str(a, "AddressID")?,
                street: field_str(a, "StreetName"),
                house_number: field_str(a, "HouseNumber"),
                postal_code: field_str(a, "PostalCode"),
                city: field_str(a, "CityName"),
                region: field_str(a, "Region"),
                country: field_str(a, "Country"),
            })
        })
        .collect();

    Some(Partner {
        number,
        name,
        category: field_str(entity, "BusinessPartnerCategory"),
        addresses,
    })
}

/// Distinct ship-to numbers from `A_CustSalesPartnerFunc` rows, in SAP order
pub fn ship_to_numbers(body: &Value) -> Vec<String> {
    let mut numbers: Vec<String> = Vec::new();
    for row in odata_results(body) {
        if let Some(n) = field_str(row, "BPCustomerNumber") {
            if !numbers.contains(&n) {
                numbers.push(n);
            }
        }
    }
    numbers
}

/// Map every entity of a collection, skipping rows without a key
pub fn map_collection<T>(body: &Value, map: impl Fn(&Value) -> Option<T>) -> Vec<T> {
    odata_results(body).into_iter().filter_map(map).collect()
}
