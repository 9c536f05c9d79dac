//! Client for the ECC RFC JSON bridge
//!
//! The bridge exposes function modules at `/sap/zfmcall/<FUNCTION>` and
//! takes the import parameters and tables as one JSON object. The answer
//! holds the export parameters and tables, including the BAPI `RETURN`.

use reqwest::{header, Client};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::adapters::sap::payload::{rfc_commit_payload, COMMIT_FUNCTION};
use crate::adapters::sap::response::{
    classify, field, field_decimal, field_str, parse_bapi_return,
};
use crate::adapters::sap::session::{basic_auth, client_query};
use crate::domain::entities::{
    MessageSeverity, SalesDocumentRequest, SapConnection, SapMessage, SapResult, SimulatedItem,
    Simulation,
};
use crate::error::SapError;

pub const BRIDGE_ROOT: &str = "/sap/zfmcall";

#[derive(Clone)]
pub struct RfcClient {
    http: Client,
}

impl RfcClient {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    pub fn function_url(connection: &SapConnection, function: &str) -> String {
        format!("{}{}/{}", connection.base(), BRIDGE_ROOT, function)
    }

    /// Call a function module and return its exports as JSON
    pub async fn call(
        &self,
        connection: &SapConnection,
        function: &str,
        payload: &Value,
    ) -> Result<Value, SapError> {
        let url = Self::function_url(connection, function);
        tracing::debug!(company_id = %connection.company_id, function, "RFC call");

        let response = self
            .http
            .post(&url)
            .header(
                header::AUTHORIZATION,
                basic_auth(&connection.username, &connection.password),
            )
            .header(header::ACCEPT, "application/json")
            .query(&[("format", "json")])
            .query(&client_query(connection))
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        classify(status, &text)
    }

    /// `BAPI_TRANSACTION_COMMIT` with `WAIT = X`; returns the commit's messages
    pub async fn commit(&self, connection: &SapConnection) -> Result<Vec<SapMessage>, SapError> {
        let body = self
            .call(connection, COMMIT_FUNCTION, &rfc_commit_payload())
            .await?;
        Ok(parse_bapi_return(&body))
    }

    /// Create a document and commit it when SAP accepted it.
    ///
    /// A failed commit keeps the document number but marks the result as
    /// failed, since the document was rolled back.
    pub async fn create_and_commit(
        &self,
        connection: &SapConnection,
        function: &str,
        payload: &Value,
    ) -> Result<SapResult, SapError> {
        let body = self.call(connection, function, payload).await?;
        let result = document_result(&body);
        if !result.success {
            tracing::info!(
                company_id = %connection.company_id,
                function,
                error = result.first_error().unwrap_or("no document number"),
                "SAP rejected document"
            );
            return Ok(result);
        }

        let mut messages = result.messages;
        match self.commit(connection).await {
            Ok(commit_messages) => messages.extend(commit_messages),
            Err(e) => {
                tracing::error!(
                    company_id = %connection.company_id,
                    function,
                    error = %e,
                    "BAPI_TRANSACTION_COMMIT failed"
                );
                messages.push(SapMessage::new(
                    MessageSeverity::Error,
                    None,
                    format!("Commit failed: {}", e),
                ));
            }
        }
        Ok(SapResult::from_messages(result.document_number, messages))
    }
}

/// `SALESDOCUMENT` export plus `RETURN` table of a create BAPI
pub fn document_result(body: &Value) -> SapResult {
    SapResult::from_messages(field_str(body, "SALESDOCUMENT"), parse_bapi_return(body))
}

/// Strip ALPHA zeros from a numeric key (`000010` -> `10`)
fn strip_alpha(value: &str) -> String {
    let trimmed = value.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        let stripped = trimmed.trim_start_matches('0');
        if stripped.is_empty() {
            "0".to_string()
        } else {
            stripped.to_string()
        }
    } else {
        trimmed.to_string()
    }
}

/// Simulation from `BAPI_SALESORDER_SIMULATE` exports.
///
/// Quantities are taken from the request, `ORDER_ITEMS_OUT` only reports
/// what SAP priced.
pub fn map_simulation(body: &Value, request: &SalesDocumentRequest) -> Simulation {
    let messages = parse_bapi_return(body);
    let rows: Vec<&Value> = match field(body, "ORDER_ITEMS_OUT") {
        Some(Value::Array(rows)) => rows.iter().collect(),
        Some(row @ Value::Object(_)) => vec![row],
        _ => vec![],
    };

    let items: Vec<SimulatedItem> = rows
        .into_iter()
        .map(|row| {
            let item_number = strip_alpha(&field_str(row, "ITM_NUMBER").unwrap_or_default());
            let position = item_number
                .parse::<usize>()
                .ok()
                .filter(|n| *n >= 10 && n % 10 == 0)
                .map(|n| n / 10 - 1);
            let quantity = position
                .and_then(|p| request.items.get(p))
                .map(|i| i.quantity)
                .unwrap_or_default();
            SimulatedItem {
                material: strip_alpha(&field_str(row, "MATERIAL").unwrap_or_default()),
                item_number,
                quantity,
                net_value: field_decimal(row, "NET_VALUE").unwrap_or_default(),
                currency: field_str(row, "CURRENCY"),
            }
        })
        .collect();

    let net_value = items.iter().map(|i| i.net_value).sum::<Decimal>();
    let currency = items.iter().find_map(|i| i.currency.clone());
    let success = !messages.iter().any(|m| m.severity.is_error());

    Simulation {
        success,
        items,
        net_value,
        currency,
        messages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RequestItem;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn request() -> SalesDocumentRequest {
        SalesDocumentRequest {
            doc_type: "OR".to_string(),
            sold_to: "100001".to_string(),
            ship_to: "100001".to_string(),
            sales_org: "1000".to_string(),
            distribution_channel: "10".to_string(),
            division: "00".to_string(),
            purchase_order: None,
            requested_date: None,
            valid_from: None,
            valid_to: None,
            items: vec![
                RequestItem {
                    material: "4711".to_string(),
                    quantity: dec!(2),
                    unit: None,
                    plant: None,
                    configuration: vec![],
                },
                RequestItem {
                    material: "BIKE".to_string(),
                    quantity: dec!(1.5),
                    unit: None,
                    plant: None,
                    configuration: vec![],
                },
            ],
        }
    }

    #[test]
    fn document_result_from_bapi_exports() {
        let result = document_result(&json!({
            "SALESDOCUMENT": "0000004711",
            "RETURN": [
                {"TYPE": "S", "ID": "V1", "NUMBER": "311", "MESSAGE": "Standard Order 4711 has been saved"}
            ]
        }));
        assert!(result.success);
        assert_eq!(result.document_number.as_deref(), Some("0000004711"));
    }

    #[test]
    fn document_result_with_error_row() {
        let result = document_result(&json!({
            "salesdocument": "",
            "return": {"type": "E", "id": "V1", "number": "382", "message": "Material is blocked"}
        }));
        assert!(!result.success);
        assert_eq!(result.document_number, None);
        assert_eq!(result.first_error(), Some("Material is blocked"));
    }

    #[test]
    fn strip_alpha_only_touches_numeric_keys() {
        assert_eq!(strip_alpha("000010"), "10");
        assert_eq!(strip_alpha("000000000000004711"), "4711");
        assert_eq!(strip_alpha("BIKE"), "BIKE");
        assert_eq!(strip_alpha("0000"), "0");
    }

    #[test]
    fn simulation_maps_items_back_to_request_lines() {
        let simulation = map_simulation(
            &json!({
                "ORDER_ITEMS_OUT": [
                    {"ITM_NUMBER": "000010", "MATERIAL": "000000000000004711", "NET_VALUE": "20.00", "CURRENCY": "EUR"},
                    {"ITM_NUMBER": "000020", "MATERIAL": "BIKE", "NET_VALUE": "300.00", "CURRENCY": "EUR"}
                ],
                "RETURN": [{"TYPE": "S", "MESSAGE": "Order simulated"}]
            }),
            &request(),
        );

        assert!(simulation.success);
        assert_eq!(simulation.net_value, dec!(320.00));
        assert_eq!(simulation.currency.as_deref(), Some("EUR"));
        assert_eq!(simulation.items[0].item_number, "10");
        assert_eq!(simulation.items[0].material, "4711");
        assert_eq!(simulation.items[1].quantity, dec!(1.5));
    }

    #[test]
    fn simulation_with_error_is_not_successful() {
        let simulation = map_simulation(
            &json!({"RETURN": [{"TYPE": "E", "MESSAGE": "Sold-to party not maintained"}]}),
            &request(),
        );
        assert!(!simulation.success);
        assert!(simulation.items.is_empty());
    }
}
