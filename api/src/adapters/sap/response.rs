//! Normalisation of SAP responses
//!
//! SAP answers in several shapes depending on the service and on what went
//! wrong: OData V2 JSON (`{"d": ...}`), OData error documents, BAPI `RETURN`
//! tables from the RFC bridge, the `sap-message` header, and plain XML or
//! HTML error pages from the ICF layer. Everything here turns those into
//! `serde_json::Value`, `SapMessage` or `SapError`.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::entities::{MessageSeverity, SapMessage};
use crate::error::SapError;

const SUMMARY_LEN: usize = 200;

// ============================================================================
// Field access
// ============================================================================

/// Look up an object field ignoring ASCII case.
///
/// The RFC bridge returns upper-case ABAP names on some systems and
/// lower-case names on others.
pub fn field<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    let object = value.as_object()?;
    object.get(name).or_else(|| {
        object
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}

/// String field, trimmed; numbers are rendered; empty strings become None
pub fn field_str(value: &Value, name: &str) -> Option<String> {
    match field(value, name)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Decimal field given either as JSON string (OData Edm.Decimal) or number
pub fn field_decimal(value: &Value, name: &str) -> Option<Decimal> {
    match field(value, name)? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }
}

/// Date field in any of the formats SAP emits
pub fn field_date(value: &Value, name: &str) -> Option<NaiveDate> {
    field_str(value, name).and_then(|s| parse_sap_date(&s))
}

/// Entity list of an OData response: `d.results`, a single `d` entity, or
/// the V4 style `value` array
pub fn odata_results(body: &Value) -> Vec<&Value> {
    if let Some(d) = body.get("d") {
        return match d.get("results") {
            Some(Value::Array(items)) => items.iter().collect(),
            _ if d.is_object() => vec![d],
            _ => vec![],
        };
    }
    match body.get("value") {
        Some(Value::Array(items)) => items.iter().collect(),
        _ => vec![],
    }
}

/// Single OData entity: `d` for V2, the body itself otherwise
pub fn odata_entity(body: &Value) -> &Value {
    body.get("d").unwrap_or(body)
}

/// Items of an expanded navigation property (`to_Item.results` or a plain array)
pub fn navigation_results<'a>(entity: &'a Value, property: &str) -> Vec<&'a Value> {
    match entity.get(property) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(nav) => match nav.get("results") {
            Some(Value::Array(items)) => items.iter().collect(),
            _ => vec![],
        },
        None => vec![],
    }
}

// ============================================================================
// Dates
// ============================================================================

fn odata_date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/Date\((-?\d+)(?:[+-]\d{4})?\)/$").unwrap())
}

/// Parse `/Date(1700000000000)/`, `/Date(1700000000000+0000)/`,
/// `2024-01-31`, `2024-01-31T00:00:00` and the RFC form `20240131`.
///
/// The SAP "initial" date (`00000000`) maps to None.
pub fn parse_sap_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Some(caps) = odata_date_regex().captures(value) {
        let millis: i64 = caps[1].parse().ok()?;
        return DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive());
    }
    if value.len() == 8 && value.chars().all(|c| c.is_ascii_digit()) {
        if value == "00000000" {
            return None;
        }
        return NaiveDate::parse_from_str(value, "%Y%m%d").ok();
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

// ============================================================================
// Messages
// ============================================================================

/// Parse the BAPI `RETURN` parameter.
///
/// Accepts a table (array) or a single structure. Rows without TYPE and
/// MESSAGE are padding and dropped.
pub fn parse_bapi_return(body: &Value) -> Vec<SapMessage> {
    let rows: Vec<&Value> = match field(body, "RETURN") {
        Some(Value::Array(rows)) => rows.iter().collect(),
        Some(row @ Value::Object(_)) => vec![row],
        _ => return vec![],
    };

    rows.into_iter()
        .filter_map(|row| {
            let kind = field_str(row, "TYPE");
            let text = field_str(row, "MESSAGE");
            if kind.is_none() && text.is_none() {
                return None;
            }
            let severity = kind
                .as_deref()
                .and_then(MessageSeverity::from_bapi_type)
                .unwrap_or(MessageSeverity::Info);
            let code = field_str(row, "ID").map(|id| match field_str(row, "NUMBER") {
                Some(number) => format!("{}/{}", id, number),
                None => id,
            });
            Some(SapMessage::new(severity, code, text.unwrap_or_default()))
        })
        .collect()
}

/// Parsed OData error document
#[derive(Debug, Clone, PartialEq)]
pub struct ODataError {
    pub code: Option<String>,
    pub message: String,
    pub details: Vec<SapMessage>,
}

/// Parse `{"error": {"code", "message": {"value"}, "innererror": {"errordetails"}}}`
pub fn parse_odata_error(body: &Value) -> Option<ODataError> {
    let error = body.get("error")?;
    let code = field_str(error, "code");
    let message = match error.get("message") {
        Some(Value::String(s)) => s.clone(),
        Some(m) => field_str(m, "value").unwrap_or_default(),
        None => String::new(),
    };

    let mut details: Vec<SapMessage> = error
        .get("innererror")
        .and_then(|inner| inner.get("errordetails"))
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| {
                    let text = field_str(row, "message")?;
                    let severity = field_str(row, "severity")
                        .map(|s| MessageSeverity::from_odata(&s))
                        .unwrap_or(MessageSeverity::Error);
                    Some(SapMessage::new(severity, field_str(row, "code"), text))
                })
                .collect()
        })
        .unwrap_or_default();

    if details.is_empty() && !message.is_empty() {
        details.push(SapMessage::new(
            MessageSeverity::Error,
            code.clone(),
            message.clone(),
        ));
    }

    Some(ODataError {
        code,
        message,
        details,
    })
}

fn xml_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<(?:\w+:)?code>(.*?)</(?:\w+:)?code>").unwrap())
}

fn xml_message_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<(?:\w+:)?message[^>]*>(.*?)</(?:\w+:)?message>").unwrap())
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").unwrap())
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Parse an XML error document (`<error><code/><message/></error>`)
pub fn parse_xml_error(body: &str) -> Option<ODataError> {
    let message = xml_message_regex()
        .captures(body)
        .map(|c| unescape_xml(c[1].trim()))?;
    let code = xml_code_regex()
        .captures(body)
        .map(|c| unescape_xml(c[1].trim()))
        .filter(|c| !c.is_empty());
    Some(ODataError {
        details: vec![SapMessage::new(
            MessageSeverity::Error,
            code.clone(),
            message.clone(),
        )],
        code,
        message,
    })
}

/// Parse the `sap-message` response header (JSON with optional `details`)
pub fn parse_sap_message_header(header: &str) -> Vec<SapMessage> {
    let Ok(value) = serde_json::from_str::<Value>(header) else {
        return vec![];
    };

    let to_message = |v: &Value| -> Option<SapMessage> {
        let text = field_str(v, "message")?;
        let severity = field_str(v, "severity")
            .map(|s| MessageSeverity::from_odata(&s))
            .unwrap_or(MessageSeverity::Info);
        Some(SapMessage::new(severity, field_str(v, "code"), text))
    };

    let mut messages: Vec<SapMessage> = to_message(&value).into_iter().collect();
    if let Some(Value::Array(details)) = value.get("details") {
        messages.extend(details.iter().filter_map(to_message));
    }
    messages
}

/// Readable one-line summary of an unexpected body (tags stripped, truncated)
pub fn summarize_body(body: &str) -> String {
    let text = tag_regex().replace_all(body, " ");
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > SUMMARY_LEN {
        let truncated: String = collapsed.chars().take(SUMMARY_LEN).collect();
        format!("{}...", truncated)
    } else {
        collapsed
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Turn a raw SAP response into JSON or a typed error.
///
/// - 401 is always `Unauthorized`
/// - XML bodies are error documents or ICF error pages
/// - JSON bodies with an `error` object become `SapError::OData`
/// - empty successful bodies become `Value::Null`
pub fn classify(status: u16, body: &str) -> Result<Value, SapError> {
    if status == 401 {
        return Err(SapError::Unauthorized);
    }

    let success = (200..300).contains(&status);
    let trimmed = body.trim_start();

    if trimmed.starts_with('<') {
        return Err(match parse_xml_error(trimmed) {
            Some(e) => SapError::OData {
                status,
                code: e.code,
                message: e.message,
                details: e.details,
            },
            None => SapError::Http {
                status,
                message: summarize_body(trimmed),
            },
        });
    }

    if trimmed.is_empty() {
        return if success {
            Ok(Value::Null)
        } else {
            Err(SapError::Http {
                status,
                message: "empty response".to_string(),
            })
        };
    }

    let value: Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(e) if success => return Err(SapError::Deserialization(e.to_string())),
        Err(_) => {
            return Err(SapError::Http {
                status,
                message: summarize_body(trimmed),
            })
        }
    };

    if let Some(e) = parse_odata_error(&value) {
        return Err(SapError::OData {
            status,
            code: e.code,
            message: e.message,
            details: e.details,
        });
    }

    if !success {
        return Err(SapError::Http {
            status,
            message: summarize_body(trimmed),
        });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn bapi_return_table_with_padding_rows() {
        let body = json!({
            "SALESDOCUMENT": "0000012345",
            "RETURN": [
                {"TYPE": "S", "ID": "V1", "NUMBER": "311", "MESSAGE": "Standard Order 12345 has been saved"},
                {"TYPE": "", "ID": "", "NUMBER": "000", "MESSAGE": ""},
                {"TYPE": "W", "ID": "V4", "NUMBER": "219", "MESSAGE": "Sales document was not changed"}
            ]
        });

        let messages = parse_bapi_return(&body);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].severity, MessageSeverity::Success);
        assert_eq!(messages[0].code.as_deref(), Some("V1/311"));
        assert_eq!(messages[1].severity, MessageSeverity::Warning);
    }

    #[test]
    fn bapi_return_single_structure_lowercase_keys() {
        let body = json!({
            "return": {"type": "E", "id": "VP", "number": "112", "message": "Sold-to party 4711 not found"}
        });

        let messages = parse_bapi_return(&body);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].severity.is_error());
        assert_eq!(messages[0].text, "Sold-to party 4711 not found");
    }

    #[test]
    fn bapi_return_missing_is_empty() {
        assert!(parse_bapi_return(&json!({"SALESDOCUMENT": ""})).is_empty());
    }

    #[test]
    fn odata_error_with_details() {
        let body = json!({
            "error": {
                "code": "V1/391",
                "message": {"lang": "en", "value": "Material MAT-9 is blocked"},
                "innererror": {
                    "errordetails": [
                        {"code": "V1/391", "message": "Material MAT-9 is blocked", "severity": "error"},
                        {"code": "/IWBEP/CX_MGW_BUSI_EXCEPTION", "message": "An exception was raised", "severity": "error"}
                    ]
                }
            }
        });

        let error = parse_odata_error(&body).unwrap();
        assert_eq!(error.code.as_deref(), Some("V1/391"));
        assert_eq!(error.message, "Material MAT-9 is blocked");
        assert_eq!(error.details.len(), 2);
    }

    #[test]
    fn odata_error_without_details_uses_message() {
        let body = json!({"error": {"code": "SY/530", "message": {"value": "Not authorized"}}});
        let error = parse_odata_error(&body).unwrap();
        assert_eq!(error.details.len(), 1);
        assert_eq!(error.details[0].text, "Not authorized");
    }

    #[test]
    fn xml_error_document() {
        let body = r#"<?xml version="1.0" encoding="utf-8"?>
<error xmlns="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata">
  <code>/IWBEP/CM_MGW_RT/020</code>
  <message xml:lang="en">Resource not found for segment &apos;A_SalesOrderType&apos;</message>
</error>"#;

        let error = parse_xml_error(body).unwrap();
        assert_eq!(error.code.as_deref(), Some("/IWBEP/CM_MGW_RT/020"));
        assert_eq!(
            error.message,
            "Resource not found for segment 'A_SalesOrderType'"
        );
    }

    #[test]
    fn sap_message_header_with_details() {
        let header = r#"{"code":"V1/555","message":"Order saved with warnings","severity":"warning","details":[{"code":"V1/556","message":"Price missing for item 20","severity":"info"}]}"#;
        let messages = parse_sap_message_header(header);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].severity, MessageSeverity::Warning);
        assert_eq!(messages[1].severity, MessageSeverity::Info);
    }

    #[test]
    fn sap_message_header_garbage_is_ignored() {
        assert!(parse_sap_message_header("not json").is_empty());
    }

    #[test]
    fn dates_in_all_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 11, 14).unwrap();
        assert_eq!(parse_sap_date("/Date(1699920000000)/"), Some(expected));
        assert_eq!(parse_sap_date("/Date(1699920000000+0000)/"), Some(expected));
        assert_eq!(parse_sap_date("2023-11-14"), Some(expected));
        assert_eq!(parse_sap_date("2023-11-14T00:00:00"), Some(expected));
        assert_eq!(parse_sap_date("20231114"), Some(expected));
        assert_eq!(parse_sap_date("00000000"), None);
        assert_eq!(parse_sap_date("yesterday"), None);
    }

    #[test]
    fn results_from_collection_and_entity() {
        let collection = json!({"d": {"results": [{"SalesOrder": "1"}, {"SalesOrder": "2"}]}});
        assert_eq!(odata_results(&collection).len(), 2);

        let entity = json!({"d": {"SalesOrder": "1"}});
        assert_eq!(odata_results(&entity).len(), 1);

        let v4 = json!({"value": [{"SalesOrder": "1"}]});
        assert_eq!(odata_results(&v4).len(), 1);
    }

    #[test]
    fn decimals_from_strings_and_numbers() {
        let v = json!({"NetAmount": "1234.50", "Qty": 3});
        assert_eq!(field_decimal(&v, "NetAmount"), Some(dec!(1234.50)));
        assert_eq!(field_decimal(&v, "qty"), Some(dec!(3)));
        assert_eq!(field_decimal(&v, "Missing"), None);
    }

    #[test]
    fn classify_unauthorized_html() {
        let result = classify(401, "<html><body>Logon failed</body></html>");
        assert!(matches!(result, Err(SapError::Unauthorized)));
    }

    #[test]
    fn classify_html_error_page_is_summarized() {
        let result = classify(500, "<html><head><title>500 SRT</title></head><body><h1>Internal Server Error</h1></body></html>");
        match result {
            Err(SapError::Http { status, message }) => {
                assert_eq!(status, 500);
                assert!(message.contains("Internal Server Error"));
                assert!(!message.contains('<'));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn classify_odata_error_json() {
        let body = r#"{"error":{"code":"SY/530","message":{"lang":"en","value":"Document locked"}}}"#;
        match classify(400, body) {
            Err(SapError::OData { status, message, .. }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Document locked");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn classify_success_json_and_empty() {
        assert_eq!(classify(200, r#"{"d":{}}"#).unwrap(), json!({"d": {}}));
        assert_eq!(classify(204, "").unwrap(), Value::Null);
        assert!(matches!(
            classify(200, "{not json"),
            Err(SapError::Deserialization(_))
        ));
    }
}
