//! Translation of sales document requests into SAP payloads
//!
//! RFC payloads follow the BAPI parameter layout (`ORDER_HEADER_IN`,
//! `ORDER_ITEMS_IN`, ...). OData payloads are deep inserts on the
//! `A_SalesOrder` / `A_SalesQuotation` / `A_SalesOrderSimulation` entities.
//! Item numbers are positional: the n-th request line is item `n * 10`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

use crate::domain::entities::{RequestItem, SalesDocumentRequest};
use crate::error::SapError;

pub const PARTNER_SOLD_TO: &str = "AG";
pub const PARTNER_SHIP_TO: &str = "WE";

const CUSTOMER_WIDTH: usize = 10;
const MATERIAL_WIDTH: usize = 18;
const FIRST_SCHEDULE_LINE: &str = "0001";
const ROOT_INSTANCE: &str = "00000001";

/// Which BAPI family a payload is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RfcDocument {
    Order,
    Quotation,
}

impl RfcDocument {
    fn prefix(&self) -> &'static str {
        match self {
            RfcDocument::Order => "ORDER",
            RfcDocument::Quotation => "QUOTATION",
        }
    }

    pub fn function(&self) -> &'static str {
        match self {
            RfcDocument::Order => "BAPI_SALESORDER_CREATEFROMDAT2",
            RfcDocument::Quotation => "BAPI_QUOTATION_CREATEFROMDATA2",
        }
    }
}

pub const SIMULATE_FUNCTION: &str = "BAPI_SALESORDER_SIMULATE";
pub const COMMIT_FUNCTION: &str = "BAPI_TRANSACTION_COMMIT";

// ============================================================================
// Field formatting
// ============================================================================

/// Positional item number of the line at `index` (10, 20, 30, ...)
pub fn item_number(index: usize) -> u32 {
    (index as u32 + 1) * 10
}

/// RFC item number, zero padded to six digits (`000010`)
pub fn rfc_item_number(index: usize) -> String {
    format!("{:06}", item_number(index))
}

/// SAP ALPHA conversion: purely numeric codes are left padded with zeros,
/// anything else is trimmed and upper-cased.
pub fn alpha(value: &str, width: usize) -> String {
    let trimmed = value.trim();
    if !trimmed.is_empty() && trimmed.len() <= width && trimmed.chars().all(|c| c.is_ascii_digit())
    {
        format!("{:0>width$}", trimmed, width = width)
    } else {
        trimmed.to_uppercase()
    }
}

pub fn customer_number(value: &str) -> String {
    alpha(value, CUSTOMER_WIDTH)
}

pub fn material_number(value: &str) -> String {
    alpha(value, MATERIAL_WIDTH)
}

/// RFC date (`YYYYMMDD`)
pub fn rfc_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// OData V2 `Edm.DateTime` literal (`/Date(<millis>)/`)
pub fn odata_date(date: NaiveDate) -> String {
    let millis = date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default();
    format!("/Date({})/", millis)
}

/// Quantity without trailing zeros (`2.000` -> `2`)
pub fn quantity(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Quantity in thousandths, as `BAPI_SALESORDER_SIMULATE` expects in `REQ_QTY`
pub fn simulate_quantity(value: Decimal) -> String {
    (value * Decimal::from(1000)).round().to_string()
}

fn validate(request: &SalesDocumentRequest) -> Result<(), SapError> {
    if request.items.is_empty() {
        return Err(SapError::InvalidRequest(
            "a sales document needs at least one item".to_string(),
        ));
    }
    if request.sold_to.trim().is_empty() {
        return Err(SapError::InvalidRequest("sold-to party is missing".to_string()));
    }
    if request.ship_to.trim().is_empty() {
        return Err(SapError::InvalidRequest("ship-to party is missing".to_string()));
    }
    if let Some(item) = request.items.iter().find(|i| i.quantity <= Decimal::ZERO) {
        return Err(SapError::InvalidRequest(format!(
            "quantity for material {} must be positive",
            item.material
        )));
    }
    if let (Some(from), Some(to)) = (request.valid_from, request.valid_to) {
        if to < from {
            return Err(SapError::InvalidRequest(
                "validity end precedes validity start".to_string(),
            ));
        }
    }
    Ok(())
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<String>) {
    if let Some(v) = value {
        map.insert(key.to_string(), Value::String(v));
    }
}

// ============================================================================
// RFC (BAPI) payloads
// ============================================================================

fn rfc_header(request: &SalesDocumentRequest, document: Option<RfcDocument>) -> Value {
    let mut header = Map::new();
    header.insert("DOC_TYPE".into(), json!(request.doc_type.trim().to_uppercase()));
    header.insert("SALES_ORG".into(), json!(request.sales_org));
    header.insert("DISTR_CHAN".into(), json!(request.distribution_channel));
    header.insert("DIVISION".into(), json!(request.division));
    insert_opt(&mut header, "PURCH_NO_C", request.purchase_order.clone());
    insert_opt(&mut header, "REQ_DATE_H", request.requested_date.map(rfc_date));
    if document == Some(RfcDocument::Quotation) {
        insert_opt(&mut header, "QT_VALID_F", request.valid_from.map(rfc_date));
        insert_opt(&mut header, "QT_VALID_T", request.valid_to.map(rfc_date));
    }
    Value::Object(header)
}

fn rfc_partners(request: &SalesDocumentRequest) -> Value {
    json!([
        {"PARTN_ROLE": PARTNER_SOLD_TO, "PARTN_NUMB": customer_number(&request.sold_to)},
        {"PARTN_ROLE": PARTNER_SHIP_TO, "PARTN_NUMB": customer_number(&request.ship_to)},
    ])
}

/// Configuration tables for configured items only.
///
/// Each configured item gets the next CONFIG_ID (`000001`, `000002`, ...)
/// with a single root instance. `POSEX` links back to the item's `PO_ITM_NO`.
fn rfc_configuration(items: &[RequestItem]) -> (Vec<Value>, Vec<Value>, Vec<Value>) {
    let mut refs = Vec::new();
    let mut instances = Vec::new();
    let mut values = Vec::new();

    let configured = items
        .iter()
        .enumerate()
        .filter(|(_, item)| !item.configuration.is_empty());

    for (n, (index, item)) in configured.enumerate() {
        let config_id = format!("{:06}", n + 1);
        refs.push(json!({
            "POSEX": rfc_item_number(index),
            "CONFIG_ID": config_id,
            "ROOT_ID": ROOT_INSTANCE,
            "COMPLETE": "T",
            "CONSISTENT": "T",
        }));

        let mut instance = Map::new();
        instance.insert("CONFIG_ID".into(), json!(config_id));
        instance.insert("INST_ID".into(), json!(ROOT_INSTANCE));
        instance.insert("OBJ_TYPE".into(), json!("MARA"));
        instance.insert("CLASS_TYPE".into(), json!("300"));
        instance.insert("OBJ_KEY".into(), json!(material_number(&item.material)));
        instance.insert("QUANTITY".into(), json!(quantity(item.quantity)));
        insert_opt(&mut instance, "QUANTITY_UNIT", item.unit.clone());
        instances.push(Value::Object(instance));

        for characteristic in &item.configuration {
            values.push(json!({
                "CONFIG_ID": config_id,
                "INST_ID": ROOT_INSTANCE,
                "CHARC": characteristic.name.trim().to_uppercase(),
                "VALUE": characteristic.value.trim(),
            }));
        }
    }

    (refs, instances, values)
}

/// Payload for `BAPI_SALESORDER_CREATEFROMDAT2` / `BAPI_QUOTATION_CREATEFROMDATA2`
pub fn rfc_document_payload(
    document: RfcDocument,
    request: &SalesDocumentRequest,
) -> Result<Value, SapError> {
    validate(request)?;
    let prefix = document.prefix();

    let mut items = Vec::with_capacity(request.items.len());
    let mut schedules = Vec::with_capacity(request.items.len());
    for (index, item) in request.items.iter().enumerate() {
        let posnr = rfc_item_number(index);

        let mut line = Map::new();
        line.insert("ITM_NUMBER".into(), json!(posnr));
        line.insert("PO_ITM_NO".into(), json!(posnr));
        line.insert("MATERIAL".into(), json!(material_number(&item.material)));
        line.insert("TARGET_QTY".into(), json!(quantity(item.quantity)));
        insert_opt(&mut line, "TARGET_QU", item.unit.clone());
        insert_opt(&mut line, "PLANT", item.plant.clone());
        items.push(Value::Object(line));

        let mut schedule = Map::new();
        schedule.insert("ITM_NUMBER".into(), json!(posnr));
        schedule.insert("SCHED_LINE".into(), json!(FIRST_SCHEDULE_LINE));
        schedule.insert("REQ_QTY".into(), json!(quantity(item.quantity)));
        insert_opt(&mut schedule, "REQ_DATE", request.requested_date.map(rfc_date));
        schedules.push(Value::Object(schedule));
    }

    let (refs, instances, values) = rfc_configuration(&request.items);

    let mut payload = Map::new();
    payload.insert(format!("{}_HEADER_IN", prefix), rfc_header(request, Some(document)));
    payload.insert(format!("{}_ITEMS_IN", prefix), Value::Array(items));
    payload.insert(format!("{}_SCHEDULES_IN", prefix), Value::Array(schedules));
    payload.insert(format!("{}_PARTNERS", prefix), rfc_partners(request));
    if !refs.is_empty() {
        payload.insert(format!("{}_CFGS_REF", prefix), Value::Array(refs));
        payload.insert(format!("{}_CFGS_INST", prefix), Value::Array(instances));
        payload.insert(format!("{}_CFGS_VALUE", prefix), Value::Array(values));
    }
    Ok(Value::Object(payload))
}

pub fn rfc_order_payload(request: &SalesDocumentRequest) -> Result<Value, SapError> {
    rfc_document_payload(RfcDocument::Order, request)
}

pub fn rfc_quote_payload(request: &SalesDocumentRequest) -> Result<Value, SapError> {
    rfc_document_payload(RfcDocument::Quotation, request)
}

/// Payload for `BAPI_SALESORDER_SIMULATE`
pub fn rfc_simulate_payload(request: &SalesDocumentRequest) -> Result<Value, SapError> {
    validate(request)?;

    let mut items = Vec::with_capacity(request.items.len());
    let mut schedules = Vec::with_capacity(request.items.len());
    for (index, item) in request.items.iter().enumerate() {
        let posnr = rfc_item_number(index);

        let mut line = Map::new();
        line.insert("ITM_NUMBER".into(), json!(posnr));
        line.insert("PO_ITM_NO".into(), json!(posnr));
        line.insert("MATERIAL".into(), json!(material_number(&item.material)));
        line.insert("REQ_QTY".into(), json!(simulate_quantity(item.quantity)));
        insert_opt(&mut line, "SALES_UNIT", item.unit.clone());
        insert_opt(&mut line, "PLANT", item.plant.clone());
        items.push(Value::Object(line));

        let mut schedule = Map::new();
        schedule.insert("ITM_NUMBER".into(), json!(posnr));
        schedule.insert("REQ_QTY".into(), json!(quantity(item.quantity)));
        insert_opt(&mut schedule, "REQ_DATE", request.requested_date.map(rfc_date));
        schedules.push(Value::Object(schedule));
    }

    let (refs, instances, values) = rfc_configuration(&request.items);

    let mut payload = Map::new();
    payload.insert("ORDER_HEADER_IN".into(), rfc_header(request, None));
    payload.insert("ORDER_ITEMS_IN".into(), Value::Array(items));
    payload.insert("ORDER_PARTNERS".into(), rfc_partners(request));
    payload.insert("ORDER_SCHEDULE_IN".into(), Value::Array(schedules));
    if !refs.is_empty() {
        payload.insert("ORDER_CFGS_REF".into(), Value::Array(refs));
        payload.insert("ORDER_CFGS_INST".into(), Value::Array(instances));
        payload.insert("ORDER_CFGS_VALUE".into(), Value::Array(values));
    }
    Ok(Value::Object(payload))
}

/// Payload for `BAPI_TRANSACTION_COMMIT`
pub fn rfc_commit_payload() -> Value {
    json!({"WAIT": "X"})
}

// ============================================================================
// OData payloads
// ============================================================================

/// Characteristic values are carried as item long text on OData
fn configuration_text(item: &RequestItem) -> Option<String> {
    if item.configuration.is_empty() {
        return None;
    }
    Some(
        item.configuration
            .iter()
            .map(|c| format!("{}={}", c.name.trim().to_uppercase(), c.value.trim()))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

fn odata_items(request: &SalesDocumentRequest, item_key: &str, with_text: bool) -> Value {
    let items = request
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let mut line = Map::new();
            line.insert(item_key.to_string(), json!(item_number(index).to_string()));
            line.insert("Material".into(), json!(item.material.trim()));
            line.insert("RequestedQuantity".into(), json!(quantity(item.quantity)));
            insert_opt(&mut line, "RequestedQuantityUnit", item.unit.clone());
            insert_opt(&mut line, "ProductionPlant", item.plant.clone());
            if with_text {
                if let Some(text) = configuration_text(item) {
                    line.insert(
                        "to_Text".into(),
                        json!([{"Language": "EN", "LongTextID": "0001", "LongText": text}]),
                    );
                }
            }
            Value::Object(line)
        })
        .collect();
    Value::Array(items)
}

fn odata_header(request: &SalesDocumentRequest, type_key: &str) -> Map<String, Value> {
    let mut header = Map::new();
    header.insert(type_key.to_string(), json!(request.doc_type.trim().to_uppercase()));
    header.insert("SalesOrganization".into(), json!(request.sales_org));
    header.insert("DistributionChannel".into(), json!(request.distribution_channel));
    header.insert("OrganizationDivision".into(), json!(request.division));
    header.insert("SoldToParty".into(), json!(request.sold_to.trim()));
    insert_opt(&mut header, "PurchaseOrderByCustomer", request.purchase_order.clone());
    header.insert(
        "to_Partner".into(),
        json!([{"PartnerFunction": PARTNER_SHIP_TO, "Customer": request.ship_to.trim()}]),
    );
    header
}

/// Deep insert body for `API_SALES_ORDER_SRV/A_SalesOrder`
pub fn odata_order_payload(request: &SalesDocumentRequest) -> Result<Value, SapError> {
    validate(request)?;
    let mut body = odata_header(request, "SalesOrderType");
    insert_opt(&mut body, "RequestedDeliveryDate", request.requested_date.map(odata_date));
    body.insert("to_Item".into(), odata_items(request, "SalesOrderItem", true));
    Ok(Value::Object(body))
}

/// Deep insert body for `API_SALES_QUOTATION_SRV/A_SalesQuotation`
pub fn odata_quote_payload(request: &SalesDocumentRequest) -> Result<Value, SapError> {
    validate(request)?;
    let mut body = odata_header(request, "SalesQuotationType");
    insert_opt(
        &mut body,
        "BindingPeriodValidityStartDate",
        request.valid_from.map(odata_date),
    );
    insert_opt(
        &mut body,
        "BindingPeriodValidityEndDate",
        request.valid_to.map(odata_date),
    );
    body.insert("to_Item".into(), odata_items(request, "SalesQuotationItem", true));
    Ok(Value::Object(body))
}

/// Body for `API_SALES_ORDER_SIMULATION_SRV/A_SalesOrderSimulation`
pub fn odata_simulation_payload(request: &SalesDocumentRequest) -> Result<Value, SapError> {
    validate(request)?;
    let mut body = odata_header(request, "SalesOrderType");
    insert_opt(&mut body, "RequestedDeliveryDate", request.requested_date.map(odata_date));
    body.insert("to_Item".into(), odata_items(request, "SalesOrderItem", false));
    Ok(Value::Object(body))
}

/// Quote a value for an OData `$filter` literal
pub fn filter_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
