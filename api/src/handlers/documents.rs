//! SAP document handlers
//!
//! Each list answers `{ source, documents }`.

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use super::CompanyQuery;
use crate::app::DocumentList;
use crate::domain::entities::{Delivery, Invoice, PortalUser, SalesDocumentSummary};
use crate::error::AppError;
use crate::AppState;

/// GET /documents/sales-orders
pub async fn sales_orders(
    State(state): State<AppState>,
    Extension(user): Extension<PortalUser>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<DocumentList<SalesDocumentSummary>>, AppError> {
    let (company, connection) = state
        .company_service
        .sap_context(&user, query.company())
        .await?;
    let list = state
        .document_service
        .sales_orders(&company, &connection, query.top)
        .await?;
    Ok(Json(list))
}

/// GET /documents/quotations
pub async fn quotations(
    State(state): State<AppState>,
    Extension(user): Extension<PortalUser>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<DocumentList<SalesDocumentSummary>>, AppError> {
    let (company, connection) = state
        .company_service
        .sap_context(&user, query.company())
        .await?;
    let list = state
        .document_service
        .quotations(&company, &connection, query.top)
        .await?;
    Ok(Json(list))
}

/// GET /documents/deliveries
pub async fn deliveries(
    State(state): State<AppState>,
    Extension(user): Extension<PortalUser>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<DocumentList<Delivery>>, AppError> {
    let (company, connection) = state
        .company_service
        .sap_context(&user, query.company())
        .await?;
    let list = state
        .document_service
        .deliveries(&company, &connection, query.top)
        .await?;
    Ok(Json(list))
}

/// GET /documents/invoices
pub async fn invoices(
    State(state): State<AppState>,
    Extension(user): Extension<PortalUser>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<DocumentList<Invoice>>, AppError> {
    let (company, connection) = state
        .company_service
        .sap_context(&user, query.company())
        .await?;
    let list = state
        .document_service
        .invoices(&company, &connection, query.top)
        .await?;
    Ok(Json(list))
}
