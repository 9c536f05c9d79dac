//! Handlers for orders and quotes recorded by the portal

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use super::CompanyQuery;
use crate::domain::entities::{Order, OrderId, PortalUser, Quote, QuoteId};
use crate::error::AppError;
use crate::AppState;

/// GET /orders
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(user): Extension<PortalUser>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let company = state
        .company_service
        .company_for(&user, query.company())
        .await?;
    Ok(Json(state.order_service.list_orders(&company.id).await?))
}

/// GET /orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<PortalUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.order_service.get_order(&user, &OrderId(id)).await?))
}

/// GET /quotes
pub async fn list_quotes(
    State(state): State<AppState>,
    Extension(user): Extension<PortalUser>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<Vec<Quote>>, AppError> {
    let company = state
        .company_service
        .company_for(&user, query.company())
        .await?;
    Ok(Json(state.order_service.list_quotes(&company.id).await?))
}

/// GET /quotes/:id
pub async fn get_quote(
    State(state): State<AppState>,
    Extension(user): Extension<PortalUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Quote>, AppError> {
    Ok(Json(state.order_service.get_quote(&user, &QuoteId(id)).await?))
}
