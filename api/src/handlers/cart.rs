//! Cart handlers
//!
//! The cart belongs to the authenticated user. Simulation, checkout and quote
//! requests resolve the company (and its SAP connection) they act for first,
//! and a requested ship-to must be one of that company's partners.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::{CheckoutOutcome, CheckoutRequest, QuoteOutcome, QuoteRequest, SimulateRequest};
use crate::domain::entities::{Cart, CartItem, CartItemId, NewCartItem, PortalUser, Simulation};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: Decimal,
}

/// GET /cart
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(user): Extension<PortalUser>,
) -> Result<Json<Cart>, AppError> {
    Ok(Json(state.cart_service.get_or_create(&user).await?))
}

/// DELETE /cart
pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(user): Extension<PortalUser>,
) -> Result<StatusCode, AppError> {
    state.cart_service.clear(&user).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /cart/items
pub async fn add_item(
    State(state): State<AppState>,
    Extension(user): Extension<PortalUser>,
    Json(item): Json<NewCartItem>,
) -> Result<(StatusCode, Json<CartItem>), AppError> {
    let item = state.cart_service.add_item(&user, &item).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PATCH /cart/items/:id
pub async fn update_item(
    State(state): State<AppState>,
    Extension(user): Extension<PortalUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartItem>, AppError> {
    let item = state
        .cart_service
        .update_quantity(&user, &CartItemId(id), request.quantity)
        .await?;
    Ok(Json(item))
}

/// DELETE /cart/items/:id
pub async fn remove_item(
    State(state): State<AppState>,
    Extension(user): Extension<PortalUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.cart_service.remove_item(&user, &CartItemId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /cart/simulate
pub async fn simulate(
    State(state): State<AppState>,
    Extension(user): Extension<PortalUser>,
    body: Option<Json<SimulateRequest>>,
) -> Result<Json<Simulation>, AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let (company, connection) = state
        .company_service
        .sap_context(&user, request.company_id)
        .await?;
    state
        .partner_service
        .ensure_ship_to(&user, &company, &connection, request.ship_to.as_deref())
        .await?;

    let simulation = state
        .order_service
        .simulate(&user, &company, &connection, &request)
        .await?;
    Ok(Json(simulation))
}

/// POST /cart/checkout
///
/// SAP business rejections still answer 200 with `success: false`.
pub async fn checkout(
    State(state): State<AppState>,
    Extension(user): Extension<PortalUser>,
    body: Option<Json<CheckoutRequest>>,
) -> Result<Json<CheckoutOutcome>, AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let (company, connection) = state
        .company_service
        .sap_context(&user, request.company_id)
        .await?;
    state
        .partner_service
        .ensure_ship_to(&user, &company, &connection, request.ship_to.as_deref())
        .await?;

    let outcome = state
        .order_service
        .checkout(&user, &company, &connection, &request)
        .await?;
    Ok(Json(outcome))
}

/// POST /cart/quote
pub async fn request_quote(
    State(state): State<AppState>,
    Extension(user): Extension<PortalUser>,
    body: Option<Json<QuoteRequest>>,
) -> Result<Json<QuoteOutcome>, AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let (company, connection) = state
        .company_service
        .sap_context(&user, request.company_id)
        .await?;
    state
        .partner_service
        .ensure_ship_to(&user, &company, &connection, request.ship_to.as_deref())
        .await?;

    let outcome = state
        .order_service
        .request_quote(&user, &company, &connection, &request)
        .await?;
    Ok(Json(outcome))
}
