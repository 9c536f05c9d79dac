//! Catalog handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::Recommendation;
use crate::domain::entities::{Product, ProductId};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub query: String,
}

/// GET /products?search=
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = state
        .catalog_service
        .search(query.search.as_deref(), query.limit)
        .await?;
    Ok(Json(products))
}

/// GET /products/:id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(state.catalog_service.get(&ProductId(id)).await?))
}

/// POST /products/recommend
///
/// Matching products plus a short advisor text when the completion API is
/// available.
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<Recommendation>, AppError> {
    Ok(Json(state.catalog_service.recommend(&request.query).await?))
}
