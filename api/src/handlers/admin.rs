//! Admin console handlers
//!
//! Only reachable for users with the `admin` role.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::{ConnectionTest, CreateUserRequest};
use crate::domain::entities::{
    Company, CompanyId, CompanyUpdate, NewCompany, NewProduct, NewSapConnection, PortalUser,
    Product, ProductId, ProductUpdate, SapConnection,
};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    #[serde(default)]
    pub company_id: Option<Uuid>,
}

/// Response for user creation (API key only shown once!)
#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    #[serde(flatten)]
    pub user: PortalUser,
    pub api_key: String,
}

/// GET /admin/companies
pub async fn list_companies(State(state): State<AppState>) -> Result<Json<Vec<Company>>, AppError> {
    Ok(Json(state.company_service.list().await?))
}

/// POST /admin/companies
pub async fn create_company(
    State(state): State<AppState>,
    Json(company): Json<NewCompany>,
) -> Result<(StatusCode, Json<Company>), AppError> {
    let company = state.company_service.create(&company).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// PATCH /admin/companies/:id
pub async fn update_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<CompanyUpdate>,
) -> Result<Json<Company>, AppError> {
    let company = state
        .company_service
        .update(&CompanyId(id), &update)
        .await?;
    Ok(Json(company))
}

/// PUT /admin/companies/:id/sap-connection
///
/// The password is accepted but never echoed back.
pub async fn put_connection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(connection): Json<NewSapConnection>,
) -> Result<Json<SapConnection>, AppError> {
    let connection = state
        .company_service
        .set_connection(&CompanyId(id), &connection)
        .await?;
    Ok(Json(connection))
}

/// POST /admin/companies/:id/sap-connection/test
pub async fn test_connection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConnectionTest>, AppError> {
    Ok(Json(
        state.company_service.test_connection(&CompanyId(id)).await?,
    ))
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<PortalUser>>, AppError> {
    let company_id = query.company_id.map(CompanyId);
    Ok(Json(state.user_service.list(company_id.as_ref()).await?))
}

/// POST /admin/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), AppError> {
    let (user, api_key) = state.user_service.create(&request).await?;
    Ok((StatusCode::CREATED, Json(CreateUserResponse { user, api_key })))
}

/// POST /admin/products
pub async fn create_product(
    State(state): State<AppState>,
    Json(product): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = state.catalog_service.create(&product).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PATCH /admin/products/:id
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(
        state
            .catalog_service
            .update(&ProductId(id), &update)
            .await?,
    ))
}

/// DELETE /admin/products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.catalog_service.delete(&ProductId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
