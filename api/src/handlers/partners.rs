//! Partner handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use super::CompanyQuery;
use crate::domain::entities::{Partner, PortalUser};
use crate::error::AppError;
use crate::AppState;

/// GET /partners/ship-to
///
/// Ship-to parties the company may deliver to, the sold-to party first.
pub async fn ship_to_parties(
    State(state): State<AppState>,
    Extension(user): Extension<PortalUser>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<Vec<Partner>>, AppError> {
    let (company, connection) = state
        .company_service
        .sap_context(&user, query.company())
        .await?;
    let partners = state
        .partner_service
        .ship_to_parties(&company, &connection)
        .await?;
    Ok(Json(partners))
}

/// GET /partners/:number
///
/// Customers only get the partners of their own company; anything else is 404.
pub async fn get_partner(
    State(state): State<AppState>,
    Extension(user): Extension<PortalUser>,
    Path(number): Path<String>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<Partner>, AppError> {
    let (company, connection) = state
        .company_service
        .sap_context(&user, query.company())
        .await?;
    let partner = state
        .partner_service
        .partner(&user, &company, &connection, &number)
        .await?;
    Ok(Json(partner))
}
