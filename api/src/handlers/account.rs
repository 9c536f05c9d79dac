//! Account handlers

use axum::{Extension, Json};

use crate::domain::entities::PortalUser;

/// GET /me
///
/// The authenticated user.
pub async fn me(Extension(user): Extension<PortalUser>) -> Json<PortalUser> {
    Json(user)
}
