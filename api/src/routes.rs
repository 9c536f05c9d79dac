//! HTTP routing
//!
//! Everything except `/health` sits behind API key auth. Routes that write to
//! SAP can be rate limited per client IP.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{auth, handlers, AppState};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the application router
///
/// Rate limiting relies on the peer address, so the router must be served
/// with `into_make_service_with_connect_info::<SocketAddr>()` when it is on.
pub fn router(state: AppState, rate_limited: bool) -> Router {
    // Simulation, order/quote creation and connection tests hit SAP
    let mut sap_writes = Router::new()
        .route("/cart/simulate", post(handlers::simulate))
        .route("/cart/checkout", post(handlers::checkout))
        .route("/cart/quote", post(handlers::request_quote));
    let mut connection_test = Router::new().route(
        "/admin/companies/:id/sap-connection/test",
        post(handlers::test_connection),
    );

    if rate_limited {
        // 2 req/sec sustained, burst of 5
        match GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(2)
            .burst_size(5)
            .finish()
        {
            Some(config) => {
                let config = Arc::new(config);
                sap_writes = sap_writes.layer(GovernorLayer {
                    config: config.clone(),
                });
                connection_test = connection_test.layer(GovernorLayer { config });
            }
            None => tracing::warn!("Invalid rate limit settings, SAP writes are not limited"),
        }
    }

    let admin = Router::new()
        .route(
            "/admin/companies",
            get(handlers::list_companies).post(handlers::create_company),
        )
        .route("/admin/companies/:id", patch(handlers::update_company))
        .route(
            "/admin/companies/:id/sap-connection",
            put(handlers::put_connection),
        )
        .merge(connection_test)
        .route(
            "/admin/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/admin/products", post(handlers::create_product))
        .route(
            "/admin/products/:id",
            patch(handlers::update_product).delete(handlers::delete_product),
        )
        .route_layer(middleware::from_fn(auth::require_admin));

    let protected = Router::new()
        .route("/me", get(handlers::me))
        // Catalog
        .route("/products", get(handlers::list_products))
        .route("/products/recommend", post(handlers::recommend))
        .route("/products/:id", get(handlers::get_product))
        // Cart
        .route(
            "/cart",
            get(handlers::get_cart).delete(handlers::clear_cart),
        )
        .route("/cart/items", post(handlers::add_item))
        .route(
            "/cart/items/:id",
            patch(handlers::update_item).delete(handlers::remove_item),
        )
        .merge(sap_writes)
        // Portal records
        .route("/orders", get(handlers::list_orders))
        .route("/orders/:id", get(handlers::get_order))
        .route("/quotes", get(handlers::list_quotes))
        .route("/quotes/:id", get(handlers::get_quote))
        // SAP documents
        .route("/documents/sales-orders", get(handlers::sales_orders))
        .route("/documents/quotations", get(handlers::quotations))
        .route("/documents/deliveries", get(handlers::deliveries))
        .route("/documents/invoices", get(handlers::invoices))
        // Partners
        .route("/partners/ship-to", get(handlers::ship_to_parties))
        .route("/partners/:number", get(handlers::get_partner))
        .merge(admin)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
