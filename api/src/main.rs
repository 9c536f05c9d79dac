//! Commerce Portal API Server
//!
//! Customer and admin portal backend for ordering against SAP: catalog, cart,
//! pricing simulation, order and quote creation, and SAP document lookups.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sea_orm::Database;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;
mod routes;

#[cfg(test)]
mod test_utils;


use adapters::{
    HttpMailer, NoopCompletionClient, NoopMailer, NoopSessionCache, OpenAiCompletionClient,
    PostgresCartRepository, PostgresCompanyRepository, PostgresOrderRepository,
    PostgresProductRepository, PostgresQuoteRepository, PostgresSapConnectionRepository,
    PostgresUserRepository, RestSessionCache, SapGatewayImpl,
};
use app::{
    CartService, CatalogService, CompanyService, DocumentService, OrderService, PartnerService,
    UserService,
};
use config::Config;
use domain::ports::{
    CartRepository, CompanyRepository, CompletionClient, Mailer, OrderRepository,
    ProductRepository, QuoteRepository, SapConnectionRepository, SapGateway, SessionCache,
    UserRepository,
};

/// Every outbound dependency of the application
#[derive(Clone)]
pub struct Ports {
    pub companies: Arc<dyn CompanyRepository>,
    pub connections: Arc<dyn SapConnectionRepository>,
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub quotes: Arc<dyn QuoteRepository>,
    pub sap: Arc<dyn SapGateway>,
    pub cache: Arc<dyn SessionCache>,
    pub mailer: Arc<dyn Mailer>,
    pub completion: Arc<dyn CompletionClient>,
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub company_service: Arc<CompanyService>,
    pub catalog_service: Arc<CatalogService>,
    pub cart_service: Arc<CartService>,
    pub order_service: Arc<OrderService>,
    pub document_service: Arc<DocumentService>,
    pub partner_service: Arc<PartnerService>,
}

impl AppState {
    pub fn new(ports: Ports, config: &Config) -> Self {
        Self {
            user_service: Arc::new(UserService::new(
                ports.users.clone(),
                ports.companies.clone(),
            )),
            company_service: Arc::new(CompanyService::new(
                ports.companies.clone(),
                ports.connections.clone(),
                ports.sap.clone(),
            )),
            catalog_service: Arc::new(CatalogService::new(
                ports.products.clone(),
                ports.completion.clone(),
            )),
            cart_service: Arc::new(CartService::new(ports.carts.clone(), ports.products.clone())),
            order_service: Arc::new(OrderService::new(
                ports.carts.clone(),
                ports.orders.clone(),
                ports.quotes.clone(),
                ports.sap.clone(),
                ports.mailer.clone(),
            )),
            document_service: Arc::new(DocumentService::new(
                ports.sap.clone(),
                config.sap_demo_fallback,
            )),
            partner_service: Arc::new(PartnerService::new(
                ports.sap,
                ports.cache,
                config.partner_cache_ttl_secs,
            )),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,portal_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting portal API...");

    // Load configuration
    let config = Config::from_env();

    // Connect to PostgreSQL
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");
    tracing::info!(
        session_cache = config.session_cache_enabled(),
        mail = config.mail_enabled(),
        completion = config.completion_enabled(),
        demo_fallback = config.sap_demo_fallback,
        "Integrations"
    );

    let cache: Arc<dyn SessionCache> = match &config.session_cache_url {
        Some(url) => Arc::new(
            RestSessionCache::new(
                url.clone(),
                config.session_cache_token.clone(),
                Duration::from_secs(config.cache_timeout_secs),
            )
            .context("Failed to build session cache client")?,
        ),
        None => {
            tracing::warn!("SESSION_CACHE_URL not set, CSRF sessions and partners are not cached");
            Arc::new(NoopSessionCache)
        }
    };

    let mailer: Arc<dyn Mailer> = match (&config.mail_api_url, &config.mail_api_key) {
        (Some(url), Some(key)) => Arc::new(
            HttpMailer::new(
                url.clone(),
                key.clone(),
                config.mail_from.clone(),
                Duration::from_secs(config.http_timeout_secs),
            )
            .context("Failed to build mail client")?,
        ),
        _ => {
            tracing::info!("Mail API not configured, confirmations are only logged");
            Arc::new(NoopMailer)
        }
    };

    let completion: Arc<dyn CompletionClient> =
        match (&config.completion_api_url, &config.completion_api_key) {
            (Some(url), Some(key)) => Arc::new(
                OpenAiCompletionClient::new(
                    url.clone(),
                    key.clone(),
                    config.completion_model.clone(),
                    Duration::from_secs(config.http_timeout_secs),
                )
                .context("Failed to build completion client")?,
            ),
            _ => Arc::new(NoopCompletionClient),
        };

    let sap = SapGatewayImpl::new(
        cache.clone(),
        config.csrf_session_ttl_secs,
        Duration::from_secs(config.sap_timeout_secs),
    )
    .context("Failed to build SAP HTTP client")?;

    let ports = Ports {
        companies: Arc::new(PostgresCompanyRepository::new(db.clone())),
        connections: Arc::new(PostgresSapConnectionRepository::new(db.clone())),
        users: Arc::new(PostgresUserRepository::new(db.clone())),
        products: Arc::new(PostgresProductRepository::new(db.clone())),
        carts: Arc::new(PostgresCartRepository::new(db.clone())),
        orders: Arc::new(PostgresOrderRepository::new(db.clone())),
        quotes: Arc::new(PostgresQuoteRepository::new(db)),
        sap: Arc::new(sap),
        cache,
        mailer,
        completion,
    };

    let state = AppState::new(ports, &config);
    let app = routes::router(state, config.rate_limit_sap_writes);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
