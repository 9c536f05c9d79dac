//! CSRF handshake and session reuse
//!
//! Modifying OData requests need a CSRF token that is bound to the session
//! cookies handed out with it. A token/cookie pair is fetched with a GET on
//! the service root and kept in the session cache per company and service.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{header, Client, Response};
use serde::{Deserialize, Serialize};

use crate::adapters::sap::response::{classify, summarize_body};
use crate::domain::entities::SapConnection;
use crate::domain::ports::SessionCache;
use crate::error::SapError;

pub const CSRF_HEADER: &str = "x-csrf-token";

/// A CSRF token together with the cookies it is bound to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrfSession {
    pub token: String,
    pub cookie: Option<String>,
}

/// `Authorization` header value for HTTP Basic auth
pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

/// Collapse `Set-Cookie` values into a `Cookie` request header.
///
/// Only the `name=value` part before the first `;` is kept.
pub fn cookie_header<'a>(set_cookies: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let pairs: Vec<&str> = set_cookies
        .into_iter()
        .filter_map(|c| c.split(';').next())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();
    (!pairs.is_empty()).then(|| pairs.join("; "))
}

/// `sap-client` query parameter, if the connection pins a client
pub fn client_query(connection: &SapConnection) -> Vec<(&'static str, String)> {
    connection
        .client
        .iter()
        .map(|c| ("sap-client", c.clone()))
        .collect()
}

/// True when SAP refused a modifying request because the token expired
pub fn is_csrf_rejection(response: &Response) -> bool {
    response.status().as_u16() == 403
        && response
            .headers()
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("required"))
            .unwrap_or(false)
}

/// Perform the handshake against a service root
pub async fn fetch_csrf(
    http: &Client,
    connection: &SapConnection,
    service_url: &str,
) -> Result<CsrfSession, SapError> {
    let response = http
        .get(service_url)
        .header(header::AUTHORIZATION, basic_auth(&connection.username, &connection.password))
        .header(header::ACCEPT, "application/json")
        .header(CSRF_HEADER, "Fetch")
        .query(&client_query(connection))
        .send()
        .await?;

    let status = response.status().as_u16();
    if status == 401 {
        return Err(SapError::Unauthorized);
    }

    let token = response
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("required"))
        .map(str::to_string);

    let cookie = cookie_header(
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok()),
    );

    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(match classify(status, &body) {
            Err(e) => e,
            Ok(_) => SapError::Http {
                status,
                message: summarize_body(&body),
            },
        });
    }

    let token = token.ok_or(SapError::CsrfTokenMissing)?;
    tracing::debug!(
        company_id = %connection.company_id,
        url = service_url,
        "Fetched CSRF token"
    );
    Ok(CsrfSession { token, cookie })
}

/// CSRF sessions kept in the session cache.
///
/// Cache failures are logged and treated as a miss; a broken cache costs an
/// extra handshake, never a failed request.
#[derive(Clone)]
pub struct SessionStore {
    cache: Arc<dyn SessionCache>,
    ttl_secs: u64,
}

impl SessionStore {
    pub fn new(cache: Arc<dyn SessionCache>, ttl_secs: u64) -> Self {
        Self { cache, ttl_secs }
    }

    pub fn key(connection: &SapConnection, service: &str) -> String {
        format!("sap:csrf:{}:{}", connection.company_id, service)
    }

    pub async fn get(&self, connection: &SapConnection, service: &str) -> Option<CsrfSession> {
        let key = Self::key(connection, service);
        match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Discarding unreadable CSRF session");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Session cache read failed");
                None
            }
        }
    }

    pub async fn put(&self, connection: &SapConnection, service: &str, session: &CsrfSession) {
        let key = Self::key(connection, service);
        let raw = match serde_json::to_string(session) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to encode CSRF session");
                return;
            }
        };
        if let Err(e) = self.cache.set_ex(&key, &raw, self.ttl_secs).await {
            tracing::warn!(key = %key, error = %e, "Session cache write failed");
        }
    }

    pub async fn invalidate(&self, connection: &SapConnection, service: &str) {
        let key = Self::key(connection, service);
        if let Err(e) = self.cache.delete(&key).await {
            tracing::warn!(key = %key, error = %e, "Session cache delete failed");
        }
    }
}
