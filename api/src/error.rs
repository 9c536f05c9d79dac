//! Unified error types for the portal API
//!
//! This module defines error types for each layer:
//! - `DomainError`: Core business logic errors
//! - `SapError`: SAP OData / RFC bridge errors
//! - `CacheError`, `MailError`, `CompletionError`: ancillary HTTP services
//! - `AppError`: Application layer errors (wraps the above for HTTP responses)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::entities::SapMessage;

/// Domain layer errors - pure business logic errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Entity already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// SAP integration errors
///
/// Business rejections (BAPI RETURN rows, OData errors on create) are not
/// represented here; they come back as a failed `SapResult`.
#[derive(Debug, Error)]
pub enum SapError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("SAP rejected the credentials")]
    Unauthorized,

    #[error("SAP did not return a CSRF token")]
    CsrfTokenMissing,

    #[error("SAP rejected the CSRF token")]
    CsrfRejected,

    #[error("OData error {status}: {message}")]
    OData {
        status: u16,
        code: Option<String>,
        message: String,
        details: Vec<SapMessage>,
    },

    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("No SAP connection configured for company {0}")]
    NotConfigured(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Session cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Cache command failed: {0}")]
    Command(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Transactional mail errors
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Provider error: {status} - {message}")]
    Provider { status: u16, message: String },

    #[error("Mail provider not configured")]
    NotConfigured,
}

/// Generative completion API errors
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Completion returned no choices")]
    Empty,

    #[error("Completion API not configured")]
    NotConfigured,
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("SAP error: {0}")]
    Sap(#[from] SapError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    messages: Vec<SapMessage>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut messages = Vec::new();
        let (status, error, details) = match &self {
            AppError::Domain(DomainError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "Not found", Some(msg.clone()))
            }
            AppError::Domain(DomainError::AlreadyExists(msg)) => {
                (StatusCode::CONFLICT, "Already exists", Some(msg.clone()))
            }
            AppError::Domain(DomainError::Validation(msg)) => (
                StatusCode::BAD_REQUEST,
                "Validation error",
                Some(msg.clone()),
            ),
            AppError::Domain(DomainError::Database(msg)) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::Domain(DomainError::Internal(msg)) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::Sap(e) => {
                tracing::error!("SAP error: {}", e);
                match e {
                    SapError::NotConfigured(company) => (
                        StatusCode::CONFLICT,
                        "SAP connection not configured",
                        Some(company.clone()),
                    ),
                    SapError::InvalidRequest(msg) => {
                        (StatusCode::BAD_REQUEST, "Invalid request", Some(msg.clone()))
                    }
                    SapError::Unauthorized | SapError::CsrfRejected => {
                        (StatusCode::BAD_GATEWAY, "SAP authentication failed", None)
                    }
                    SapError::OData {
                        status,
                        message,
                        details,
                        ..
                    } => {
                        messages = details.clone();
                        let http_status = if *status == 404 {
                            StatusCode::NOT_FOUND
                        } else {
                            StatusCode::BAD_GATEWAY
                        };
                        (http_status, "SAP service error", Some(message.clone()))
                    }
                    SapError::Http { status: 404, .. } => {
                        (StatusCode::NOT_FOUND, "SAP resource not found", None)
                    }
                    _ => (StatusCode::BAD_GATEWAY, "SAP service error", None),
                }
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized", None),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", Some(msg.clone())),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
            messages,
        });

        (status, body).into_response()
    }
}
