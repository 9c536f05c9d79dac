//! Key-value cache over an HTTP command API
//!
//! Each call POSTs a Redis-style command array (`["GET", key]`) and reads
//! `{"result": ...}` or `{"error": "..."}` back.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::ports::SessionCache;
use crate::error::CacheError;

pub struct RestSessionCache {
    http: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct CommandResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl RestSessionCache {
    /// Reads sit on the path of every SAP write, so the client always has a
    /// timeout
    pub fn new(
        base_url: String,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CacheError> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn command(&self, command: Value) -> Result<Value, CacheError> {
        let mut request = self.http.post(&self.base_url).json(&command);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let parsed: CommandResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(CacheError::Command(format!("HTTP {}: {}", status.as_u16(), text)))
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(error) = parsed.error {
            return Err(CacheError::Command(error));
        }
        if !status.is_success() {
            return Err(CacheError::Command(format!("HTTP {}", status.as_u16())));
        }
        Ok(parsed.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl SessionCache for RestSessionCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self.command(json!(["GET", key])).await? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Ok(Some(other.to_string())),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        self.command(json!(["SET", key, value, "EX", ttl_secs]))
            .await
            .map(|_| ())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.command(json!(["DEL", key])).await.map(|_| ())
    }
}

/// Cache that stores nothing
pub struct NoopSessionCache;

#[async_trait]
impl SessionCache for NoopSessionCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl_secs: u64) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}
