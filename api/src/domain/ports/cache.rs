//! Session cache port trait
//!
//! A small key-value store with expiry, used for CSRF sessions and partner
//! lookups.

use async_trait::async_trait;

use crate::error::CacheError;

/// Port trait for the key-value session cache
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Read a value, None when missing or expired
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value that expires after `ttl_secs`
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError>;

    /// Remove a value
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
