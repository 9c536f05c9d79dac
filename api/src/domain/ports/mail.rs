//! Transactional mail port trait

use async_trait::async_trait;
use serde::Serialize;

use crate::error::MailError;

/// Plain-text transactional email
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Port trait for sending mail
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}
