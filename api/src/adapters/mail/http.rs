//! Transactional mail over an HTTP email API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::domain::ports::{EmailMessage, Mailer};
use crate::error::MailError;

pub struct HttpMailer {
    http: Client,
    base_url: String,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    text: &'a str,
}

impl HttpMailer {
    pub fn new(
        base_url: String,
        api_key: String,
        from: String,
        timeout: Duration,
    ) -> Result<Self, MailError> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            from,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let request = SendEmailRequest {
            from: &self.from,
            to: vec![message.to.as_str()],
            subject: &message.subject,
            text: &message.text,
        };

        let response = self
            .http
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(to = %message.to, subject = %message.subject, "Email sent");
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(MailError::Provider {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Mailer used when no provider is configured; every send is refused
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, _message: &EmailMessage) -> Result<(), MailError> {
        Err(MailError::NotConfigured)
    }
}
