use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::{DeliveryOutcome, NotificationChannel, RecipientId};
use crate::config::TelegramConfig;
use crate::error::{DeliveryError, ErrorClass};
use crate::format::NotificationPayload;

/// Telegram Bot API channel. Payloads with a media url go out as
/// sendPhoto with the text as caption; a rejected photo reference falls
/// back to a plain sendMessage so the notification is never dropped.
pub struct TelegramChannel {
    client: Client,
    api_base: String,
    token: String,
    send_media: bool,
}

impl TelegramChannel {
    pub fn new(config: &TelegramConfig, token: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token,
            send_media: config.send_media,
        }
    }

    async fn send_to(
        &self,
        payload: &NotificationPayload,
        chat_id: &str,
    ) -> Result<(), DeliveryError> {
        if self.send_media {
            if let Some(photo) = &payload.media_url {
                let body = json!({
                    "chat_id": chat_id,
                    "photo": photo,
                    "caption": payload.text,
                    "parse_mode": "HTML",
                });
                match self.post_with_retry("sendPhoto", &body).await {
                    Ok(()) => return Ok(()),
                    Err(e) if e.class() == ErrorClass::Permanent => {
                        // Telegram rejected the photo reference; the text
                        // still has the detail link, so send it on its own.
                        tracing::warn!(chat_id, error = %e, "sendPhoto rejected, falling back to text");
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        let body = json!({
            "chat_id": chat_id,
            "text": payload.text,
            "parse_mode": "HTML",
        });
        self.post_with_retry("sendMessage", &body).await
    }

    /// One immediate retry for transient failures; permanent failures
    /// surface as-is. No backoff: this is a single-shot batch run.
    async fn post_with_retry(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<(), DeliveryError> {
        match self.post(method, body).await {
            Err(e) if e.class() == ErrorClass::Transient => {
                tracing::warn!(method, error = %e, "transient delivery failure, retrying once");
                self.post(method, body).await
            }
            other => other,
        }
    }

    async fn post(&self, method: &str, body: &serde_json::Value) -> Result<(), DeliveryError> {
        let url = format!("{}/bot{}/{}", self.api_base, self.token, method);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(DeliveryError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DeliveryError::Status { status, body });
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    async fn send(
        &self,
        payload: &NotificationPayload,
        recipients: &[RecipientId],
    ) -> Vec<DeliveryOutcome> {
        let mut outcomes = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            let result = self.send_to(payload, recipient).await;
            if let Err(e) = &result {
                tracing::warn!(chat_id = recipient.as_str(), error = %e, "delivery failed");
            }
            outcomes.push(DeliveryOutcome {
                recipient: recipient.clone(),
                result,
            });
        }
        outcomes
    }
}
