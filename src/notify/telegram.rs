use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::info;

use crate::error::DeliveryError;
use crate::models::Listing;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Delivery of one prepared message per new listing.
#[async_trait]
pub trait Notify: Send + Sync {
    async fn notify(&self, listing: &Listing, caption: &str) -> Result<(), DeliveryError>;
}

/// Sends messages through the Telegram bot API.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self> {
        Self::with_api_base(TELEGRAM_API_BASE, token, chat_id)
    }

    /// Point the notifier at a different API host. Used by tests.
    pub fn with_api_base(
        api_base: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.into(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }
}

#[async_trait]
impl Notify for TelegramNotifier {
    async fn notify(&self, _listing: &Listing, caption: &str) -> Result<(), DeliveryError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let payload = json!({
            "chat_id": self.chat_id,
            "text": caption,
            "parse_mode": "HTML",
            "disable_web_page_preview": false,
        });

        let response = self.client.post(&url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Api { status, body });
        }
        Ok(())
    }
}

/// Stand-in used when Telegram credentials are not configured: logs the
/// message instead of sending it, so local runs stay side-effect free.
pub struct DryRunNotifier;

#[async_trait]
impl Notify for DryRunNotifier {
    async fn notify(&self, listing: &Listing, caption: &str) -> Result<(), DeliveryError> {
        info!("Dry-run, not sending message for {}:\n{}", listing.id, caption);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn posts_to_send_message_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "chat_id": "-100200300",
                "parse_mode": "HTML",
            })))
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let notifier =
            TelegramNotifier::with_api_base(server.url(), "123:abc", "-100200300").unwrap();
        let listing = Listing::new("1234567", "https://www.wg-gesucht.de/1234567.html");
        notifier.notify(&listing, "<b>Test</b>").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn api_error_surfaces_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .with_status(400)
            .with_body(r#"{"ok":false,"description":"Bad Request"}"#)
            .create_async()
            .await;

        let notifier =
            TelegramNotifier::with_api_base(server.url(), "123:abc", "-100200300").unwrap();
        let listing = Listing::new("1234567", "https://www.wg-gesucht.de/1234567.html");
        let err = notifier.notify(&listing, "x").await.unwrap_err();

        match err {
            DeliveryError::Api { status, body } => {
                assert_eq!(status.as_u16(), 400);
                assert!(body.contains("Bad Request"));
            }
            other => panic!("expected Api error, got {other}"),
        }
    }
}
