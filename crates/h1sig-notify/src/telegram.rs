//! Telegram Bot API transport.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NotifyError, NotifyResult};
use crate::notifier::{BoxFuture, Notifier};

/// Public Bot API root.
pub const DEFAULT_TELEGRAM_URL: &str = "https://api.telegram.org";

/// Telegram destination. Both fields must be set for real delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,

    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    DEFAULT_TELEGRAM_URL.to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_url: default_api_url(),
        }
    }
}

impl TelegramConfig {
    /// Token and chat id, if both are present and non-empty.
    pub fn destination(&self) -> Option<(&str, &str)> {
        let token = self.bot_token.as_deref().filter(|s| !s.trim().is_empty())?;
        let chat = self.chat_id.as_deref().filter(|s| !s.trim().is_empty())?;
        Some((token, chat))
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends alerts through `sendMessage`.
pub struct TelegramNotifier {
    client: Client,
    url: String,
    chat_id: String,
    timeout: Duration,
}

impl TelegramNotifier {
    pub fn new(
        api_url: &str,
        bot_token: &str,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> NotifyResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!("{}/bot{}/sendMessage", api_url.trim_end_matches('/'), bot_token),
            chat_id: chat_id.into(),
            timeout,
        })
    }

    /// Build from config, `None` when no destination is configured.
    pub fn from_config(config: &TelegramConfig, timeout: Duration) -> NotifyResult<Option<Self>> {
        match config.destination() {
            Some((token, chat)) => Self::new(&config.api_url, token, chat, timeout).map(Some),
            None => Ok(None),
        }
    }

    async fn post(&self, text: &str) -> NotifyResult<()> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
        };

        // The token is part of the URL, so reqwest errors are reported without it.
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(format!("sendMessage failed: {}", e.without_url())))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| NotifyError::Transport(format!("Failed to read reply: {}", e.without_url())))?;

        if !status.is_success() {
            return Err(NotifyError::Transport(format!(
                "HTTP {status}: {}",
                String::from_utf8_lossy(&bytes)
            )));
        }

        let reply: ApiReply = serde_json::from_slice(&bytes)
            .map_err(|e| NotifyError::Transport(format!("Unexpected reply: {e}")))?;
        if !reply.ok {
            return Err(NotifyError::Transport(format!(
                "API rejected message: {}",
                reply.description.unwrap_or_default()
            )));
        }

        debug!(chat_id = %self.chat_id, "Telegram message delivered");
        Ok(())
    }
}

impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    fn send<'a>(&'a self, text: &'a str) -> BoxFuture<'a, NotifyResult<()>> {
        Box::pin(async move {
            match tokio::time::timeout(self.timeout, self.post(text)).await {
                Ok(result) => result,
                Err(_) => Err(NotifyError::Transport(format!(
                    "sendMessage exceeded {}ms",
                    self.timeout.as_millis()
                ))),
            }
        })
    }
}
