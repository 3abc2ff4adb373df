use crate::outcome::Outcome;
use serde_json::json;
use std::time::Duration;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

const TELEGRAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Minimal Telegram Bot API client: replies only.
#[derive(Clone)]
pub struct TelegramClient {
    token: String,
    base_url: String,
    client: reqwest::Client,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>) -> reqwest::Result<Self> {
        Self::with_endpoint(token, TELEGRAM_API_BASE)
    }

    pub fn with_endpoint(
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(TELEGRAM_TIMEOUT).build()?;
        Ok(Self {
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Send a Markdown message to a chat.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Outcome<()> {
        let body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });

        match self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await
        {
            Ok(r) if r.status().is_success() => Outcome::Ready(()),
            Ok(r) => {
                let status = r.status().as_u16();
                log::warn!("Telegram sendMessage returned HTTP {}", status);
                Outcome::degraded(format!("HTTP {}", status))
            }
            // reqwest errors carry the URL, which embeds the bot token
            Err(e) => {
                let e = e.without_url();
                log::warn!("Telegram sendMessage failed: {}", e);
                Outcome::degraded(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url() {
        let client = TelegramClient::with_endpoint("123:abc", "https://example.test/").unwrap();
        assert_eq!(
            client.method_url("sendMessage"),
            "https://example.test/bot123:abc/sendMessage"
        );
    }

    #[tokio::test]
    async fn test_unreachable_api_degrades() {
        let client = TelegramClient::with_endpoint("123:abc", "http://127.0.0.1:9").unwrap();
        let outcome = client.send_message(42, "hello").await;
        match outcome {
            Outcome::Degraded { reason } => assert!(!reason.contains("123:abc")),
            Outcome::Ready(()) => panic!("expected degraded"),
        }
    }
}
