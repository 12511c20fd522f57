//! Telegram notification backend, enabled via TG_TOKEN and CHAT_ID

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::Notifier;

pub struct TelegramNotifier {
    client: Option<Client>,
    token: Option<String>,
    chat_id: Option<String>,
}

impl TelegramNotifier {
    pub fn from_env() -> Self {
        let token = std::env::var("TG_TOKEN").ok();
        let chat_id = std::env::var("CHAT_ID").ok();

        let client = if token.is_some() && chat_id.is_some() {
            Some(Client::new())
        } else {
            None
        };

        Self {
            client,
            token,
            chat_id,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, title: &str, message: &str) {
        let (Some(client), Some(token), Some(chat_id)) =
            (&self.client, &self.token, &self.chat_id)
        else {
            return;
        };

        let url = format!("https://api.telegram.org/bot{}/sendMessage", token);
        let payload = serde_json::json!({
            "chat_id": chat_id,
            "text": format!("<b>{}</b>\n{}", title, message),
            "parse_mode": "HTML",
            "disable_web_page_preview": true
        });

        match client.post(&url).json(&payload).send().await {
            Ok(response) => {
                if response.status().is_success() {
                    debug!("Telegram notification sent");
                } else {
                    warn!("Telegram API error: status {}", response.status());
                }
            }
            Err(e) => warn!("Failed to send Telegram notification: {}", e),
        }
    }
}
