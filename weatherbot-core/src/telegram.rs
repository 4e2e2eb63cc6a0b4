use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::fmt::{self, Debug};

use crate::{error::ApiError, model::Reply};

const SERVICE: &str = "Telegram";

/// Delivers a reply into the chat it answers.
#[async_trait]
pub trait ReplySender: Send + Sync + Debug {
    async fn send(&self, reply: &Reply) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    reply_to_message_id: i64,
}

impl<'a> From<&'a Reply> for SendMessage<'a> {
    fn from(reply: &'a Reply) -> Self {
        Self {
            chat_id: reply.chat_id,
            text: &reply.text,
            reply_to_message_id: reply.reply_to_message_id,
        }
    }
}

/// Bot API client, limited to `sendMessage`.
#[derive(Clone)]
pub struct TelegramClient {
    token: String,
    api_url: String,
    http: Client,
}

impl TelegramClient {
    pub fn new(token: String, api_url: String) -> Self {
        Self {
            token,
            api_url,
            http: Client::new(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.api_url.trim_end_matches('/'),
            self.token
        )
    }
}

impl Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ReplySender for TelegramClient {
    async fn send(&self, reply: &Reply) -> Result<()> {
        let res = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&SendMessage::from(reply))
            .send()
            .await
            .map_err(|e| ApiError::request(SERVICE, e))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::status(SERVICE, status, &body).into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_message_payload_threads_the_reply() {
        let reply = Reply {
            chat_id: 42,
            reply_to_message_id: 7,
            text: "Привет".into(),
        };

        let json = serde_json::to_value(SendMessage::from(&reply)).expect("serializable");
        assert_eq!(
            json,
            serde_json::json!({"chat_id": 42, "text": "Привет", "reply_to_message_id": 7})
        );
    }

    #[test]
    fn method_url_tolerates_trailing_slash() {
        let client = TelegramClient::new("123:ABC".into(), "https://api.telegram.org/".into());

        assert_eq!(
            client.method_url("sendMessage"),
            "https://api.telegram.org/bot123:ABC/sendMessage"
        );
    }

    #[test]
    fn debug_does_not_print_token() {
        let client = TelegramClient::new("123:SECRET".into(), "https://api.telegram.org".into());

        assert!(!format!("{client:?}").contains("SECRET"));
    }
}
