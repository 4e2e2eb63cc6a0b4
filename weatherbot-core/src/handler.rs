//! Webhook entry point: one raw update body in, at most one reply out.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    Config,
    model::InboundEvent,
    provider::openweather::OpenWeatherClient,
    responder::WeatherResponder,
    router::MessageRouter,
    telegram::{ReplySender, TelegramClient},
};

/// Cloud-function style invocation: the update JSON arrives as a string in `body`.
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionEvent {
    pub body: String,
}

/// What the invoker gets back. Always 200 with an empty body; failures are `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl FunctionResponse {
    pub fn ok() -> Self {
        Self {
            status_code: 200,
            body: String::new(),
        }
    }
}

#[derive(Debug)]
struct Pipeline {
    router: MessageRouter,
    sender: Box<dyn ReplySender>,
}

#[derive(Debug)]
pub struct WebhookHandler {
    pipeline: Option<Pipeline>,
}

impl WebhookHandler {
    pub fn new(router: MessageRouter, sender: Box<dyn ReplySender>) -> Self {
        Self {
            pipeline: Some(Pipeline { router, sender }),
        }
    }

    /// A handler that acknowledges every update and does nothing else.
    pub fn disabled() -> Self {
        Self { pipeline: None }
    }

    /// Wire the real OpenWeather and Telegram clients. Without both credentials the
    /// handler is [disabled](Self::disabled).
    pub fn from_config(config: &Config) -> Self {
        let Some(creds) = config.credentials() else {
            warn!("Telegram token or OpenWeather key missing; updates will be ignored");
            return Self::disabled();
        };

        let lookup = OpenWeatherClient::new(
            creds.openweather_api_key,
            config.openweather.api_url.clone(),
        );
        let sender = TelegramClient::new(creds.telegram_bot_token, config.telegram.api_url.clone());
        let responder = WeatherResponder::new(Box::new(lookup), config.clock.clone());

        Self::new(MessageRouter::new(responder), Box::new(sender))
    }

    pub fn is_enabled(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Process one raw update body.
    ///
    /// Malformed JSON and updates without a message are acknowledged without a reply.
    /// A failed weather lookup or delivery is returned as `Err` and nothing is sent.
    pub async fn handle(&self, raw_body: &str) -> Result<FunctionResponse> {
        let Some(pipeline) = &self.pipeline else {
            return Ok(FunctionResponse::ok());
        };

        let event: InboundEvent = match serde_json::from_str(raw_body) {
            Ok(event) => event,
            Err(err) => {
                warn!("Ignoring malformed update: {err}");
                return Ok(FunctionResponse::ok());
            }
        };

        let Some(reply) = pipeline.router.route(&event).await? else {
            return Ok(FunctionResponse::ok());
        };

        pipeline
            .sender
            .send(&reply)
            .await
            .with_context(|| format!("Failed to deliver reply to chat {}", reply.chat_id))?;

        info!(
            chat_id = reply.chat_id,
            reply_to = reply.reply_to_message_id,
            "reply sent"
        );

        Ok(FunctionResponse::ok())
    }

    /// Process a cloud-function event wrapping the update body.
    pub async fn handle_function_event(&self, event: &FunctionEvent) -> Result<FunctionResponse> {
        self.handle(&event.body).await
    }

    /// Parses a cloud-function event from its JSON form.
    pub fn parse_function_event(json: &str) -> Result<FunctionEvent> {
        serde_json::from_str(json).context("Failed to parse function event JSON")
    }
}
