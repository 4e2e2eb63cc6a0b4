use anyhow::Result;
use tracing::debug;

use crate::{
    format::capitalize_first,
    model::{Content, InboundEvent, Reply},
    responder::WeatherResponder,
};

pub const HELP_TEXT: &str = "Я сообщу вам о погоде в том месте, которое сообщите мне.
Я могу ответить на:
- Текстовое сообщение с названием населенного пункта.
- Голосовое сообщение с названием населенного пункта.
- Сообщение с точкой на карте.";

pub const VOICE_UNSUPPORTED_TEXT: &str =
    "Распознавание голосовых сообщений пока не поддерживается.";

pub const LOCATION_UNSUPPORTED_TEXT: &str =
    "Распознавание координат сообщений пока не поддерживается.";

const HELP_COMMANDS: [&str; 2] = ["/start", "/help"];

/// Decides the single reply for an inbound event.
#[derive(Debug)]
pub struct MessageRouter {
    responder: WeatherResponder,
}

impl MessageRouter {
    pub fn new(responder: WeatherResponder) -> Self {
        Self { responder }
    }

    /// `Ok(None)` when there is nothing to answer: no message, or a message
    /// carrying none of the supported content kinds.
    pub async fn route(&self, event: &InboundEvent) -> Result<Option<Reply>> {
        let Some(message) = event.message.as_ref() else {
            debug!(update_id = ?event.update_id, "update carries no message");
            return Ok(None);
        };

        let text = match &message.content {
            Content::Text(text) => self.reply_to_text(text).await?,
            Content::Voice => VOICE_UNSUPPORTED_TEXT.to_string(),
            Content::Location => LOCATION_UNSUPPORTED_TEXT.to_string(),
            Content::None => {
                debug!(message_id = message.message_id, "message has no supported content");
                return Ok(None);
            }
        };

        Ok(Some(Reply::to(message, text)))
    }

    async fn reply_to_text(&self, text: &str) -> Result<String> {
        let text = text.trim();

        if HELP_COMMANDS.contains(&text) {
            return Ok(HELP_TEXT.to_string());
        }

        let query = capitalize_first(text);
        debug!(query = %query, "looking up weather");
        self.responder.resolve(&query, text).await
    }
}
