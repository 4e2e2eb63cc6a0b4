use serde::{Deserialize, de::IgnoredAny};

/// One webhook delivery from Telegram (an `Update`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundEvent {
    #[serde(default)]
    pub update_id: Option<i64>,
    #[serde(default)]
    pub message: Option<Message>,
}

/// A chat turn, reduced to what the bot needs to answer it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawMessage")]
pub struct Message {
    pub message_id: i64,
    pub chat_id: i64,
    pub content: Content,
}

/// What a message carries. Telegram sends these as alternative optional fields;
/// when several are present, text wins over voice, and voice over location.
/// Voice and location payloads are never inspected.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    Voice,
    Location,
    None,
}

#[derive(Debug, Deserialize)]
struct RawChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    message_id: i64,
    chat: RawChat,
    text: Option<String>,
    voice: Option<IgnoredAny>,
    location: Option<IgnoredAny>,
}

impl From<RawMessage> for Message {
    fn from(raw: RawMessage) -> Self {
        let content = match (raw.text, raw.voice, raw.location) {
            (Some(text), _, _) => Content::Text(text),
            (None, Some(_), _) => Content::Voice,
            (None, None, Some(_)) => Content::Location,
            (None, None, None) => Content::None,
        };

        Message {
            message_id: raw.message_id,
            chat_id: raw.chat.id,
            content,
        }
    }
}

/// A threaded text reply addressed back to the originating message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub chat_id: i64,
    pub reply_to_message_id: i64,
    pub text: String,
}

impl Reply {
    pub fn to(message: &Message, text: impl Into<String>) -> Self {
        Self {
            chat_id: message.chat_id,
            reply_to_message_id: message.message_id,
            text: text.into(),
        }
    }
}

/// Current conditions for a place, in metric units.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    pub description: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    /// As reported by the provider (hPa for OpenWeather).
    pub pressure: i64,
    pub humidity_pct: i64,
    pub visibility_m: Option<i64>,
    pub wind_speed_mps: f64,
    pub wind_deg: f64,
    pub sunrise: i64,
    pub sunset: i64,
    /// Shift of the place's local time from UTC, in seconds.
    pub utc_offset_secs: i32,
}

/// Result of a lookup that reached the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(WeatherObservation),
    NotFound,
}
