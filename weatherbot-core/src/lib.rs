//! Core library for the weather Telegram bot.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The inbound update model and its classification into content kinds
//! - The weather lookup and reply delivery seams, with OpenWeather and Telegram clients
//! - Reply text rendering (wind direction, sunrise/sunset clock times)
//! - The webhook entry point tying it together
//!
//! It is used by `weatherbot-cli`, but can also be embedded in other webhook hosts.

pub mod config;
pub mod error;
pub mod format;
pub mod handler;
pub mod model;
pub mod provider;
pub mod responder;
pub mod router;
pub mod telegram;

pub use config::{ClockConfig, ClockZone, Config, Credentials};
pub use error::ApiError;
pub use handler::{FunctionEvent, FunctionResponse, WebhookHandler};
pub use model::{Content, InboundEvent, LookupOutcome, Message, Reply, WeatherObservation};
pub use provider::{WeatherLookup, lookup_from_config};
pub use responder::WeatherResponder;
pub use router::MessageRouter;
pub use telegram::{ReplySender, TelegramClient};
