use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to one of the HTTP collaborators (OpenWeather, Telegram Bot API).
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{service} request failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} request failed with status {status}: {body}")]
    Status {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to parse {service} response JSON: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{service} response is missing `{field}`")]
    Incomplete {
        service: &'static str,
        field: &'static str,
    },
}

impl ApiError {
    /// Wraps a transport error, dropping the URL so secrets embedded in it never reach logs.
    pub(crate) fn request(service: &'static str, source: reqwest::Error) -> Self {
        ApiError::Request {
            service,
            source: source.without_url(),
        }
    }

    pub(crate) fn status(service: &'static str, status: StatusCode, body: &str) -> Self {
        ApiError::Status {
            service,
            status,
            body: truncate_body(body),
        }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
