use std::{io, path::PathBuf};

use reqwest::StatusCode;

/// Everything that can abort a single weather lookup.
///
/// Cache connectivity problems never reach the caller; the cache is skipped
/// instead (see [`crate::cache::connect_cache`]).
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Coordinates for location \"{location}\" not found: {reason}")]
    LocationNotFound { location: String, reason: String },

    #[error("Weather provider request failed with status {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("Failed to reach {service}: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Incorrect response from weather provider: {0}")]
    MalformedResponse(String),

    #[error("Cached entry '{key}' is not a valid weather record: {reason}")]
    InvalidCacheData { key: String, reason: String },

    #[error("Failed to write weather data to {target}: {source}")]
    OutputWrite {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to load configuration from {}: {reason}", path.display())]
    ConfigLoad { path: PathBuf, reason: String },
}

impl WeatherError {
    pub(crate) fn location_not_found(location: &str, reason: impl Into<String>) -> Self {
        Self::LocationNotFound {
            location: location.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;

/// Shortens an upstream body before it ends up in an error message.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
