//! Error types for the HTTP collaborators and the notices shown to the user.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to send request to {endpoint}: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to parse {endpoint} JSON: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{endpoint} response contained neither data nor an error marker")]
    Malformed { endpoint: &'static str },

    #[error("{endpoint} is not configured")]
    Unconfigured { endpoint: &'static str },
}

impl ClientError {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. }
            | Self::Malformed { endpoint }
            | Self::Unconfigured { endpoint } => endpoint,
        }
    }
}

/// A message surfaced to the user when a weather fetch does not render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    /// Transport failure, non-success status or undecodable body.
    WeatherUnavailable,
    /// The backend answered but could not resolve the location.
    LocationNotFound,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::WeatherUnavailable => "Unable to fetch weather.",
            Notice::LocationNotFound => "Location not found",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
