//! Error types shared by the export core.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    /// The API answered with `ok: false`.
    #[error("{method} failed: {error}")]
    Api { method: String, error: String },

    /// The request never produced a readable response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// HTTP 429. Surfaced as is, the caller decides what to do.
    #[error("{method} was rate limited (retry after {retry_after:?})")]
    RateLimited {
        method: String,
        retry_after: Option<Duration>,
    },

    /// No channel carries the requested name.
    #[error("channel not found: {name}")]
    NotFound { name: String },

    /// The response did not have the shape the endpoint promises.
    #[error("malformed response from {method}: {reason}")]
    MalformedResponse { method: String, reason: String },

    #[error("invalid API token: {0}")]
    InvalidToken(String),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize export data: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ExportError {
    pub fn malformed(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            method: method.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for every failure that originated at the API client.
    pub fn is_api_failure(&self) -> bool {
        matches!(
            self,
            Self::Api { .. } | Self::Transport(_) | Self::RateLimited { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
