use serde::Deserialize;
use thiserror::Error;

use super::types::ResourceKind;

/// Failure of a remote catalog request, already worded for display.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
  #[error("No {0} found with the current filters")]
  NotFound(ResourceKind),

  #[error("Too many requests. Please try again later")]
  RateLimited,

  #[error("Server error. Please try again later")]
  ServerError(u16),

  #[error("API Error: {message}")]
  Api { status: u16, message: String },

  #[error("Network error. Please check your internet connection")]
  Network,

  #[error("Error setting up the request")]
  RequestSetup(String),

  #[error("Invalid response: {0}")]
  InvalidResponse(String),

  #[error("Request was cancelled")]
  Cancelled,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: Option<String>,
}

impl FetchError {
  /// Map a non-success HTTP status (and its body) to an error.
  pub fn from_status(kind: ResourceKind, status: u16, body: &str) -> Self {
    match status {
      404 => FetchError::NotFound(kind),
      429 => FetchError::RateLimited,
      500..=599 => FetchError::ServerError(status),
      _ => {
        let message = serde_json::from_str::<ErrorBody>(body)
          .ok()
          .and_then(|b| b.error)
          .unwrap_or_else(|| "Unknown error".to_string());
        FetchError::Api { status, message }
      }
    }
  }

  /// Map a transport-level failure: nothing usable came back from the server.
  pub fn from_transport(err: reqwest::Error) -> Self {
    if err.is_builder() {
      FetchError::RequestSetup(err.to_string())
    } else if err.is_decode() {
      FetchError::InvalidResponse(err.to_string())
    } else {
      FetchError::Network
    }
  }
}
