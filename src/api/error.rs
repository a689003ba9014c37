//! Error taxonomy for PokeAPI requests.
//!
//! Gateway errors propagate to the caller as a single failure; the specific
//! kind is logged while the user only sees a generic message. Local storage
//! failures never reach this enum (the store folds them away).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  /// Remote entity absent (HTTP 404).
  #[error("entity not found")]
  NotFound,
  /// Request exceeded the configured bound; the request was aborted.
  #[error("request timed out")]
  Timeout,
  /// Transport-level failure: DNS, refused connection, offline.
  #[error("connection failed")]
  Connectivity,
  /// Any other non-success HTTP status.
  #[error("http error: status {0}")]
  Http(u16),
  /// Payload did not match the expected schema.
  #[error("failed to decode response: {0}")]
  Decode(String),
}

impl ApiError {
  /// Generic message shown to the end user. The kind itself is only logged.
  pub fn user_message(&self) -> &'static str {
    match self {
      ApiError::Timeout => "The request took too long. Try again.",
      ApiError::Connectivity => "Connection failed. Check your internet.",
      _ => "No result found.",
    }
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_timeout() {
      ApiError::Timeout
    } else if err.is_connect() {
      ApiError::Connectivity
    } else if err.is_decode() {
      ApiError::Decode(err.to_string())
    } else if let Some(status) = err.status() {
      ApiError::Http(status.as_u16())
    } else {
      ApiError::Connectivity
    }
  }
}
