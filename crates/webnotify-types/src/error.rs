//! Error types shared by every webnotify crate

use axum::{http::StatusCode, response::IntoResponse};
use std::fmt;

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	ValidationError(String),
	/// Persisted state cannot be read back or first written. Startup stops
	/// on it: continuing would serve with different keys or lost records.
	CorruptState(String),
	/// Key generation, encoding or signing failure
	Crypto(String),
	/// Every delivery of a dispatch failed; carries the first failure
	DeliveryFailed {
		attempted: usize,
		cause: PushError,
	},
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Internal(format!("serialization error: {}", err))
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::CorruptState(msg) => write!(f, "corrupt persisted state: {}", msg),
			Error::Crypto(msg) => write!(f, "crypto error: {}", msg),
			Error::DeliveryFailed { cause, .. } => write!(f, "{}", cause),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "I/O error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			Error::DeliveryFailed { cause, .. } => Some(cause),
			_ => None,
		}
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		let status = match self {
			Error::NotFound => StatusCode::NOT_FOUND,
			Error::ValidationError(_) => StatusCode::BAD_REQUEST,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		};
		(status, self.to_string()).into_response()
	}
}

/// Why a single push delivery failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushError {
	/// The stored subscription token could not be decoded
	InvalidSubscription(String),
	/// Payload encryption failed (bad client keys)
	Encryption(String),
	/// VAPID JWT could not be produced
	Signing(String),
	/// Connection or protocol failure talking to the push service
	Transport(String),
	/// The push service no longer knows the subscription (404/410)
	Gone(u16),
	/// Any other non-success status
	Rejected { status: u16, body: String },
	Timeout,
}

impl fmt::Display for PushError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PushError::InvalidSubscription(msg) => write!(f, "invalid subscription: {}", msg),
			PushError::Encryption(msg) => write!(f, "encryption error: {}", msg),
			PushError::Signing(msg) => write!(f, "VAPID signing error: {}", msg),
			PushError::Transport(msg) => write!(f, "network error: {}", msg),
			PushError::Gone(status) => write!(f, "subscription gone (HTTP {})", status),
			PushError::Rejected { status, body } => write!(f, "HTTP {}: {}", status, body),
			PushError::Timeout => write!(f, "push delivery timed out"),
		}
	}
}

impl std::error::Error for PushError {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_delivery_failed_displays_cause() {
		let err = Error::DeliveryFailed { attempted: 2, cause: PushError::Gone(410) };
		assert_eq!(err.to_string(), "subscription gone (HTTP 410)");
	}

	#[test]
	fn test_into_response_status() {
		assert_eq!(Error::NotFound.into_response().status(), StatusCode::NOT_FOUND);
		assert_eq!(
			Error::ValidationError("subscriber is required".into()).into_response().status(),
			StatusCode::BAD_REQUEST
		);
		assert_eq!(
			Error::DeliveryFailed { attempted: 1, cause: PushError::Timeout }
				.into_response()
				.status(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
	}
}

// vim: ts=4
