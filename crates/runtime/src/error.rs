//! Error types for the CDP runtime.

use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to the browser's debugging endpoint.
#[derive(Debug, Error)]
pub enum Error {
	/// Failed to open the WebSocket to the debugging endpoint.
	#[error("Failed to connect to {url}: {reason}")]
	ConnectionFailed { url: String, reason: String },

	/// Transport-level error (WebSocket framing or I/O).
	#[error("Transport error: {0}")]
	TransportError(String),

	/// Protocol-level error (unexpected message shape, uncorrelated response).
	#[error("Protocol error: {0}")]
	ProtocolError(String),

	/// Error returned by the browser for a command.
	#[error("{message} (code {code}){}", .data.as_ref().map(|d| format!(": {d}")).unwrap_or_default())]
	Remote {
		/// JSON-RPC error code (e.g. -32000 for server errors).
		code: i64,
		/// Human-readable error message
		message: String,
		/// Extra detail supplied by the browser
		data: Option<String>,
	},

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// Timeout waiting for a response.
	#[error("Timeout: {0}")]
	Timeout(String),

	/// Target (page or browser) went away.
	#[error("Target closed: {0}")]
	TargetClosed(String),

	/// Connection closed while a request was in flight.
	#[error("Channel closed unexpectedly")]
	ChannelClosed,
}

impl Error {
	/// Returns true if this is a timeout error.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::Timeout(_))
	}

	/// Returns true if the error means the page or connection is gone.
	pub fn is_target_closed(&self) -> bool {
		match self {
			Error::TargetClosed(_) | Error::ChannelClosed => true,
			Error::Remote { message, .. } => {
				message.contains("Target closed") || message.contains("Session with given id not found")
			}
			_ => false,
		}
	}
}
