//! Error types for the recorder.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for recorder operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while recording.
///
/// A target with no derivable selector is not an error: the resolver returns
/// `Ok(None)` and the interaction is dropped.
#[derive(Debug, Error)]
pub enum Error {
	/// The debugging channel rejected, dropped, or timed out a request.
	#[error(transparent)]
	Protocol(#[from] pwrec_runtime::Error),

	/// The browser answered with a shape the recorder cannot use.
	#[error("Unexpected response to {method}: {reason}")]
	UnexpectedResponse { method: String, reason: String },

	/// The script stream was already finished.
	#[error("Script stream already closed")]
	StreamClosed,

	/// Writing a DOM snapshot file failed.
	#[error("Failed to write DOM snapshot {}: {source}", path.display())]
	Snapshot {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

impl Error {
	pub(crate) fn unexpected(method: &str, reason: impl Into<String>) -> Self {
		Error::UnexpectedResponse {
			method: method.to_string(),
			reason: reason.into(),
		}
	}

	/// Returns true when the page or its debugging channel went away.
	pub fn is_target_closed(&self) -> bool {
		matches!(self, Error::Protocol(e) if e.is_target_closed())
	}
}
