use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecError>;

#[derive(Debug, Error)]
pub enum RecError {
	/// Invalid invocation, reported before any browser work starts.
	#[error("invalid configuration: {0}")]
	Config(String),

	#[error("browser launch failed: {0}")]
	BrowserLaunch(String),

	#[error("could not reach browser: {0}")]
	Connect(String),

	#[error(transparent)]
	Record(#[from] pwrec::Error),

	#[error(transparent)]
	Runtime(#[from] pwrec_runtime::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

impl RecError {
	/// Short machine-readable tag printed next to the message.
	pub fn code(&self) -> &'static str {
		match self {
			RecError::Config(_) => "CONFIG",
			RecError::BrowserLaunch(_) => "LAUNCH",
			RecError::Connect(_) => "CONNECT",
			RecError::Record(e) if e.is_target_closed() => "TARGET_CLOSED",
			RecError::Record(_) | RecError::Runtime(_) => "PROTOCOL",
			RecError::Io(_) => "IO",
			RecError::Anyhow(_) => "INTERNAL",
		}
	}

	pub fn config(message: impl Into<String>) -> Self {
		RecError::Config(message.into())
	}
}
