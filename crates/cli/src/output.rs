//! Script sinks and error reporting.

use std::path::Path;

use colored::Colorize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::{RecError, Result};

pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Copies every script line to stdout and, optionally, a file.
pub struct ScriptSink {
	writers: Vec<BoxedWriter>,
}

impl ScriptSink {
	/// Stdout plus `file` when given. The file is truncated.
	pub async fn open(file: Option<&Path>) -> Result<Self> {
		let mut writers: Vec<BoxedWriter> = vec![Box::new(tokio::io::stdout())];
		if let Some(path) = file {
			let file = tokio::fs::File::create(path)
				.await
				.map_err(|e| RecError::config(format!("cannot write {}: {e}", path.display())))?;
			tracing::debug!(path = %path.display(), "Writing script to file");
			writers.push(Box::new(file));
		}
		Ok(Self { writers })
	}

	pub fn from_writers(writers: Vec<BoxedWriter>) -> Self {
		Self { writers }
	}

	/// Writes one line to every sink and flushes, so the script is visible as
	/// it is recorded.
	pub async fn write_line(&mut self, line: &str) -> Result<()> {
		for writer in &mut self.writers {
			writer.write_all(line.as_bytes()).await?;
			writer.flush().await?;
		}
		Ok(())
	}

	pub async fn finish(mut self) -> Result<()> {
		for writer in &mut self.writers {
			writer.flush().await?;
			writer.shutdown().await?;
		}
		Ok(())
	}
}

/// Prints an error and its causes to stderr.
pub fn print_error(err: &RecError) {
	eprintln!("{} [{}]: {}", "error".red().bold(), err.code(), err);

	let mut source = std::error::Error::source(err);
	while let Some(cause) = source {
		eprintln!("  {} {}", "caused by:".yellow(), cause);
		source = cause.source();
	}
}
