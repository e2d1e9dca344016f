use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Filter used when `RUST_LOG` is unset.
///
/// Logs go to stderr so they never mix with the script on stdout.
fn default_filter(verbosity: u8) -> &'static str {
	// 0 = errors, plus recorder warnings about dropped interactions
	// 1 (-v) = recorder progress, quiet protocol plumbing
	// 2+ (-vv) = everything, including each CDP command
	match verbosity {
		0 => "error,pwrec=warn",
		1 => "info,pwrec_runtime=warn",
		_ => "debug",
	}
}

pub fn init_logging(verbosity: u8) {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(true)
		.with_level(true)
		.compact()
		.init();
}

#[cfg(test)]
mod tests {
	use std::io;
	use std::sync::{Arc, Mutex};

	use super::*;

	#[derive(Clone, Default)]
	struct Captured(Arc<Mutex<Vec<u8>>>);

	impl io::Write for Captured {
		fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
			self.0.lock().unwrap().extend_from_slice(buf);
			Ok(buf.len())
		}

		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}

	/// Output of `emit` under the default filter for `verbosity`.
	fn logged(verbosity: u8, emit: impl FnOnce()) -> String {
		let captured = Captured::default();
		let writer = captured.clone();
		let subscriber = tracing_subscriber::fmt()
			.with_env_filter(EnvFilter::new(default_filter(verbosity)))
			.with_writer(move || writer.clone())
			.with_ansi(false)
			.finish();
		tracing::subscriber::with_default(subscriber, emit);
		let bytes = captured.0.lock().unwrap().clone();
		String::from_utf8(bytes).unwrap()
	}

	#[test]
	fn verbosity_levels() {
		assert_eq!(default_filter(0), "error,pwrec=warn");
		assert!(default_filter(1).starts_with("info"));
		assert_eq!(default_filter(2), "debug");
		assert_eq!(default_filter(7), "debug");
	}

	#[test]
	fn recorder_warnings_shown_by_default() {
		let out = logged(0, || {
			tracing::warn!(target: "pwrec::recorder", "No selector for event target, dropping interaction");
			tracing::info!(target: "pwrec::recorder", "Recording started");
			tracing::warn!(target: "reqwest::connect", "retrying");
		});

		assert!(out.contains("No selector for event target"), "stderr was: {out:?}");
		assert!(!out.contains("Recording started"));
		assert!(!out.contains("retrying"));
	}

	#[test]
	fn verbose_shows_progress_but_not_protocol_debug() {
		let out = logged(1, || {
			tracing::info!(target: "pwrec::recorder", "Recording started");
			tracing::debug!(target: "pwrec_runtime::connection", "Sending command");
		});

		assert!(out.contains("Recording started"));
		assert!(!out.contains("Sending command"));
	}
}
