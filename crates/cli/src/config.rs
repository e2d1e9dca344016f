//! Validated recording configuration.
//!
//! Everything here runs before a browser is touched, so a bad invocation
//! fails without side effects beyond creating the snapshot directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use pwrec::RecordOptions;
use url::Url;

use crate::cli::Cli;
use crate::error::{RecError, Result};

/// Where the browser comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserSource {
	/// Attach to an already running browser.
	Endpoint(Url),
	/// Launch and own a local browser.
	Launch(LaunchOptions),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
	pub port: u16,
	pub executable: Option<PathBuf>,
	pub user_data_dir: PathBuf,
	pub headless: bool,
}

#[derive(Debug, Clone)]
pub struct RecordConfig {
	pub url: Url,
	pub output: Option<PathBuf>,
	pub save_dom: bool,
	pub snapshot_dir: PathBuf,
	pub capture_scroll: bool,
	pub scroll_settle: Duration,
	pub runtime_module: String,
	pub browser: BrowserSource,
}

impl RecordConfig {
	pub fn from_cli(cli: &Cli) -> Result<Self> {
		let url = parse_page_url(&cli.url)?;

		if let Some(output) = &cli.output {
			check_output_path(output)?;
		}

		let snapshot_dir = cli.snapshot_dir.clone().unwrap_or_else(|| PathBuf::from("."));
		if cli.save_dom {
			prepare_snapshot_dir(&snapshot_dir)?;
		}

		if cli.runtime_module.trim().is_empty() {
			return Err(RecError::config("--runtime-module must not be empty"));
		}

		let browser = match &cli.ws_endpoint {
			Some(endpoint) => BrowserSource::Endpoint(parse_ws_endpoint(endpoint)?),
			None => {
				if let Some(executable) = &cli.chrome {
					if !executable.is_file() {
						return Err(RecError::config(format!(
							"browser executable {} does not exist",
							executable.display()
						)));
					}
				}
				BrowserSource::Launch(LaunchOptions {
					port: cli.port,
					executable: cli.chrome.clone(),
					user_data_dir: cli.user_data_dir.clone().unwrap_or_else(default_user_data_dir),
					headless: cli.headless,
				})
			}
		};

		Ok(Self {
			url,
			output: cli.output.clone(),
			save_dom: cli.save_dom,
			snapshot_dir,
			capture_scroll: cli.capture_scroll,
			scroll_settle: Duration::from_millis(cli.scroll_settle_ms),
			runtime_module: cli.runtime_module.clone(),
			browser,
		})
	}

	pub fn record_options(&self) -> RecordOptions {
		RecordOptions {
			url: self.url.to_string(),
			save_dom: self.save_dom,
			snapshot_dir: self.snapshot_dir.clone(),
			capture_scroll: self.capture_scroll,
			scroll_settle: self.scroll_settle,
			runtime_module: self.runtime_module.clone(),
		}
	}
}

fn parse_page_url(raw: &str) -> Result<Url> {
	let url = Url::parse(raw).map_err(|e| match e {
		url::ParseError::RelativeUrlWithoutBase => {
			RecError::config(format!("URL {raw:?} has no scheme, try https://{raw}"))
		}
		other => RecError::config(format!("invalid URL {raw:?}: {other}")),
	})?;

	match url.scheme() {
		"http" | "https" | "file" | "about" => Ok(url),
		scheme => Err(RecError::config(format!(
			"unsupported URL scheme {scheme:?} (expected http, https, file or about)"
		))),
	}
}

fn parse_ws_endpoint(raw: &str) -> Result<Url> {
	let url = Url::parse(raw).map_err(|e| RecError::config(format!("invalid --ws-endpoint {raw:?}: {e}")))?;
	match url.scheme() {
		"ws" | "wss" => Ok(url),
		scheme => Err(RecError::config(format!(
			"--ws-endpoint must be a ws:// or wss:// URL, got {scheme}://"
		))),
	}
}

/// The script file is created later; its directory must already exist.
fn check_output_path(path: &Path) -> Result<()> {
	if path.is_dir() {
		return Err(RecError::config(format!("output path {} is a directory", path.display())));
	}

	let parent = match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};
	if !parent.is_dir() {
		return Err(RecError::config(format!(
			"output directory {} does not exist",
			parent.display()
		)));
	}

	let readonly = parent.metadata().map(|m| m.permissions().readonly()).unwrap_or(false);
	if readonly {
		return Err(RecError::config(format!(
			"output directory {} is not writable",
			parent.display()
		)));
	}
	Ok(())
}

fn prepare_snapshot_dir(dir: &Path) -> Result<()> {
	if dir.exists() && !dir.is_dir() {
		return Err(RecError::config(format!(
			"snapshot path {} is not a directory",
			dir.display()
		)));
	}
	std::fs::create_dir_all(dir)
		.map_err(|e| RecError::config(format!("cannot create snapshot directory {}: {e}", dir.display())))
}

fn default_user_data_dir() -> PathBuf {
	dirs::cache_dir()
		.unwrap_or_else(std::env::temp_dir)
		.join("pwrec")
		.join("chrome-profile")
}

#[cfg(test)]
mod tests {
	use clap::Parser;
	use tempfile::TempDir;

	use super::*;

	fn config(args: &[&str]) -> Result<RecordConfig> {
		let mut argv = vec!["pwrec"];
		argv.extend_from_slice(args);
		RecordConfig::from_cli(&Cli::try_parse_from(argv).unwrap())
	}

	#[test]
	fn defaults_launch_a_browser() {
		let config = config(&["https://example.com/login"]).unwrap();

		assert_eq!(config.url.as_str(), "https://example.com/login");
		assert_eq!(config.scroll_settle, Duration::from_secs(1));
		match config.browser {
			BrowserSource::Launch(launch) => {
				assert_eq!(launch.port, 9222);
				assert!(launch.user_data_dir.ends_with("pwrec/chrome-profile"));
				assert!(!launch.headless);
			}
			other => panic!("expected launch, got {other:?}"),
		}
	}

	#[test]
	fn record_options_carry_flags() {
		let config = config(&[
			"https://example.com",
			"--capture-scroll",
			"--scroll-settle-ms",
			"300",
			"--runtime-module",
			"./rt.js",
		])
		.unwrap();
		let options = config.record_options();

		assert_eq!(options.url, "https://example.com/");
		assert!(options.capture_scroll);
		assert_eq!(options.scroll_settle, Duration::from_millis(300));
		assert_eq!(options.runtime_module, "./rt.js");
		assert!(!options.save_dom);
	}

	#[test]
	fn rejects_bad_urls() {
		assert!(matches!(config(&["example.com"]), Err(RecError::Config(msg)) if msg.contains("https://example.com")));
		assert!(matches!(config(&["ftp://example.com"]), Err(RecError::Config(_))));
		assert!(matches!(config(&["http://"]), Err(RecError::Config(_))));
	}

	#[test]
	fn ws_endpoint_selects_attach() {
		let config = config(&[
			"https://example.com",
			"--ws-endpoint",
			"ws://127.0.0.1:9222/devtools/browser/abc",
		])
		.unwrap();
		assert!(matches!(config.browser, BrowserSource::Endpoint(url) if url.port() == Some(9222)));
	}

	#[test]
	fn ws_endpoint_must_be_websocket() {
		let err = config(&["https://example.com", "--ws-endpoint", "http://127.0.0.1:9222"]).unwrap_err();
		assert!(err.to_string().contains("ws://"));
	}

	#[test]
	fn output_directory_must_exist() {
		let temp = TempDir::new().unwrap();
		let missing = temp.path().join("nope").join("script.js");
		let ok = temp.path().join("script.js");

		assert!(matches!(
			config(&["https://example.com", "-o", missing.to_str().unwrap()]),
			Err(RecError::Config(_))
		));
		assert!(config(&["https://example.com", "-o", ok.to_str().unwrap()]).is_ok());
		assert!(matches!(
			config(&["https://example.com", "-o", temp.path().to_str().unwrap()]),
			Err(RecError::Config(_))
		));
	}

	#[test]
	fn save_dom_creates_snapshot_dir() {
		let temp = TempDir::new().unwrap();
		let dir = temp.path().join("snaps").join("run1");

		let config = config(&["https://example.com", "--save-dom", "--snapshot-dir", dir.to_str().unwrap()]).unwrap();
		assert!(dir.is_dir());
		assert_eq!(config.record_options().snapshot_dir, dir);
	}

	#[test]
	fn snapshot_dir_cannot_be_a_file() {
		let temp = TempDir::new().unwrap();
		let file = temp.path().join("taken");
		std::fs::write(&file, "").unwrap();

		assert!(matches!(
			config(&["https://example.com", "--save-dom", "--snapshot-dir", file.to_str().unwrap()]),
			Err(RecError::Config(_))
		));
	}

	#[test]
	fn missing_browser_executable() {
		let temp = TempDir::new().unwrap();
		let chrome = temp.path().join("chrome");
		assert!(matches!(
			config(&["https://example.com", "--chrome", chrome.to_str().unwrap()]),
			Err(RecError::Config(_))
		));
	}
}
