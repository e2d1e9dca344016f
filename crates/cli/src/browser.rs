//! Finding, launching and attaching to a Chromium browser.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use pwrec_runtime::{BrowserSession, CdpSession};
use serde::Deserialize;
use tokio::process::{Child, Command};
use tracing::debug;

use crate::config::{BrowserSource, LaunchOptions};
use crate::error::{RecError, Result};

/// Polls of the debugging endpoint after launch, 200ms apart.
const LAUNCH_ATTEMPTS: u32 = 50;

/// Response from the `/json/version` endpoint
#[derive(Debug, Deserialize)]
struct VersionInfo {
	#[serde(rename = "webSocketDebuggerUrl")]
	web_socket_debugger_url: String,
	#[serde(rename = "Browser")]
	browser: Option<String>,
}

/// Find Chrome/Chromium executable on the system
fn find_chrome_executable() -> Option<PathBuf> {
	let candidates: &[&str] = if cfg!(target_os = "macos") {
		&[
			"/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
			"/Applications/Chromium.app/Contents/MacOS/Chromium",
			"/Applications/Google Chrome Canary.app/Contents/MacOS/Google Chrome Canary",
			"/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
		]
	} else if cfg!(target_os = "windows") {
		&[
			r"C:\Program Files\Google\Chrome\Application\chrome.exe",
			r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
			r"C:\Program Files\Chromium\Application\chrome.exe",
		]
	} else {
		&[
			"google-chrome-stable",
			"google-chrome",
			"chromium-browser",
			"chromium",
			"brave-browser",
			"/usr/bin/google-chrome-stable",
			"/usr/bin/google-chrome",
			"/usr/bin/chromium-browser",
			"/usr/bin/chromium",
			"/snap/bin/chromium",
		]
	};

	candidates.iter().find_map(|candidate| {
		if candidate.starts_with('/') || candidate.contains('\\') {
			let path = Path::new(candidate);
			path.exists().then(|| path.to_path_buf())
		} else {
			which::which(candidate).ok()
		}
	})
}

/// Fetch the browser WebSocket URL from a remote debugging port
async fn fetch_ws_endpoint(port: u16) -> Result<VersionInfo> {
	let client = reqwest::Client::builder()
		.timeout(Duration::from_millis(400))
		.build()
		.map_err(|e| RecError::Connect(format!("Failed to create HTTP client: {e}")))?;
	let mut last_error = "no response".to_string();

	// Try loopback hostnames in order; environments vary on IPv4/IPv6 binding.
	for url in [
		format!("http://127.0.0.1:{port}/json/version"),
		format!("http://localhost:{port}/json/version"),
		format!("http://[::1]:{port}/json/version"),
	] {
		let response = match client.get(&url).send().await {
			Ok(r) => r,
			Err(e) => {
				last_error = e.to_string();
				continue;
			}
		};

		if !response.status().is_success() {
			last_error = format!("unexpected status {}", response.status());
			continue;
		}

		return response
			.json()
			.await
			.map_err(|e| RecError::Connect(format!("Failed to parse /json/version: {e}")));
	}

	Err(RecError::Connect(format!("port {port}: {last_error}")))
}

fn launch_args(options: &LaunchOptions) -> Vec<String> {
	let mut args = vec![
		format!("--remote-debugging-port={}", options.port),
		format!("--user-data-dir={}", options.user_data_dir.display()),
		"--no-first-run".to_string(),
		"--no-default-browser-check".to_string(),
	];
	if options.headless {
		args.push("--headless=new".to_string());
	}
	args.push("about:blank".to_string());
	args
}

/// Launch Chrome with remote debugging enabled and wait for its endpoint.
async fn launch_chrome(options: &LaunchOptions) -> Result<(Child, VersionInfo)> {
	if fetch_ws_endpoint(options.port).await.is_ok() {
		return Err(RecError::BrowserLaunch(format!(
			"a browser is already listening on port {}. Pass --ws-endpoint to record it, or pick another --port",
			options.port
		)));
	}

	let executable = match &options.executable {
		Some(path) => path.clone(),
		None => find_chrome_executable().ok_or_else(|| {
			RecError::BrowserLaunch("Could not find Chrome/Chromium. Pass --chrome <PATH>".into())
		})?,
	};

	std::fs::create_dir_all(&options.user_data_dir)?;

	debug!(executable = %executable.display(), port = options.port, "Launching browser");
	let mut child = Command::new(&executable)
		.args(launch_args(options))
		.stdin(Stdio::null())
		.stdout(Stdio::null())
		.stderr(Stdio::null())
		.kill_on_drop(true)
		.spawn()
		.map_err(|e| RecError::BrowserLaunch(format!("Failed to start {}: {e}", executable.display())))?;

	let mut last_error = "endpoint not reachable".to_string();
	for _ in 0..LAUNCH_ATTEMPTS {
		tokio::time::sleep(Duration::from_millis(200)).await;

		if let Some(status) = child.try_wait()? {
			return Err(RecError::BrowserLaunch(format!(
				"browser exited before its debugging endpoint came up ({status}). \
				 If another instance uses the same profile, pass --user-data-dir"
			)));
		}

		match fetch_ws_endpoint(options.port).await {
			Ok(info) => return Ok((child, info)),
			Err(e) => last_error = e.to_string(),
		}
	}

	Err(RecError::BrowserLaunch(format!(
		"debugging endpoint on port {} never came up: {last_error}",
		options.port
	)))
}

/// A connected browser, plus its process when this run launched it.
pub struct BrowserHandle {
	session: BrowserSession,
	child: Option<Child>,
}

impl BrowserHandle {
	pub async fn open(source: &BrowserSource) -> Result<Self> {
		match source {
			BrowserSource::Endpoint(url) => {
				let session = BrowserSession::connect(url.as_str())
					.await
					.map_err(|e| RecError::Connect(e.to_string()))?;
				Ok(Self { session, child: None })
			}
			BrowserSource::Launch(options) => {
				let (child, info) = launch_chrome(options).await?;
				tracing::info!(
					browser = info.browser.as_deref().unwrap_or("unknown"),
					endpoint = %info.web_socket_debugger_url,
					"Browser launched"
				);
				let session = BrowserSession::connect(&info.web_socket_debugger_url)
					.await
					.map_err(|e| RecError::Connect(e.to_string()))?;
				Ok(Self {
					session,
					child: Some(child),
				})
			}
		}
	}

	pub fn owns_browser(&self) -> bool {
		self.child.is_some()
	}

	/// Attaches to the first open page, opening one if there is none.
	pub async fn page(&self) -> Result<CdpSession> {
		let target_id = match self.session.page_targets().await?.into_iter().next() {
			Some(target) => {
				debug!(target = %target.target_id, url = %target.url, "Using existing page");
				target.target_id
			}
			None => self.session.create_page().await?,
		};
		Ok(self.session.attach(&target_id).await?)
	}

	/// Closes the browser if this run launched it; attached browsers stay up.
	pub async fn shutdown(self) -> Result<()> {
		let Some(mut child) = self.child else {
			return Ok(());
		};

		if let Err(e) = self.session.close().await {
			debug!(error = %e, "Browser.close failed, killing process");
		}

		match tokio::time::timeout(Duration::from_secs(5), child.wait()).await {
			Ok(status) => {
				let status = status?;
				debug!(%status, "Browser exited");
			}
			Err(_) => {
				tracing::warn!("Browser did not exit in time, killing it");
				child.kill().await?;
			}
		}
		Ok(())
	}
}
