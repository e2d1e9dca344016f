//! DOM snapshots written next to the script.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use pwrec_protocol::{GetDocumentResult, GetOuterHtmlResult};
use serde_json::json;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};
use crate::session::{ProtocolSession, call};

/// Serializes the current document into `<unix-ts>[_<n>].html` files.
#[derive(Debug, Clone)]
pub struct DomSnapshotter {
	dir: PathBuf,
}

impl DomSnapshotter {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// Captures the page's HTML and returns the file name written.
	pub async fn capture(&self, session: &dyn ProtocolSession) -> Result<String> {
		let document: GetDocumentResult = call(session, "DOM.getDocument", json!({ "depth": 0 })).await?;
		let html: GetOuterHtmlResult = call(
			session,
			"DOM.getOuterHTML",
			json!({ "nodeId": document.root.node_id }),
		)
		.await?;

		let timestamp = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_secs())
			.unwrap_or_default();
		self.write(&html.outer_html, timestamp).await
	}

	/// Writes `html` under the first free name for `timestamp`.
	pub async fn write(&self, html: &str, timestamp: u64) -> Result<String> {
		let mut attempt = 0u32;
		loop {
			let name = if attempt == 0 {
				format!("{timestamp}.html")
			} else {
				format!("{timestamp}_{attempt}.html")
			};
			let path = self.dir.join(&name);

			match OpenOptions::new().write(true).create_new(true).open(&path).await {
				Ok(mut file) => {
					let written = async {
						file.write_all(html.as_bytes()).await?;
						file.flush().await
					}
					.await;
					written.map_err(|source| Error::Snapshot {
						path: path.clone(),
						source,
					})?;
					tracing::debug!(path = %path.display(), bytes = html.len(), "Saved DOM snapshot");
					return Ok(name);
				}
				Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
				Err(source) => return Err(Error::Snapshot { path, source }),
			}
		}
	}
}
