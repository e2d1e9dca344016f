//! Browser- and page-level handles over a shared [`Connection`].
//!
//! A [`BrowserSession`] owns the browser-level view of the socket: target
//! discovery, attachment, and shutdown. Attaching to a page yields a
//! [`CdpSession`] whose commands and events are scoped to that page by the
//! flatten-mode `sessionId`.


use std::sync::Arc;

use pwrec_protocol::{AttachToTargetResult, CreateTargetResult, GetTargetsResult, TargetInfo};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::mpsc;

use crate::connection::{Connection, Event};
use crate::error::{Error, Result};
use crate::transport::WebSocketTransport;

/// Commands and events scoped to one attached target.
#[derive(Clone)]
pub struct CdpSession {
	connection: Arc<Connection>,
	session_id: Arc<str>,
}

impl std::fmt::Debug for CdpSession {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CdpSession")
			.field("session_id", &self.session_id)
			.finish_non_exhaustive()
	}
}

impl CdpSession {
	pub fn new(connection: Arc<Connection>, session_id: impl Into<Arc<str>>) -> Self {
		Self {
			connection,
			session_id: session_id.into(),
		}
	}

	pub fn session_id(&self) -> &str {
		&self.session_id
	}

	/// Sends a command to this session's target.
	pub async fn send(&self, method: &str, params: Value) -> Result<Value> {
		self.connection
			.send_message(Some(&self.session_id), method, params)
			.await
	}

	/// Sends a command and decodes the result.
	pub async fn send_typed<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
		let value = self.send(method, params).await?;
		Ok(serde_json::from_value(value)?)
	}

	/// Event stream for this session.
	///
	/// Ends when the target detaches or the connection closes.
	pub fn events(&self) -> mpsc::UnboundedReceiver<Event> {
		self.connection.subscribe(Some(&self.session_id))
	}
}

/// Browser-level handle: target discovery, attachment, shutdown.
#[derive(Clone)]
pub struct BrowserSession {
	connection: Arc<Connection>,
}

impl BrowserSession {
	/// Connects to a browser's DevTools WebSocket and starts dispatching.
	pub async fn connect(ws_url: &str) -> Result<Self> {
		let (transport, message_rx) = WebSocketTransport::connect(ws_url).await?;
		let connection = Arc::new(Connection::new(transport.into_transport_parts(message_rx)));

		let runner = Arc::clone(&connection);
		tokio::spawn(async move {
			if let Err(e) = runner.run().await {
				tracing::error!(error = %e, "Connection loop failed");
			}
		});

		tracing::info!(url = ws_url, "Connected to browser");
		Ok(Self::from_connection(connection))
	}

	/// Wraps a connection whose dispatch loop is already running.
	pub fn from_connection(connection: Arc<Connection>) -> Self {
		Self { connection }
	}

	pub fn connection(&self) -> &Arc<Connection> {
		&self.connection
	}

	/// Sends a browser-level command.
	pub async fn send(&self, method: &str, params: Value) -> Result<Value> {
		self.connection.send_message(None, method, params).await
	}

	/// Lists open page targets.
	pub async fn page_targets(&self) -> Result<Vec<TargetInfo>> {
		let value = self.send("Target.getTargets", json!({})).await?;
		let targets: GetTargetsResult = serde_json::from_value(value)?;
		Ok(targets.target_infos.into_iter().filter(TargetInfo::is_page).collect())
	}

	/// Opens a new blank page and returns its target id.
	pub async fn create_page(&self) -> Result<String> {
		let value = self
			.send("Target.createTarget", json!({ "url": "about:blank" }))
			.await?;
		let created: CreateTargetResult = serde_json::from_value(value)?;
		tracing::debug!(target = %created.target_id, "Created page target");
		Ok(created.target_id)
	}

	/// Attaches to a target in flatten mode.
	pub async fn attach(&self, target_id: &str) -> Result<CdpSession> {
		let value = self
			.send(
				"Target.attachToTarget",
				json!({ "targetId": target_id, "flatten": true }),
			)
			.await?;
		let attached: AttachToTargetResult = serde_json::from_value(value)?;
		tracing::debug!(target = target_id, session = %attached.session_id, "Attached to target");
		Ok(CdpSession::new(Arc::clone(&self.connection), attached.session_id))
	}

	/// Asks the browser to exit.
	///
	/// The browser usually drops the socket before replying, so a closed
	/// channel counts as success.
	pub async fn close(&self) -> Result<()> {
		match self.send("Browser.close", json!({})).await {
			Ok(_) | Err(Error::ChannelClosed) => Ok(()),
			Err(e) => Err(e),
		}
	}
}
