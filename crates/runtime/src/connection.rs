//! JSON-RPC connection layer for the DevTools protocol.
//!
//! Sits on top of a [`Transport`](crate::transport::Transport) and handles:
//! - Generating unique request IDs
//! - Correlating responses with pending requests
//! - Routing events to per-session subscribers (flatten mode)
//! - Failing in-flight requests when the socket goes away
//!
//! # Message Flow
//!
//! 1. Caller invokes [`Connection::send_message`] with an optional session id
//! 2. Connection assigns an ID and parks a oneshot sender under it
//! 3. The writer task pushes the request onto the transport
//! 4. The dispatch loop in [`Connection::run`] receives the response
//! 5. The response is matched by ID and delivered through the oneshot
//!
//! Events carry a `sessionId` when they belong to an attached page; events
//! without one are browser-level and go to the browser subscriber.


use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex as TokioMutex;
use tokio::sync::{mpsc, oneshot};

use crate::error::{Error, Result};
use crate::transport::{Transport, TransportParts, TransportReceiver};

/// Default upper bound on a single request round-trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Subscriber key for browser-level events.
const BROWSER_KEY: &str = "";

/// Command sent to the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
	/// Unique request ID for correlating responses
	pub id: u64,
	/// Domain-qualified method, e.g. `Debugger.resume`
	pub method: String,
	/// Method parameters as JSON object
	pub params: Value,
	/// Target session for flatten-mode page commands
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
}

/// Reply to a [`Request`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
	/// Request ID this response correlates to
	pub id: u64,
	/// Success result (mutually exclusive with error)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	/// Error result (mutually exclusive with result)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<ErrorPayload>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
}

/// Protocol error details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
	pub code: i64,
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Value>,
}

/// Notification pushed by the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
	/// Event method name, e.g. `Debugger.paused`
	pub method: String,
	#[serde(default)]
	pub params: Value,
	/// Session that emitted the event; `None` for browser-level events
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
}

/// Discriminated union of protocol messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
	/// Response message (has `id` field)
	Response(Response),
	/// Event message (has `method`, no `id`)
	Event(Event),
	/// Unknown message type (forward-compatible catch-all)
	Unknown(Value),
}

/// Reply slots of in-flight requests, keyed by request id.
type ReplySlots = Arc<TokioMutex<HashMap<u64, oneshot::Sender<Result<Value>>>>>;

/// Reply to one request.
///
/// Dropping it before the reply arrives (timeout, caller gone) frees the
/// request's slot so late replies are reported as uncorrelated.
struct PendingReply {
	id: u64,
	slots: ReplySlots,
	rx: oneshot::Receiver<Result<Value>>,
	settled: bool,
}

impl Future for PendingReply {
	type Output = Result<Value>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		let reply = std::task::ready!(Pin::new(&mut self.rx).poll(cx));
		self.settled = true;
		Poll::Ready(reply.unwrap_or(Err(Error::ChannelClosed)))
	}
}

impl Drop for PendingReply {
	fn drop(&mut self) {
		if self.settled {
			return;
		}
		let Ok(runtime) = tokio::runtime::Handle::try_current() else {
			return;
		};
		let (id, slots) = (self.id, Arc::clone(&self.slots));
		runtime.spawn(async move {
			if slots.lock().await.remove(&id).is_some() {
				tracing::debug!(id, "Dropped reply slot of abandoned request");
			}
		});
	}
}

/// Transport halves and queues consumed by the first [`Connection::run`].
struct RunParts {
	sender: Box<dyn Transport>,
	receiver: Box<dyn TransportReceiver>,
	inbound: mpsc::UnboundedReceiver<Value>,
	outbound: mpsc::UnboundedReceiver<Value>,
}

/// Connection to a browser's DevTools endpoint.
///
/// Requests carry sequential ids and are answered through per-request
/// oneshot slots. Event subscribers are keyed by session id in a [`DashMap`]
/// so routing never holds a lock across an await.
pub struct Connection {
	next_id: AtomicU64,
	slots: ReplySlots,
	/// Queue drained by the writer task
	outbound_tx: mpsc::UnboundedSender<Value>,
	run_parts: TokioMutex<Option<RunParts>>,
	/// Event subscribers by session id (`""` for the browser itself)
	subscribers: DashMap<Arc<str>, mpsc::UnboundedSender<Event>>,
	request_timeout: Duration,
}

impl Connection {
	pub fn new(parts: TransportParts) -> Self {
		let (outbound_tx, outbound) = mpsc::unbounded_channel();

		Self {
			next_id: AtomicU64::new(1),
			slots: Arc::new(TokioMutex::new(HashMap::new())),
			outbound_tx,
			run_parts: TokioMutex::new(Some(RunParts {
				sender: parts.sender,
				receiver: parts.receiver,
				inbound: parts.message_rx,
				outbound,
			})),
			subscribers: DashMap::new(),
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
		}
	}

	/// Overrides the per-request timeout.
	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	/// Subscribes to events of one session, or browser-level events for `None`.
	///
	/// A later subscription for the same session replaces the earlier one.
	/// The receiver ends when the session detaches or the connection closes.
	pub fn subscribe(&self, session_id: Option<&str>) -> mpsc::UnboundedReceiver<Event> {
		let (tx, rx) = mpsc::unbounded_channel();
		let key: Arc<str> = Arc::from(session_id.unwrap_or(BROWSER_KEY));
		self.subscribers.insert(key, tx);
		rx
	}

	/// Sends a command and awaits its result.
	///
	/// # Errors
	///
	/// [`Error::Remote`] when the browser rejects the command,
	/// [`Error::Timeout`] when no reply arrives in time, and
	/// [`Error::ChannelClosed`] when the connection drops first.
	pub async fn send_message(&self, session_id: Option<&str>, method: &str, params: Value) -> Result<Value> {
		let id = self.next_id.fetch_add(1, Ordering::SeqCst);
		let frame = serde_json::to_value(Request {
			id,
			method: method.to_string(),
			params,
			session_id: session_id.map(str::to_string),
		})?;

		let (tx, rx) = oneshot::channel();
		self.slots.lock().await.insert(id, tx);
		let reply = PendingReply {
			id,
			slots: Arc::clone(&self.slots),
			rx,
			settled: false,
		};

		tracing::debug!(id, method, session = session_id.unwrap_or("browser"), "Sending command");
		self.outbound_tx.send(frame).map_err(|_| Error::ChannelClosed)?;

		match tokio::time::timeout(self.request_timeout, reply).await {
			Ok(result) => result,
			Err(_) => Err(Error::Timeout(format!(
				"{method} got no reply within {}ms",
				self.request_timeout.as_millis()
			))),
		}
	}

	/// Runs the message dispatch loop until the transport closes.
	///
	/// On exit every in-flight request fails with [`Error::ChannelClosed`] and
	/// every subscriber stream ends.
	pub async fn run(self: &Arc<Self>) -> Result<()> {
		let RunParts {
			sender,
			receiver,
			mut inbound,
			outbound,
		} = self
			.run_parts
			.lock()
			.await
			.take()
			.ok_or_else(|| Error::ProtocolError("Connection::run called more than once".to_string()))?;

		let reader = tokio::spawn(read_frames(receiver));
		let writer = tokio::spawn(write_frames(sender, outbound));

		while let Some(frame) = inbound.recv().await {
			match serde_json::from_value::<Message>(frame) {
				Ok(message) => {
					if let Err(e) = self.dispatch_internal(message).await {
						tracing::warn!(error = %e, "Dropping inbound message");
					}
				}
				Err(e) => tracing::error!(error = %e, "Inbound frame is not a protocol message"),
			}
		}

		self.shut_down().await;
		let _ = reader.await;
		writer.abort();
		Ok(())
	}

	/// Fails every in-flight request and ends every event stream.
	async fn shut_down(&self) {
		let pending: Vec<_> = self.slots.lock().await.drain().map(|(_, slot)| slot).collect();
		tracing::debug!(pending = pending.len(), "Transport closed");
		for slot in pending {
			let _ = slot.send(Err(Error::ChannelClosed));
		}
		self.subscribers.clear();
	}

	/// Dispatch an incoming message (test-only public version)
	#[cfg(test)]
	pub async fn dispatch(&self, message: Message) -> Result<()> {
		self.dispatch_internal(message).await
	}

	async fn dispatch_internal(&self, message: Message) -> Result<()> {
		match message {
			Message::Response(response) => {
				let callback = self
					.slots
					.lock()
					.await
					.remove(&response.id)
					.ok_or_else(|| {
						Error::ProtocolError(format!("Cannot find request to respond: id={}", response.id))
					})?;

				let result = match response.error {
					Some(error) => Err(parse_protocol_error(error)),
					None => Ok(response.result.unwrap_or(Value::Null)),
				};

				let _ = callback.send(result);
				Ok(())
			}
			Message::Event(event) => {
				if event.method == "Target.detachedFromTarget" {
					if let Some(detached) = event.params.get("sessionId").and_then(Value::as_str) {
						if self.subscribers.remove(detached).is_some() {
							tracing::debug!(session = detached, "Session detached, closing its event stream");
						}
					}
				}
				self.route_event(event);
				Ok(())
			}
			Message::Unknown(value) => {
				tracing::debug!(%value, "Unknown message type (ignored)");
				Ok(())
			}
		}
	}

	fn route_event(&self, event: Event) {
		let key: Arc<str> = Arc::from(event.session_id.as_deref().unwrap_or(BROWSER_KEY));
		let Some(subscriber) = self.subscribers.get(&key).map(|s| s.value().clone()) else {
			tracing::trace!(method = %event.method, session = %key, "Event without subscriber (ignored)");
			return;
		};

		if subscriber.send(event).is_err() {
			tracing::debug!(session = %key, "Subscriber dropped, removing");
			self.subscribers.remove(&key);
		}
	}
}

async fn read_frames(receiver: Box<dyn TransportReceiver>) {
	if let Err(e) = receiver.run().await {
		tracing::error!(error = %e, "Transport read failed");
	}
}

async fn write_frames(mut sender: Box<dyn Transport>, mut outbound: mpsc::UnboundedReceiver<Value>) {
	while let Some(frame) = outbound.recv().await {
		if let Err(e) = sender.send(frame).await {
			tracing::error!(error = %e, "Transport write failed");
			break;
		}
	}
	if let Err(e) = sender.close().await {
		tracing::debug!(error = %e, "Closing transport failed");
	}
}

/// Converts a browser error payload into [`Error::Remote`].
fn parse_protocol_error(error: ErrorPayload) -> Error {
	let data = error.data.map(|d| match d {
		Value::String(s) => s,
		other => other.to_string(),
	});
	Error::Remote {
		code: error.code,
		message: error.message,
		data,
	}
}
