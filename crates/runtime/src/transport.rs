//! WebSocket transport for the DevTools protocol.
//!
//! The transport only moves JSON values; correlation lives in
//! [`Connection`](crate::Connection). It splits into a sender half used by the
//! connection's writer task and a receiver half whose [`run`] loop forwards
//! every decoded frame into an unbounded channel.
//!
//! [`run`]: TransportReceiver::run

#[cfg(test)]
mod tests;

use std::future::Future;
use std::pin::Pin;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::{Error, Result};

/// Boxed future used by the object-safe transport traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outbound half of a transport.
pub trait Transport: Send {
	/// Serializes and sends one message.
	fn send(&mut self, message: Value) -> BoxFuture<'_, Result<()>>;

	/// Sends a close frame.
	fn close(&mut self) -> BoxFuture<'_, Result<()>>;
}

/// Inbound half of a transport.
pub trait TransportReceiver: Send {
	/// Reads frames until the peer closes or the message channel is dropped.
	fn run(self: Box<Self>) -> BoxFuture<'static, Result<()>>;
}

/// Both halves plus the channel the receiver feeds.
pub struct TransportParts {
	pub sender: Box<dyn Transport>,
	pub receiver: Box<dyn TransportReceiver>,
	pub message_rx: mpsc::UnboundedReceiver<Value>,
}

/// JSON-over-WebSocket transport.
///
/// Generic over the underlying stream so tests can run it over an in-memory
/// duplex pipe.
pub struct WebSocketTransport<S> {
	ws: WebSocketStream<S>,
	message_tx: mpsc::UnboundedSender<Value>,
}

impl WebSocketTransport<MaybeTlsStream<TcpStream>> {
	/// Opens a WebSocket to a DevTools endpoint (`ws://host:port/devtools/browser/<id>`).
	pub async fn connect(url: &str) -> Result<(Self, mpsc::UnboundedReceiver<Value>)> {
		tracing::debug!(url, "Opening DevTools WebSocket");
		let (ws, _response) =
			tokio_tungstenite::connect_async(url)
				.await
				.map_err(|e| Error::ConnectionFailed {
					url: url.to_string(),
					reason: e.to_string(),
				})?;
		Ok(Self::new(ws))
	}
}

impl<S> WebSocketTransport<S>
where
	S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
	/// Wraps an established WebSocket stream.
	pub fn new(ws: WebSocketStream<S>) -> (Self, mpsc::UnboundedReceiver<Value>) {
		let (message_tx, message_rx) = mpsc::unbounded_channel();
		(Self { ws, message_tx }, message_rx)
	}

	/// Splits into concrete sender and receiver halves.
	pub fn into_parts(self) -> (WebSocketTransportSender<S>, WebSocketTransportReceiver<S>) {
		let (sink, stream) = self.ws.split();
		(
			WebSocketTransportSender { sink },
			WebSocketTransportReceiver {
				stream,
				message_tx: self.message_tx,
			},
		)
	}

	/// Splits into boxed halves ready for [`Connection::new`](crate::Connection::new).
	pub fn into_transport_parts(self, message_rx: mpsc::UnboundedReceiver<Value>) -> TransportParts {
		let (sender, receiver) = self.into_parts();
		TransportParts {
			sender: Box::new(sender),
			receiver: Box::new(receiver),
			message_rx,
		}
	}
}

/// Outbound half of [`WebSocketTransport`].
pub struct WebSocketTransportSender<S> {
	sink: SplitSink<WebSocketStream<S>, WsMessage>,
}

impl<S> WebSocketTransportSender<S>
where
	S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
	pub async fn send(&mut self, message: Value) -> Result<()> {
		let text = serde_json::to_string(&message)?;
		self.sink
			.send(WsMessage::Text(text))
			.await
			.map_err(|e| Error::TransportError(format!("Failed to write frame: {e}")))
	}

	pub async fn close(&mut self) -> Result<()> {
		self.sink
			.close()
			.await
			.map_err(|e| Error::TransportError(format!("Failed to close socket: {e}")))
	}
}

impl<S> Transport for WebSocketTransportSender<S>
where
	S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
	fn send(&mut self, message: Value) -> BoxFuture<'_, Result<()>> {
		Box::pin(WebSocketTransportSender::send(self, message))
	}

	fn close(&mut self) -> BoxFuture<'_, Result<()>> {
		Box::pin(WebSocketTransportSender::close(self))
	}
}

/// Inbound half of [`WebSocketTransport`].
pub struct WebSocketTransportReceiver<S> {
	stream: SplitStream<WebSocketStream<S>>,
	message_tx: mpsc::UnboundedSender<Value>,
}

impl<S> WebSocketTransportReceiver<S>
where
	S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
	/// Forwards decoded frames until a close frame, EOF, or the consumer hangs up.
	///
	/// Frames that are not valid JSON are logged and dropped.
	pub async fn run(mut self) -> Result<()> {
		while let Some(frame) = self.stream.next().await {
			let frame = frame.map_err(|e| Error::TransportError(format!("Failed to read frame: {e}")))?;

			let payload = match frame {
				WsMessage::Text(text) => text.into_bytes(),
				WsMessage::Binary(bytes) => bytes,
				WsMessage::Close(reason) => {
					tracing::debug!(?reason, "WebSocket closed by remote");
					break;
				}
				_ => continue,
			};

			let message: Value = match serde_json::from_slice(&payload) {
				Ok(message) => message,
				Err(e) => {
					tracing::warn!(error = %e, "Dropping frame that is not JSON");
					continue;
				}
			};

			if self.message_tx.send(message).is_err() {
				tracing::debug!("Message channel closed, stopping transport reader");
				break;
			}
		}

		Ok(())
	}
}

impl<S> TransportReceiver for WebSocketTransportReceiver<S>
where
	S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
	fn run(self: Box<Self>) -> BoxFuture<'static, Result<()>> {
		Box::pin(WebSocketTransportReceiver::run(*self))
	}
}
