//! DevTools runtime - transport, connection, and session handles
//!
//! This crate provides the low-level plumbing for talking to a Chromium
//! browser over the Chrome DevTools Protocol:
//!
//! - **Transport**: JSON frames over a WebSocket
//! - **Connection**: request/response correlation and per-session event routing
//! - **Sessions**: browser-level and page-level command handles
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │    pwrec     │  Recorder (bridge, selectors, emitter)
//! └──────┬───────┘
//!        │ CdpSession
//! ┌──────▼───────┐
//! │ pwrec-runtime│  This crate
//! │  ┌────────┐  │
//! │  │ Conn   │  │  id correlation, sessionId routing
//! │  └────────┘  │
//! │  ┌────────┐  │
//! │  │ Trans  │  │  WebSocket transport
//! │  └────────┘  │
//! └──────────────┘
//! ```

pub mod connection;
pub mod error;
pub mod session;
pub mod transport;

pub use connection::{Connection, DEFAULT_REQUEST_TIMEOUT, ErrorPayload, Event, Message, Request, Response};
pub use error::{Error, Result};
pub use session::{BrowserSession, CdpSession};
pub use transport::{
	BoxFuture, Transport, TransportParts, TransportReceiver, WebSocketTransport, WebSocketTransportReceiver,
	WebSocketTransportSender,
};
