//! pwrec - records live browser interaction as a replayable script
//!
//! The recorder attaches to a page over the Chrome DevTools Protocol, pauses
//! the page on every click, submit, change and (optionally) scroll through
//! event-listener breakpoints, derives a selector for the event's target, and
//! streams one script line per interaction.
//!
//! # Quick Start
//!
//! ```ignore
//! use pwrec::{RecordOptions, page};
//! use pwrec_runtime::BrowserSession;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let browser = BrowserSession::connect("ws://127.0.0.1:9222/devtools/browser/<id>").await?;
//!     let target = browser.create_page().await?;
//!     let session = browser.attach(&target).await?;
//!     let events = page::forward(session.events());
//!
//!     let mut recording = pwrec::start(
//!         session,
//!         events,
//!         RecordOptions::new("https://example.com"),
//!         async { let _ = tokio::signal::ctrl_c().await; },
//!     );
//!     while let Some(line) = recording.stream.next_line().await {
//!         print!("{line}");
//!     }
//!     recording.task.await??;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`selector`] - accessible-name and CSS selector derivation
//! - [`bridge`] - breakpoint setup and pause handling
//! - [`recorder`] - the recording state machine
//! - [`emitter`] - script statements and the output stream
//! - [`snapshot`] - DOM snapshots for `--save-dom`
//! - [`page`] - raw session events to [`PageEvent`]s

pub mod bridge;
pub mod emitter;
pub mod error;
pub mod event;
pub mod page;
pub mod recorder;
pub mod selector;
pub mod session;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod testing;

pub use bridge::{EventBridge, Pause};
pub use emitter::{ScriptEmitter, ScriptStream, Statement, js_string};
pub use error::{Error, Result};
pub use event::{CapturedEvent, EventKind, TargetRef};
pub use page::PageEvent;
pub use recorder::{
	DEFAULT_RUNTIME_MODULE, DEFAULT_SCROLL_SETTLE, RecordOptions, Recording, StopReason, start,
};
pub use selector::{Selector, SelectorResolver};
pub use session::ProtocolSession;
pub use snapshot::DomSnapshotter;
