//! The recording state machine.
//!
//! One task owns the whole recording: it drives the page, turns each paused
//! interaction into at most one script line, and finalizes the script when the
//! page closes or the caller interrupts. Handlers run to completion before the
//! next page event is read, so lines come out in the order the page produced
//! them.
//!
//! ```text
//! Idle ──pause──▶ Resolving ──selector──▶ Emitting ──▶ Idle
//!   │                                                  │
//!   └──────────── close / interrupt ──────────▶ Closed ◀┘
//! ```


use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

use pwrec_protocol::PausedEvent;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Sleep;

use crate::bridge::{EventBridge, Pause};
use crate::emitter::{ScriptEmitter, ScriptStream, Statement};
use crate::error::{Error, Result};
use crate::event::{EventKind, TargetRef};
use crate::page::PageEvent;
use crate::selector::{Selector, SelectorResolver};
use crate::session::{ProtocolSession, command};
use crate::snapshot::DomSnapshotter;

/// Module the generated script imports its helpers from.
pub const DEFAULT_RUNTIME_MODULE: &str = "@puppeteer/recorder";

/// How long scrolling must settle before the page height is compared.
pub const DEFAULT_SCROLL_SETTLE: Duration = Duration::from_secs(1);

/// Options for one recording.
#[derive(Debug, Clone)]
pub struct RecordOptions {
	/// Page to open; also the script's `open(...)` argument.
	pub url: String,
	/// Write a DOM snapshot before every click.
	pub save_dom: bool,
	pub snapshot_dir: PathBuf,
	/// Register scroll breakpoints and emit `scrollToBottom()`.
	pub capture_scroll: bool,
	pub scroll_settle: Duration,
	pub runtime_module: String,
}

impl RecordOptions {
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			save_dom: false,
			snapshot_dir: PathBuf::from("."),
			capture_scroll: false,
			scroll_settle: DEFAULT_SCROLL_SETTLE,
			runtime_module: DEFAULT_RUNTIME_MODULE.to_string(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecorderState {
	Idle,
	Resolving,
	Emitting,
	Closed,
}

/// Why a recording ended normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
	PageClosed,
	Interrupted,
}

/// A running recording.
///
/// `stream` yields script lines as they are produced and ends after the
/// closing line. `task` resolves once the script is finalized; on a protocol
/// failure it returns the error and the stream ends without a closing line.
pub struct Recording {
	pub stream: ScriptStream,
	pub task: JoinHandle<Result<StopReason>>,
}

/// Starts recording `session`.
///
/// `events` must carry the same page's events (see [`page::forward`]).
/// `shutdown` resolving finalizes the script the same way a page close does.
///
/// [`page::forward`]: crate::page::forward
pub fn start<S, F>(session: S, events: mpsc::UnboundedReceiver<PageEvent>, options: RecordOptions, shutdown: F) -> Recording
where
	S: ProtocolSession + 'static,
	F: Future<Output = ()> + Send + 'static,
{
	let (emitter, stream) = ScriptEmitter::new();
	let recorder = Recorder::new(session, options, emitter);
	let task = tokio::spawn(recorder.run(events, shutdown));
	Recording { stream, task }
}

/// Height measured at the first scroll, compared once scrolling settles.
struct ScrollCheck {
	baseline: f64,
	settle: Pin<Box<Sleep>>,
}

enum Wake {
	Interrupted,
	ScrollSettled,
	Page(Option<PageEvent>),
}

struct Recorder<S> {
	session: S,
	options: RecordOptions,
	emitter: ScriptEmitter,
	snapshotter: Option<DomSnapshotter>,
	state: RecorderState,
	scroll: Option<ScrollCheck>,
}

impl<S: ProtocolSession> Recorder<S> {
	fn new(session: S, options: RecordOptions, emitter: ScriptEmitter) -> Self {
		let snapshotter = options
			.save_dom
			.then(|| DomSnapshotter::new(options.snapshot_dir.clone()));
		Self {
			session,
			options,
			emitter,
			snapshotter,
			state: RecorderState::Idle,
			scroll: None,
		}
	}

	async fn run<F>(mut self, mut events: mpsc::UnboundedReceiver<PageEvent>, shutdown: F) -> Result<StopReason>
	where
		F: Future<Output = ()>,
	{
		let outcome = self.record(&mut events, shutdown).await;
		self.transition(RecorderState::Closed);

		match outcome {
			Ok(reason) => {
				self.emitter.emit(Statement::Close)?;
				self.emitter.finish()?;
				tracing::info!(?reason, "Recording finished");
				Ok(reason)
			}
			Err(e) => {
				self.emitter.abort();
				tracing::error!(error = %e, "Recording failed");
				Err(e)
			}
		}
	}

	async fn record<F>(&mut self, events: &mut mpsc::UnboundedReceiver<PageEvent>, shutdown: F) -> Result<StopReason>
	where
		F: Future<Output = ()>,
	{
		command(&self.session, "Page.enable", json!({})).await?;
		command(&self.session, "Inspector.enable", json!({})).await?;

		self.emitter.emit(Statement::Require {
			module: &self.options.runtime_module,
		})?;
		self.emitter.emit(Statement::Open { url: &self.options.url })?;

		tracing::info!(url = %self.options.url, "Recording started");
		command(&self.session, "Page.navigate", json!({ "url": self.options.url })).await?;

		tokio::pin!(shutdown);
		loop {
			let wake = tokio::select! {
				biased;
				_ = &mut shutdown => Wake::Interrupted,
				_ = settled(self.scroll.as_mut()) => Wake::ScrollSettled,
				event = events.recv() => Wake::Page(event),
			};

			match wake {
				Wake::Interrupted => return Ok(StopReason::Interrupted),
				Wake::Page(None | Some(PageEvent::Closed)) => return Ok(StopReason::PageClosed),
				Wake::ScrollSettled => self.finish_scroll_check().await?,
				Wake::Page(Some(PageEvent::DomContentLoaded)) => {
					EventBridge::new(&self.session)
						.install(self.options.capture_scroll)
						.await?
				}
				Wake::Page(Some(PageEvent::FrameNavigated { url })) => {
					tracing::debug!(%url, "Top-level navigation");
					self.emitter.emit(Statement::ExpectUrl { url: &url })?
				}
				Wake::Page(Some(PageEvent::Paused(paused))) => self.on_paused(&paused).await?,
			}
		}
	}

	/// Handles one debugger pause. The page is released exactly once, also
	/// when handling fails.
	async fn on_paused(&mut self, paused: &PausedEvent) -> Result<()> {
		let (pause, captured) = EventBridge::new(&self.session).capture(paused).await;
		let event = match captured {
			Ok(Some(event)) => event,
			Ok(None) => return EventBridge::new(&self.session).skip(pause).await,
			Err(e) => return Err(self.release_after(pause, e).await),
		};

		tracing::debug!(kind = %event.kind, target = event.target.object_id(), "Captured interaction");
		self.transition(RecorderState::Resolving);
		let handled = match event.kind {
			EventKind::Click => self.on_click(&event.target).await,
			EventKind::Submit => self.on_submit(&event.target).await,
			EventKind::Change => self.on_change(&event.target).await,
			EventKind::Scroll => self.on_scroll().await,
		};
		self.transition(RecorderState::Idle);

		match handled {
			Ok(()) => EventBridge::new(&self.session).resume(pause).await,
			Err(e) => Err(self.release_after(pause, e).await),
		}
	}

	/// Skips `pause` after a failed handler and hands back the original error.
	async fn release_after(&self, pause: Pause, error: Error) -> Error {
		if let Err(skip_error) = EventBridge::new(&self.session).skip(pause).await {
			tracing::warn!(error = %skip_error, "Could not release the page after a failure");
		}
		error
	}

	async fn on_click(&mut self, target: &TargetRef) -> Result<()> {
		if EventBridge::new(&self.session).is_submit_control(target).await? {
			tracing::debug!("Click on a submit control, the submit event records it");
			return Ok(());
		}

		let Some(selector) = self.resolve(target, EventKind::Click).await? else {
			return Ok(());
		};
		self.transition(RecorderState::Emitting);

		if let Some(snapshotter) = &self.snapshotter {
			match snapshotter.capture(&self.session).await {
				Ok(file) => self.emitter.emit(Statement::SnapshotComment { file: &file })?,
				Err(e @ Error::Snapshot { .. }) => tracing::warn!(error = %e, "Skipping DOM snapshot"),
				Err(e) => return Err(e),
			}
		}

		self.emitter.emit(Statement::Click { selector: &selector })
	}

	async fn on_submit(&mut self, target: &TargetRef) -> Result<()> {
		let Some(selector) = self.resolve(target, EventKind::Submit).await? else {
			return Ok(());
		};
		self.transition(RecorderState::Emitting);
		self.emitter.emit(Statement::Submit { selector: &selector })
	}

	async fn on_change(&mut self, target: &TargetRef) -> Result<()> {
		let value = EventBridge::new(&self.session).value_of(target).await?;
		let Some(selector) = self.resolve(target, EventKind::Change).await? else {
			return Ok(());
		};
		self.transition(RecorderState::Emitting);
		self.emitter.emit(Statement::Type {
			selector: &selector,
			value: &value,
		})
	}

	/// Starts a scroll check unless one is already pending.
	async fn on_scroll(&mut self) -> Result<()> {
		if self.scroll.is_some() {
			tracing::trace!("Scroll check pending, coalescing");
			return Ok(());
		}

		let baseline = EventBridge::new(&self.session).scroll_height().await?;
		tracing::debug!(baseline, "Scroll check armed");
		self.scroll = Some(ScrollCheck {
			baseline,
			settle: Box::pin(tokio::time::sleep(self.options.scroll_settle)),
		});
		Ok(())
	}

	async fn finish_scroll_check(&mut self) -> Result<()> {
		let Some(check) = self.scroll.take() else {
			return Ok(());
		};

		let height = EventBridge::new(&self.session).scroll_height().await?;
		if height > check.baseline {
			self.transition(RecorderState::Emitting);
			self.emitter.emit(Statement::ScrollToBottom)?;
			self.transition(RecorderState::Idle);
		} else {
			tracing::debug!(baseline = check.baseline, height, "Page did not grow after scrolling");
		}
		Ok(())
	}

	async fn resolve(&self, target: &TargetRef, kind: EventKind) -> Result<Option<Selector>> {
		let selector = SelectorResolver::new(&self.session).resolve(target).await?;
		if selector.is_none() {
			tracing::warn!(%kind, "No selector for event target, dropping interaction");
		}
		Ok(selector)
	}

	fn transition(&mut self, next: RecorderState) {
		tracing::trace!(from = ?self.state, to = ?next, "Recorder state");
		self.state = next;
	}
}

/// Completes when the pending scroll check's delay has elapsed.
async fn settled(check: Option<&mut ScrollCheck>) {
	match check {
		Some(check) => check.settle.as_mut().await,
		None => std::future::pending().await,
	}
}
