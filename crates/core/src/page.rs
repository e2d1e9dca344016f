//! Page-level events the recorder reacts to.

use pwrec_protocol::{FrameNavigatedEvent, PausedEvent};
use pwrec_runtime::Event;
use tokio::sync::mpsc;

/// What happened on the observed page.
#[derive(Debug, Clone)]
pub enum PageEvent {
	/// The debugger paused page script.
	Paused(PausedEvent),
	/// The document finished parsing.
	DomContentLoaded,
	/// The top-level frame committed a navigation.
	FrameNavigated { url: String },
	/// The page went away.
	Closed,
}

/// Maps one raw session event, or `None` when the recorder ignores it.
pub fn classify(event: &Event) -> Option<PageEvent> {
	match event.method.as_str() {
		"Debugger.paused" => match serde_json::from_value::<PausedEvent>(event.params.clone()) {
			Ok(paused) => Some(PageEvent::Paused(paused)),
			Err(e) => {
				tracing::warn!(error = %e, "Malformed Debugger.paused event");
				None
			}
		},
		"Page.domContentEventFired" => Some(PageEvent::DomContentLoaded),
		"Page.frameNavigated" => {
			let navigated: FrameNavigatedEvent = serde_json::from_value(event.params.clone()).ok()?;
			navigated.frame.is_main().then(|| PageEvent::FrameNavigated {
				url: navigated.frame.full_url(),
			})
		}
		"Inspector.detached" | "Inspector.targetCrashed" => Some(PageEvent::Closed),
		_ => None,
	}
}

/// Translates a session's raw events on a background task.
///
/// A closing event or the end of the raw stream yields one [`PageEvent::Closed`]
/// and ends the output.
pub fn forward(mut raw: mpsc::UnboundedReceiver<Event>) -> mpsc::UnboundedReceiver<PageEvent> {
	let (tx, rx) = mpsc::unbounded_channel();

	tokio::spawn(async move {
		while let Some(event) = raw.recv().await {
			let Some(page_event) = classify(&event) else {
				continue;
			};
			let closed = matches!(page_event, PageEvent::Closed);
			if tx.send(page_event).is_err() || closed {
				return;
			}
		}
		tracing::debug!("Session event stream ended");
		let _ = tx.send(PageEvent::Closed);
	});

	rx
}
