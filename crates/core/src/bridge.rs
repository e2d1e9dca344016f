//! Debugger-driven event interception.
//!
//! The bridge registers event-listener breakpoints and installs one passive
//! capturing listener per event type on `window`, so every interaction pauses
//! the page inside a function whose local scope holds the `event`. Each pause
//! is handed out as a [`Pause`] token that must be given back through
//! [`EventBridge::resume`] or [`EventBridge::skip`]; a page left paused
//! freezes.


use pwrec_protocol::{CallResult, GetPropertiesResult, PausedEvent, RemoteObject};
use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::event::{CapturedEvent, EventKind, TargetRef};
use crate::session::{ProtocolSession, call, command};

pub(crate) const INSTALL_LISTENERS: &str = r#"(() => {
	if (window.__pwrecListening) return;
	window.__pwrecListening = true;
	for (const type of ["change", "click", "submit", "scroll"]) {
		window.addEventListener(type, function (event) { return event; }, { capture: true, passive: true });
	}
})()"#;

pub(crate) const EVENT_TARGET_FN: &str = "function() { return this.target; }";

pub(crate) const VALUE_FN: &str = "function() { return this.value; }";

pub(crate) const SUBMIT_CONTROL_FN: &str = r#"function() {
	return (this.tagName === "BUTTON" || this.tagName === "INPUT")
		&& (this.type === "submit" || this.type === "image")
		&& this.form != null;
}"#;

pub(crate) const SCROLL_HEIGHT_EXPR: &str = "(document.scrollingElement || document.documentElement).scrollHeight";

/// An outstanding debugger pause.
///
/// Consumed by exactly one of [`EventBridge::resume`] or [`EventBridge::skip`].
#[must_use = "a paused page stays frozen until the pause is resumed or skipped"]
#[derive(Debug)]
pub struct Pause {
	reason: String,
}

impl Pause {
	pub fn reason(&self) -> &str {
		&self.reason
	}
}

/// Breakpoint setup and pause handling for one page.
pub struct EventBridge<'a> {
	session: &'a dyn ProtocolSession,
}

impl<'a> EventBridge<'a> {
	pub fn new(session: &'a dyn ProtocolSession) -> Self {
		Self { session }
	}

	/// Arms the page after each document load.
	///
	/// Scroll breakpoints are only registered when `capture_scroll` is set;
	/// the scroll listener itself is always installed.
	pub async fn install(&self, capture_scroll: bool) -> Result<()> {
		command(self.session, "Debugger.enable", json!({})).await?;

		for kind in EventKind::ALL {
			if kind == EventKind::Scroll && !capture_scroll {
				continue;
			}
			command(
				self.session,
				"DOMDebugger.setEventListenerBreakpoint",
				json!({ "eventName": kind.dom_name() }),
			)
			.await?;
		}

		let installed: CallResult = call(
			self.session,
			"Runtime.evaluate",
			json!({ "expression": INSTALL_LISTENERS, "returnByValue": true }),
		)
		.await?;
		if let Some(details) = installed.exception_details {
			tracing::warn!(%details, "Listener installation threw");
		}

		tracing::debug!(capture_scroll, "Event bridge installed");
		Ok(())
	}

	/// Classifies a pause.
	///
	/// The captured event is `None` when the pause is not one of ours: not a
	/// listener breakpoint, an unknown event type, no `event` binding, an
	/// unexpected event class, or no target. The pause token comes back even
	/// when inspection fails, so the caller can still release the page.
	pub async fn capture(&self, paused: &PausedEvent) -> (Pause, Result<Option<CapturedEvent>>) {
		let pause = Pause {
			reason: paused.reason.clone(),
		};
		(pause, self.classify(paused).await)
	}

	async fn classify(&self, paused: &PausedEvent) -> Result<Option<CapturedEvent>> {
		if !paused.is_event_listener() {
			return Ok(None);
		}
		let Some(kind) = paused.listener_event().and_then(EventKind::from_dom_name) else {
			tracing::trace!(event = ?paused.listener_event(), "Pause for unrecognized event type");
			return Ok(None);
		};

		let Some(scope_id) = paused
			.top_frame()
			.and_then(|frame| frame.local_scope())
			.and_then(|scope| scope.object.object_id.as_deref())
		else {
			return Ok(None);
		};

		let properties: GetPropertiesResult = call(
			self.session,
			"Runtime.getProperties",
			json!({ "objectId": scope_id, "ownProperties": true }),
		)
		.await?;

		let Some(event) = properties.get("event") else {
			tracing::trace!(%kind, "Paused listener has no event binding");
			return Ok(None);
		};
		let class_name = event.class_name.as_deref().unwrap_or_default();
		if !kind.accepts_class(class_name) {
			tracing::debug!(%kind, class_name, "Event class does not match breakpoint");
			return Ok(None);
		}
		let Some(event_id) = event.object_id.as_deref() else {
			return Ok(None);
		};

		let target = self.call_on(event_id, EVENT_TARGET_FN, false).await?;
		Ok(target.object_id.map(|id| CapturedEvent {
			kind,
			target: TargetRef::new(id),
		}))
	}

	/// Ends a handled pause without re-entering breakpoints the resumed
	/// dispatch would hit.
	pub async fn resume(&self, pause: Pause) -> Result<()> {
		tracing::trace!(reason = pause.reason(), "Resuming handled pause");
		command(self.session, "Debugger.setSkipAllPauses", json!({ "skip": true })).await?;
		command(self.session, "Debugger.resume", json!({ "terminateOnResume": false })).await?;
		command(self.session, "Debugger.setSkipAllPauses", json!({ "skip": false })).await
	}

	/// Ends a pause the recorder does not handle.
	pub async fn skip(&self, pause: Pause) -> Result<()> {
		tracing::trace!(reason = pause.reason(), "Skipping pause");
		command(self.session, "Debugger.resume", json!({})).await
	}

	/// Whether clicking `target` submits its form.
	pub async fn is_submit_control(&self, target: &TargetRef) -> Result<bool> {
		let result = self.call_on(target.object_id(), SUBMIT_CONTROL_FN, true).await?;
		Ok(result.as_bool().unwrap_or(false))
	}

	/// Current `value` of `target` as text.
	///
	/// Non-string values use their JSON text; `null` and `undefined` are empty.
	pub async fn value_of(&self, target: &TargetRef) -> Result<String> {
		let result = self.call_on(target.object_id(), VALUE_FN, true).await?;
		if result.is_nullish() {
			return Ok(String::new());
		}
		Ok(match result.value {
			Some(Value::String(text)) => text,
			Some(Value::Null) | None => String::new(),
			Some(other) => other.to_string(),
		})
	}

	/// Height of the document's scrolling element.
	pub async fn scroll_height(&self) -> Result<f64> {
		let result: CallResult = call(
			self.session,
			"Runtime.evaluate",
			json!({ "expression": SCROLL_HEIGHT_EXPR, "returnByValue": true }),
		)
		.await?;
		result
			.result
			.as_f64()
			.ok_or_else(|| Error::unexpected("Runtime.evaluate", "scroll height is not a number"))
	}

	async fn call_on(&self, object_id: &str, declaration: &str, by_value: bool) -> Result<RemoteObject> {
		let result: CallResult = call(
			self.session,
			"Runtime.callFunctionOn",
			json!({
				"objectId": object_id,
				"functionDeclaration": declaration,
				"returnByValue": by_value,
			}),
		)
		.await?;
		if let Some(details) = result.exception_details {
			return Err(Error::unexpected("Runtime.callFunctionOn", details.to_string()));
		}
		Ok(result.result)
	}
}
