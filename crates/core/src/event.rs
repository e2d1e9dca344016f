//! Typed view of the DOM events the recorder captures.

use std::fmt;

/// DOM event kinds that produce script lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	Click,
	Submit,
	Change,
	Scroll,
}

impl EventKind {
	pub const ALL: [EventKind; 4] = [EventKind::Click, EventKind::Submit, EventKind::Change, EventKind::Scroll];

	/// DOM event type, as used for listener breakpoints.
	pub fn dom_name(self) -> &'static str {
		match self {
			EventKind::Click => "click",
			EventKind::Submit => "submit",
			EventKind::Change => "change",
			EventKind::Scroll => "scroll",
		}
	}

	pub fn from_dom_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.dom_name() == name)
	}

	/// Whether an event object of `class_name` can carry this kind.
	///
	/// Older engines dispatch `submit` as a plain `Event`.
	pub fn accepts_class(self, class_name: &str) -> bool {
		match self {
			EventKind::Click => matches!(class_name, "MouseEvent" | "PointerEvent"),
			EventKind::Submit => matches!(class_name, "SubmitEvent" | "Event"),
			EventKind::Change | EventKind::Scroll => class_name == "Event",
		}
	}
}

impl fmt::Display for EventKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.dom_name())
	}
}

/// Remote handle to the node an event was dispatched to.
///
/// Only valid while the page is paused on that event.
#[derive(Debug, PartialEq, Eq)]
pub struct TargetRef {
	object_id: String,
}

impl TargetRef {
	pub fn new(object_id: impl Into<String>) -> Self {
		Self {
			object_id: object_id.into(),
		}
	}

	pub fn object_id(&self) -> &str {
		&self.object_id
	}
}

/// One recognized interaction, captured at a debugger pause.
#[derive(Debug)]
pub struct CapturedEvent {
	pub kind: EventKind,
	pub target: TargetRef,
}
