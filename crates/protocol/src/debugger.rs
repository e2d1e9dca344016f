//! `Debugger` domain: pause notifications.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::runtime::RemoteObject;

/// Prefix the browser puts on event-listener breakpoint names.
const LISTENER_PREFIX: &str = "listener:";

/// Payload of `Debugger.paused`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PausedEvent {
	#[serde(default)]
	pub call_frames: Vec<CallFrame>,
	/// Pause reason, `EventListener` for listener breakpoints.
	pub reason: String,
	/// Reason-specific data; carries `eventName` for listener breakpoints.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Value>,
}

impl PausedEvent {
	/// Returns `true` when the pause came from an event-listener breakpoint.
	pub fn is_event_listener(&self) -> bool {
		self.reason == "EventListener"
	}

	/// DOM event type that triggered the pause (`click` for `listener:click`).
	pub fn listener_event(&self) -> Option<&str> {
		let name = self.data.as_ref()?.get("eventName")?.as_str()?;
		Some(name.strip_prefix(LISTENER_PREFIX).unwrap_or(name))
	}

	/// Innermost call frame.
	pub fn top_frame(&self) -> Option<&CallFrame> {
		self.call_frames.first()
	}
}

/// One stack frame of the paused execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
	pub call_frame_id: String,
	#[serde(default)]
	pub function_name: String,
	#[serde(default)]
	pub scope_chain: Vec<Scope>,
}

impl CallFrame {
	/// The function-local scope, falling back to the first scope in the chain.
	pub fn local_scope(&self) -> Option<&Scope> {
		self.scope_chain
			.iter()
			.find(|s| s.kind == "local")
			.or_else(|| self.scope_chain.first())
	}
}

/// Scope description; `object` holds the scope's variables as properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
	#[serde(rename = "type")]
	pub kind: String,
	pub object: RemoteObject,
}
