//! In-memory page used by the recorder's unit tests.

use std::collections::{HashMap, HashSet, VecDeque};

use parking_lot::Mutex;
use pwrec_protocol::PausedEvent;
use pwrec_runtime::BoxFuture;
use serde_json::{Value, json};

use crate::bridge::{EVENT_TARGET_FN, INSTALL_LISTENERS, SCROLL_HEIGHT_EXPR, SUBMIT_CONTROL_FN, VALUE_FN};
use crate::selector::{CSS_PATH_FN, PARENT_ELEMENT_FN};
use crate::session::ProtocolSession;

/// Accessibility node as the browser reports it.
pub(crate) fn ax(name: &str, role: &str, backend_id: i64) -> Value {
	json!({
		"nodeId": backend_id.to_string(),
		"ignored": false,
		"name": { "type": "computedString", "value": name },
		"role": { "type": "role", "value": role },
		"backendDOMNodeId": backend_id,
	})
}

#[derive(Default)]
struct State {
	subtrees: HashMap<String, Vec<Value>>,
	parents: HashMap<String, String>,
	document: Vec<Value>,
	css_paths: HashMap<String, String>,
	values: HashMap<String, Value>,
	submit_controls: HashSet<String>,
	scopes: HashMap<String, (String, String)>,
	event_targets: HashMap<String, String>,
	scroll_heights: VecDeque<f64>,
	outer_html: String,
	failing: HashSet<String>,
	calls: Vec<(String, Value)>,
	next_pause: u32,
}

/// Scriptable page answering the protocol calls the recorder makes.
#[derive(Default)]
pub(crate) struct FakePage {
	state: Mutex<State>,
}

impl FakePage {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the nodes returned when querying the subtree of `object_id`.
	pub fn subtree(&self, object_id: &str, nodes: Vec<Value>) {
		self.state.lock().subtrees.insert(object_id.to_string(), nodes);
	}

	pub fn parent(&self, child: &str, parent: &str) {
		self.state.lock().parents.insert(child.to_string(), parent.to_string());
	}

	/// Adds nodes to the document-wide accessibility tree.
	pub fn document(&self, nodes: Vec<Value>) {
		self.state.lock().document.extend(nodes);
	}

	pub fn css_path(&self, object_id: &str, path: &str) {
		self.state.lock().css_paths.insert(object_id.to_string(), path.to_string());
	}

	pub fn value(&self, object_id: &str, value: Value) {
		self.state.lock().values.insert(object_id.to_string(), value);
	}

	pub fn submit_control(&self, object_id: &str) {
		self.state.lock().submit_controls.insert(object_id.to_string());
	}

	/// Heights reported by successive scroll measurements; the last one repeats.
	pub fn scroll_heights(&self, heights: &[f64]) {
		self.state.lock().scroll_heights = heights.iter().copied().collect();
	}

	pub fn outer_html(&self, html: &str) {
		self.state.lock().outer_html = html.to_string();
	}

	/// Makes every call to `method` fail with a remote error.
	pub fn fail(&self, method: &str) {
		self.state.lock().failing.insert(method.to_string());
	}

	/// A listener-breakpoint pause whose local `event` is a `class_name`
	/// instance dispatched to `target`.
	pub fn listener_pause(&self, event_name: &str, class_name: &str, target: &str) -> PausedEvent {
		let mut state = self.state.lock();
		state.next_pause += 1;
		let scope_id = format!("scope-{}", state.next_pause);
		let event_id = format!("event-{}", state.next_pause);
		state
			.scopes
			.insert(scope_id.clone(), (class_name.to_string(), event_id.clone()));
		state.event_targets.insert(event_id, target.to_string());
		drop(state);

		serde_json::from_value(json!({
			"reason": "EventListener",
			"data": { "eventName": format!("listener:{event_name}") },
			"callFrames": [{
				"callFrameId": "frame-0",
				"functionName": "",
				"scopeChain": [
					{ "type": "local", "object": { "type": "object", "objectId": scope_id } },
					{ "type": "global", "object": { "type": "object", "objectId": "global" } }
				]
			}]
		}))
		.unwrap()
	}

	/// A pause that did not come from a listener breakpoint.
	pub fn other_pause(&self) -> PausedEvent {
		serde_json::from_value(json!({ "reason": "other", "callFrames": [] })).unwrap()
	}

	pub fn methods(&self) -> Vec<String> {
		self.state.lock().calls.iter().map(|(m, _)| m.clone()).collect()
	}

	pub fn calls_to(&self, method: &str) -> Vec<Value> {
		self.state
			.lock()
			.calls
			.iter()
			.filter(|(m, _)| m == method)
			.map(|(_, p)| p.clone())
			.collect()
	}

	pub fn count(&self, method: &str) -> usize {
		self.calls_to(method).len()
	}

	/// Number of `Runtime.evaluate` calls that measured the scroll height.
	pub fn scroll_measurements(&self) -> usize {
		self.calls_to("Runtime.evaluate")
			.iter()
			.filter(|p| p["expression"] == SCROLL_HEIGHT_EXPR)
			.count()
	}

	fn answer(&self, method: &str, params: &Value) -> pwrec_runtime::Result<Value> {
		let mut state = self.state.lock();
		state.calls.push((method.to_string(), params.clone()));

		if state.failing.contains(method) {
			return Err(pwrec_runtime::Error::Remote {
				code: -32000,
				message: format!("{method} failed"),
				data: None,
			});
		}

		let object_id = params["objectId"].as_str().unwrap_or_default().to_string();

		let value = match method {
			"Accessibility.queryAXTree" => {
				if params.get("objectId").is_some() {
					json!({ "nodes": state.subtrees.get(&object_id).cloned().unwrap_or_default() })
				} else {
					let name = params["accessibleName"].as_str().unwrap_or_default();
					let role = params["role"].as_str();
					let nodes: Vec<Value> = state
						.document
						.iter()
						.filter(|n| n["name"]["value"] == name)
						.filter(|n| role.is_none_or(|r| n["role"]["value"] == r))
						.cloned()
						.collect();
					json!({ "nodes": nodes })
				}
			}
			"DOM.getDocument" => json!({ "root": { "nodeId": 1, "backendNodeId": 1, "nodeName": "#document" } }),
			"DOM.getOuterHTML" => json!({ "outerHTML": state.outer_html }),
			"Runtime.getProperties" => match state.scopes.get(&object_id) {
				Some((class_name, event_id)) => json!({ "result": [{
					"name": "event",
					"value": { "type": "object", "className": class_name, "objectId": event_id }
				}] }),
				None => json!({ "result": [] }),
			},
			"Runtime.callFunctionOn" => {
				let declaration = params["functionDeclaration"].as_str().unwrap_or_default();
				let result = if declaration == EVENT_TARGET_FN {
					handle(state.event_targets.get(&object_id))
				} else if declaration == PARENT_ELEMENT_FN {
					handle(state.parents.get(&object_id))
				} else if declaration == CSS_PATH_FN {
					json!({ "type": "string", "value": state.css_paths.get(&object_id).cloned().unwrap_or_default() })
				} else if declaration == VALUE_FN {
					match state.values.get(&object_id) {
						Some(Value::Null) => json!({ "type": "object", "subtype": "null", "value": null }),
						Some(Value::String(s)) => json!({ "type": "string", "value": s }),
						Some(Value::Number(n)) => json!({ "type": "number", "value": n }),
						Some(Value::Bool(b)) => json!({ "type": "boolean", "value": b }),
						Some(other) => json!({ "type": "object", "value": other }),
						None => json!({ "type": "undefined" }),
					}
				} else if declaration == SUBMIT_CONTROL_FN {
					json!({ "type": "boolean", "value": state.submit_controls.contains(&object_id) })
				} else {
					panic!("unexpected function declaration: {declaration}");
				};
				json!({ "result": result })
			}
			"Runtime.evaluate" => {
				let expression = params["expression"].as_str().unwrap_or_default();
				if expression == SCROLL_HEIGHT_EXPR {
					let height = if state.scroll_heights.len() > 1 {
						state.scroll_heights.pop_front().unwrap_or_default()
					} else {
						state.scroll_heights.front().copied().unwrap_or_default()
					};
					json!({ "result": { "type": "number", "value": height } })
				} else {
					assert_eq!(expression, INSTALL_LISTENERS);
					json!({ "result": { "type": "undefined" } })
				}
			}
			_ => json!({}),
		};
		Ok(value)
	}
}

fn handle(object_id: Option<&String>) -> Value {
	match object_id {
		Some(id) => json!({ "type": "object", "subtype": "node", "objectId": id }),
		None => json!({ "type": "object", "subtype": "null", "value": null }),
	}
}

impl ProtocolSession for FakePage {
	fn send<'a>(&'a self, method: &'a str, params: Value) -> BoxFuture<'a, pwrec_runtime::Result<Value>> {
		let result = self.answer(method, &params);
		Box::pin(async move {
			tokio::task::yield_now().await;
			result
		})
	}
}
