//! `Accessibility` domain: nodes returned by `Accessibility.queryAXTree`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A node of the accessibility tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxNode {
	pub node_id: String,
	#[serde(default)]
	pub ignored: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<AxValue>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub role: Option<AxValue>,
	/// Backend id of the DOM node this accessibility node belongs to.
	#[serde(
		default,
		rename = "backendDOMNodeId",
		skip_serializing_if = "Option::is_none"
	)]
	pub backend_dom_node_id: Option<i64>,
}

impl AxNode {
	/// Computed accessible name, empty when absent.
	pub fn name(&self) -> &str {
		self.name.as_ref().and_then(AxValue::as_str).unwrap_or_default()
	}

	/// Computed role, empty when absent.
	pub fn role(&self) -> &str {
		self.role.as_ref().and_then(AxValue::as_str).unwrap_or_default()
	}
}

/// Typed accessibility value (`{"type": "computedString", "value": "Submit"}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AxValue {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<Value>,
}

impl AxValue {
	pub fn as_str(&self) -> Option<&str> {
		self.value.as_ref().and_then(Value::as_str)
	}
}

/// Result of `Accessibility.queryAXTree`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryAxTreeResult {
	#[serde(default)]
	pub nodes: Vec<AxNode>,
}
