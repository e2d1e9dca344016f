//! `Runtime` domain: remote object handles and property inspection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Mirror object referencing a value in the page's JavaScript heap.
///
/// Either `value` (primitives, or anything requested with `returnByValue`) or
/// `object_id` (a live handle) is populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
	/// Object type: `object`, `function`, `undefined`, `string`, `number`, `boolean`, ...
	#[serde(rename = "type")]
	pub kind: String,
	/// Object subtype hint for `object` values (`node`, `null`, `array`, ...).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subtype: Option<String>,
	/// Constructor name for objects, e.g. `MouseEvent`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub class_name: Option<String>,
	/// Primitive or by-value result.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<Value>,
	/// String representation of the object.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Handle usable in follow-up calls; absent for primitives.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub object_id: Option<String>,
}

impl RemoteObject {
	/// Returns `true` for `null` and `undefined` results.
	pub fn is_nullish(&self) -> bool {
		self.kind == "undefined" || self.subtype.as_deref() == Some("null")
	}

	/// Returns the by-value payload as a string slice when it is a JSON string.
	pub fn as_str(&self) -> Option<&str> {
		self.value.as_ref().and_then(Value::as_str)
	}

	/// Returns the by-value payload as a float when it is a JSON number.
	pub fn as_f64(&self) -> Option<f64> {
		self.value.as_ref().and_then(Value::as_f64)
	}

	/// Returns the by-value payload as a bool when it is a JSON boolean.
	pub fn as_bool(&self) -> Option<bool> {
		self.value.as_ref().and_then(Value::as_bool)
	}
}

/// One property of an inspected object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<RemoteObject>,
}

/// Result of `Runtime.getProperties`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetPropertiesResult {
	#[serde(default)]
	pub result: Vec<PropertyDescriptor>,
}

impl GetPropertiesResult {
	/// Finds a property value by name.
	pub fn get(&self, name: &str) -> Option<&RemoteObject> {
		self.result
			.iter()
			.find(|p| p.name == name)
			.and_then(|p| p.value.as_ref())
	}
}

/// Result of `Runtime.evaluate` and `Runtime.callFunctionOn`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallResult {
	pub result: RemoteObject,
	/// Present when the evaluated code threw.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub exception_details: Option<Value>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deserializes_object_handle() {
		let json = r#"{"type":"object","subtype":"node","className":"HTMLButtonElement","description":"button#go","objectId":"{\"injectedScriptId\":1,\"id\":7}"}"#;
		let obj: RemoteObject = serde_json::from_str(json).unwrap();
		assert_eq!(obj.kind, "object");
		assert_eq!(obj.class_name.as_deref(), Some("HTMLButtonElement"));
		assert!(obj.object_id.is_some());
		assert!(!obj.is_nullish());
	}

	#[test]
	fn null_and_undefined_are_nullish() {
		let null: RemoteObject = serde_json::from_str(r#"{"type":"object","subtype":"null","value":null}"#).unwrap();
		let undefined: RemoteObject = serde_json::from_str(r#"{"type":"undefined"}"#).unwrap();
		assert!(null.is_nullish());
		assert!(undefined.is_nullish());
	}

	#[test]
	fn property_lookup_by_name() {
		let json = r#"{"result":[{"name":"this","value":{"type":"object"}},{"name":"event","value":{"type":"object","className":"PointerEvent","objectId":"ev"}}]}"#;
		let props: GetPropertiesResult = serde_json::from_str(json).unwrap();
		let event = props.get("event").unwrap();
		assert_eq!(event.class_name.as_deref(), Some("PointerEvent"));
		assert!(props.get("missing").is_none());
	}

	#[test]
	fn call_result_with_value() {
		let json = r#"{"result":{"type":"number","value":1280,"description":"1280"}}"#;
		let call: CallResult = serde_json::from_str(json).unwrap();
		assert_eq!(call.result.as_f64(), Some(1280.0));
		assert!(call.exception_details.is_none());
	}
}
