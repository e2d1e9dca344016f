//! `DOM` domain: document root and serialization.

use serde::{Deserialize, Serialize};

/// Minimal DOM node as returned by `DOM.getDocument`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNode {
	pub node_id: i64,
	pub backend_node_id: i64,
	#[serde(default)]
	pub node_name: String,
}

/// Result of `DOM.getDocument`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDocumentResult {
	pub root: DocumentNode,
}

/// Result of `DOM.getOuterHTML`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetOuterHtmlResult {
	#[serde(rename = "outerHTML")]
	pub outer_html: String,
}
