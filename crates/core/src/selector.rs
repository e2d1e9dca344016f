//! Selector derivation for captured event targets.
//!
//! Resolution walks up from the target through its ancestors looking for an
//! accessible name that is unique in the document:
//!
//! 1. Query the accessibility subtree of the current node. No nodes ends the walk.
//! 2. Take the name and role of the subtree's first node.
//! 3. Stop if the name no longer contains the previous node's name; the walk
//!    has reached an unrelated ancestor.
//! 4. Count document-wide nodes with that name (then name and role), ignoring
//!    the candidate's own descendants since they inherit its name. Fewer than
//!    two matches is unique.
//! 5. Otherwise continue with the parent element.
//!
//! When no accessible form is unique the resolver falls back to a CSS path.


use std::collections::HashSet;
use std::fmt;

use pwrec_protocol::{AxNode, CallResult, GetDocumentResult, QueryAxTreeResult};
use serde_json::{Value, json};

use crate::error::Result;
use crate::event::TargetRef;
use crate::session::{ProtocolSession, call};

pub(crate) const PARENT_ELEMENT_FN: &str = "function() { return this.parentElement; }";

pub(crate) const CSS_PATH_FN: &str = r##"function() {
	const segments = [];
	for (let node = this; node && node.nodeType === Node.ELEMENT_NODE; node = node.parentElement) {
		const tag = node.localName;
		if (node.id) {
			segments.unshift(tag + "#" + CSS.escape(node.id));
			break;
		}
		let index = 1;
		for (let sibling = node.previousElementSibling; sibling; sibling = sibling.previousElementSibling) {
			if (sibling.localName === tag) index++;
		}
		segments.unshift(tag + ":nth-of-type(" + index + ")");
	}
	return segments.join(" > ");
}"##;

/// A locator for one element, valid at capture time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
	/// `aria/<name>`
	Aria { name: String },
	/// `aria/<name>[role="<role>"]`
	AriaRole { name: String, role: String },
	/// Structural CSS path.
	Css(String),
}

impl fmt::Display for Selector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Selector::Aria { name } => write!(f, "aria/{name}"),
			Selector::AriaRole { name, role } => write!(f, "aria/{name}[role=\"{role}\"]"),
			Selector::Css(path) => f.write_str(path),
		}
	}
}

/// Derives selectors by querying the page. Never mutates it.
pub struct SelectorResolver<'a> {
	session: &'a dyn ProtocolSession,
	document_backend_id: Option<i64>,
}

impl<'a> SelectorResolver<'a> {
	pub fn new(session: &'a dyn ProtocolSession) -> Self {
		Self {
			session,
			document_backend_id: None,
		}
	}

	/// Returns a selector for `target`, or `None` when none can be built.
	pub async fn resolve(&mut self, target: &TargetRef) -> Result<Option<Selector>> {
		if let Some(selector) = self.accessible(target).await? {
			return Ok(Some(selector));
		}

		let path = self.css_path(target).await?;
		if path.is_none() {
			tracing::debug!(target = target.object_id(), "No structural path for target");
		}
		Ok(path.map(Selector::Css))
	}

	async fn accessible(&mut self, target: &TargetRef) -> Result<Option<Selector>> {
		let mut current = target.object_id().to_string();
		let mut previous_name = String::new();

		loop {
			let subtree = self.subtree(&current).await?;
			let Some(candidate) = subtree.first() else {
				break;
			};

			let name = candidate.name();
			let role = candidate.role();

			if !name.contains(previous_name.as_str()) {
				tracing::debug!(name, previous = %previous_name, "Ancestor lost the accessible name");
				break;
			}

			if !name.is_empty() {
				let descendants: HashSet<i64> = subtree.iter().skip(1).filter_map(|n| n.backend_dom_node_id).collect();

				if self.count_matches(name, None, &descendants).await? < 2 {
					return Ok(Some(Selector::Aria { name: name.to_string() }));
				}
				if !role.is_empty() && self.count_matches(name, Some(role), &descendants).await? < 2 {
					return Ok(Some(Selector::AriaRole {
						name: name.to_string(),
						role: role.to_string(),
					}));
				}
			}

			previous_name = name.to_string();
			match self.parent(&current).await? {
				Some(parent) => current = parent,
				None => break,
			}
		}

		Ok(None)
	}

	async fn subtree(&self, object_id: &str) -> Result<Vec<AxNode>> {
		let result: QueryAxTreeResult =
			call(self.session, "Accessibility.queryAXTree", json!({ "objectId": object_id })).await?;
		Ok(result.nodes)
	}

	/// Document-wide nodes matching `name` (and `role`), minus `excluded`.
	async fn count_matches(&mut self, name: &str, role: Option<&str>, excluded: &HashSet<i64>) -> Result<usize> {
		let root = self.document_backend_id().await?;

		let mut params = json!({ "backendNodeId": root, "accessibleName": name });
		if let Some(role) = role {
			params["role"] = Value::from(role);
		}

		let result: QueryAxTreeResult = call(self.session, "Accessibility.queryAXTree", params).await?;
		Ok(result
			.nodes
			.iter()
			.filter(|node| node.backend_dom_node_id.is_none_or(|id| !excluded.contains(&id)))
			.count())
	}

	async fn document_backend_id(&mut self) -> Result<i64> {
		if let Some(id) = self.document_backend_id {
			return Ok(id);
		}
		let document: GetDocumentResult = call(self.session, "DOM.getDocument", json!({ "depth": 0 })).await?;
		self.document_backend_id = Some(document.root.backend_node_id);
		Ok(document.root.backend_node_id)
	}

	async fn parent(&self, object_id: &str) -> Result<Option<String>> {
		let call_result: CallResult = call(
			self.session,
			"Runtime.callFunctionOn",
			json!({ "objectId": object_id, "functionDeclaration": PARENT_ELEMENT_FN }),
		)
		.await?;
		Ok(call_result.result.object_id)
	}

	async fn css_path(&self, target: &TargetRef) -> Result<Option<String>> {
		let call_result: CallResult = call(
			self.session,
			"Runtime.callFunctionOn",
			json!({
				"objectId": target.object_id(),
				"functionDeclaration": CSS_PATH_FN,
				"returnByValue": true,
			}),
		)
		.await?;
		Ok(call_result
			.result
			.as_str()
			.filter(|path| !path.is_empty())
			.map(str::to_string))
	}
}
