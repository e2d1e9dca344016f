//! `Target` domain: discovering and attaching to pages.

use serde::{Deserialize, Serialize};

/// Description of a debuggable target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
	pub target_id: String,
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub url: String,
	#[serde(default)]
	pub attached: bool,
}

impl TargetInfo {
	pub fn is_page(&self) -> bool {
		self.kind == "page"
	}
}

/// Result of `Target.getTargets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTargetsResult {
	pub target_infos: Vec<TargetInfo>,
}

/// Result of `Target.attachToTarget`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachToTargetResult {
	pub session_id: String,
}

/// Result of `Target.createTarget`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTargetResult {
	pub target_id: String,
}
