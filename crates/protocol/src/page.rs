//! `Page` domain: frame navigation.

use serde::{Deserialize, Serialize};

/// Frame info carried by `Page.frameNavigated`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
	pub id: String,
	/// Absent for the top-level frame.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parent_id: Option<String>,
	pub url: String,
	/// Fragment including the leading `#`, reported separately from `url`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub url_fragment: Option<String>,
}

impl Frame {
	pub fn is_main(&self) -> bool {
		self.parent_id.is_none()
	}

	/// URL as the page reports it, fragment included.
	pub fn full_url(&self) -> String {
		match &self.url_fragment {
			Some(fragment) => format!("{}{}", self.url, fragment),
			None => self.url.clone(),
		}
	}
}

/// Payload of `Page.frameNavigated`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameNavigatedEvent {
	pub frame: Frame,
}
