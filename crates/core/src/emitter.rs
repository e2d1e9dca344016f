//! Script output: typed statements, indentation, and the line stream.


use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::selector::Selector;

const INDENT: &str = "  ";

/// Renders `text` as a quoted string literal.
///
/// JSON string syntax is a subset of JavaScript's, so the literal evaluates
/// back to `text` exactly.
pub fn js_string(text: &str) -> String {
	Value::from(text).to_string()
}

/// One line of the generated script.
#[derive(Debug, Clone, Copy)]
pub enum Statement<'a> {
	/// Imports the runtime helpers.
	Require { module: &'a str },
	/// Opens the page and the script body.
	Open { url: &'a str },
	/// Closes the script body.
	Close,
	Click { selector: &'a Selector },
	Submit { selector: &'a Selector },
	Type { selector: &'a Selector, value: &'a str },
	ScrollToBottom,
	ExpectUrl { url: &'a str },
	SnapshotComment { file: &'a str },
}

impl Statement<'_> {
	pub fn render(&self) -> String {
		match self {
			Statement::Require { module } => format!(
				"const {{open, click, type, submit, expect, scrollToBottom}} = require({});",
				js_string(module)
			),
			Statement::Open { url } => format!("open({}, {{}}, async (page) => {{", js_string(url)),
			Statement::Close => "});".to_string(),
			Statement::Click { selector } => format!("await click({});", js_string(&selector.to_string())),
			Statement::Submit { selector } => format!("await submit({});", js_string(&selector.to_string())),
			Statement::Type { selector, value } => format!(
				"await type({}, {});",
				js_string(&selector.to_string()),
				js_string(value)
			),
			Statement::ScrollToBottom => "await scrollToBottom();".to_string(),
			Statement::ExpectUrl { url } => format!("expect(page.url()).resolves.toBe({});", js_string(url)),
			Statement::SnapshotComment { file } => format!("// DOM snapshot: {file}"),
		}
	}
}

/// Single writer of the script stream.
///
/// Lines are never reordered or rewritten. The stream ends exactly once,
/// through [`finish`](Self::finish) or [`abort`](Self::abort).
#[derive(Debug)]
pub struct ScriptEmitter {
	tx: Option<mpsc::UnboundedSender<String>>,
	depth: usize,
}

impl ScriptEmitter {
	pub fn new() -> (Self, ScriptStream) {
		let (tx, rx) = mpsc::unbounded_channel();
		(Self { tx: Some(tx), depth: 0 }, ScriptStream { rx })
	}

	pub fn depth(&self) -> usize {
		self.depth
	}

	pub fn is_closed(&self) -> bool {
		self.tx.is_none()
	}

	/// Appends one indented line.
	pub fn emit(&mut self, statement: Statement<'_>) -> Result<()> {
		let tx = self.tx.as_ref().ok_or(Error::StreamClosed)?;

		if matches!(statement, Statement::Close) {
			self.depth = self.depth.saturating_sub(1);
		}

		let line = format!("{}{}\n", INDENT.repeat(self.depth), statement.render());
		tx.send(line).map_err(|_| Error::StreamClosed)?;

		if matches!(statement, Statement::Open { .. }) {
			self.depth += 1;
		}
		Ok(())
	}

	/// Ends the stream after the last line.
	pub fn finish(&mut self) -> Result<()> {
		self.tx.take().map(drop).ok_or(Error::StreamClosed)
	}

	/// Ends the stream without closing the skeleton.
	pub fn abort(&mut self) {
		if self.tx.take().is_some() {
			tracing::debug!(depth = self.depth, "Script stream aborted");
		}
	}
}

/// Receiving end of the script: one item per line, newline included.
#[derive(Debug)]
pub struct ScriptStream {
	rx: mpsc::UnboundedReceiver<String>,
}

impl ScriptStream {
	/// Next line, or `None` once the stream has ended.
	pub async fn next_line(&mut self) -> Option<String> {
		self.rx.recv().await
	}
}

impl Stream for ScriptStream {
	type Item = String;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
		self.rx.poll_recv(cx)
	}
}
