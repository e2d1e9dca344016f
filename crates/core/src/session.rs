//! The seam between the recorder and a page's debugging channel.

use std::sync::Arc;

use pwrec_runtime::{BoxFuture, CdpSession};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Request/response access to one page's debugging channel.
///
/// Implemented for [`CdpSession`]; tests drive the recorder with an
/// in-memory page instead.
pub trait ProtocolSession: Send + Sync {
	fn send<'a>(&'a self, method: &'a str, params: Value) -> BoxFuture<'a, pwrec_runtime::Result<Value>>;
}

impl ProtocolSession for CdpSession {
	fn send<'a>(&'a self, method: &'a str, params: Value) -> BoxFuture<'a, pwrec_runtime::Result<Value>> {
		Box::pin(CdpSession::send(self, method, params))
	}
}

impl<T: ProtocolSession + ?Sized> ProtocolSession for Arc<T> {
	fn send<'a>(&'a self, method: &'a str, params: Value) -> BoxFuture<'a, pwrec_runtime::Result<Value>> {
		(**self).send(method, params)
	}
}

/// Sends a command and decodes its result.
pub(crate) async fn call<T: DeserializeOwned>(
	session: &dyn ProtocolSession,
	method: &str,
	params: Value,
) -> Result<T> {
	let value = session.send(method, params).await?;
	serde_json::from_value(value).map_err(|e| Error::unexpected(method, e.to_string()))
}

/// Sends a command whose result carries nothing the caller needs.
pub(crate) async fn command(session: &dyn ProtocolSession, method: &str, params: Value) -> Result<()> {
	session.send(method, params).await?;
	Ok(())
}
