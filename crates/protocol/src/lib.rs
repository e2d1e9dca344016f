//! Wire types for the Chrome DevTools Protocol domains the recorder speaks.
//!
//! Only the fields the recorder reads are modelled; everything else is ignored
//! on deserialization so newer browsers stay compatible.
//!
//! # Domains
//!
//! - [`runtime`] - remote objects, property descriptors, call results
//! - [`debugger`] - `Debugger.paused` call frames and scopes
//! - [`accessibility`] - accessibility nodes from `Accessibility.queryAXTree`
//! - [`dom`] - document root and outer HTML
//! - [`page`] - frame navigation events
//! - [`target`] - target discovery and attachment

pub mod accessibility;
pub mod debugger;
pub mod dom;
pub mod page;
pub mod runtime;
pub mod target;

pub use accessibility::{AxNode, AxValue, QueryAxTreeResult};
pub use debugger::{CallFrame, PausedEvent, Scope};
pub use dom::{DocumentNode, GetDocumentResult, GetOuterHtmlResult};
pub use page::{Frame, FrameNavigatedEvent};
pub use runtime::{CallResult, GetPropertiesResult, PropertyDescriptor, RemoteObject};
pub use target::{AttachToTargetResult, CreateTargetResult, GetTargetsResult, TargetInfo};
