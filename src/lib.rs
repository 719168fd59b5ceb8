//! Implements the Hyphen Toggle client
//!
//! Toggles are evaluated remotely. Requests go to the configured horizon URLs
//! in order, falling back to the next URL when one fails. When no URLs are
//! configured the organization's default horizon URL is derived from the
//! public API key.
//!
//! To change the default request timeout set the HYPHEN_TOGGLE_TIMEOUT_MS
//! environment variable to the desired timeout value.
mod client;
mod error;
mod events;
mod http;

pub mod endpoints;
pub mod key;
pub mod models;
pub mod targeting;

pub use crate::client::{Toggle, DEFAULT_ENVIRONMENT};
pub use crate::error::{EndpointFailure, Result, ToggleError};
pub use crate::events::{EventEmitter, ERROR_EVENT};
pub use crate::http::{RequestHeaders, RequestOptions};
