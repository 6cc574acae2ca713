//! Minimal client for a stateful, polled Responses-style API.
//!
//! This crate only knows the wire shape: create a response, retrieve it
//! by id, map non-2xx bodies into a typed error. Everything about
//! chaining, compression, retries, and translating to/from a host's own
//! message model lives in `core`, one layer up.

pub mod client;
pub mod error;
pub mod resources;
pub mod types;

pub use client::Client;
pub use error::SdkError;
pub use types::InputItem;
pub use types::OutputContent;
pub use types::OutputItem;
pub use types::ReasoningConfig;
pub use types::Response;
pub use types::ResponseCreateParams;
pub use types::ResponseStatus;
pub use types::Role;
pub use types::ToolDefinition;
pub use types::Usage;
