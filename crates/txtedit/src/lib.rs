//! Plain-text source editing of structured test data.
//!
//! A [`ModelAdapter`] turns a host datafile into text and parses edited text back, refusing
//! parses that lose lines. An [`EditSession`] tracks the open document and its dirty flag,
//! and the [`SourceEditorController`] reacts to host events without ever dropping edits
//! silently.

pub mod app;
pub mod domain;
pub mod infra;

pub use app::adapter::{Continuation, ModelAdapter, significant_lines};
pub use app::collaborators::{
    ActionInfo, DatafileController, Dialect, Host, HostMessage, MessageKind, Parser, Serializer,
    SubscriptionId, TextSurface,
};
pub use app::controller::{EditorState, SourceEditorController};
pub use app::session::EditSession;
pub use domain::errors::{EditorError, ParseError};
pub use domain::model::{ModelHandle, ModelKind, Row, StructuredModel, Table};
pub use infra::config::Config;

/// Load the layered configuration and install logging from it.
pub fn init() -> anyhow::Result<Config> {
    let config = Config::load()?;
    infra::logging::init(&config.logging);
    Ok(config)
}
