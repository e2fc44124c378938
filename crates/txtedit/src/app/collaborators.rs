//! Interfaces of the host application and the text dialect the editor plugs into.
//!
//! None of these are implemented here: the host owns the data model, the widgets and the
//! message bus, and a dialect owns the grammar. The editor only drives them.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use crate::domain::errors::{EditorError, ParseError};
use crate::domain::model::{ModelHandle, StructuredModel};

/// Streaming populator: reads raw text and fills in `target`, whose kind and source are
/// already set.
pub trait Parser {
    fn populate(&self, source: &mut dyn BufRead, target: &mut StructuredModel)
    -> Result<(), ParseError>;
}

/// Writes a model in the textual dialect consumed by the matching [`Parser`].
pub trait Serializer {
    fn serialize(&self, model: &StructuredModel, output: &mut dyn Write) -> std::io::Result<()>;
}

/// A parser and serializer pair for one textual dialect.
pub trait Dialect: Parser + Serializer {}

impl<T: Parser + Serializer> Dialect for T {}

/// Host side container holding the model of one datafile.
///
/// The host and the editor share the container, so implementations use interior mutability.
pub trait DatafileController {
    /// Current model. Always reflects the latest installed replacement.
    fn datafile(&self) -> ModelHandle;

    /// Source path of a file model.
    fn source(&self) -> PathBuf;

    /// Directory a directory aggregate is rooted at.
    fn directory(&self) -> PathBuf;

    /// Replace the model with `model`.
    fn set_datafile(&self, model: StructuredModel) -> Result<(), EditorError>;

    /// Flag the datafile as modified for every view of it.
    fn mark_dirty(&self);
}

/// The text widget showing the serialized model.
pub trait TextSurface {
    fn set_text(&mut self, text: &str);

    fn text(&self) -> String;

    fn utf8_text(&self) -> Vec<u8> {
        self.text().into_bytes()
    }
}

/// A menu entry registered with the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInfo {
    pub menu: String,
    pub name: String,
    pub shortcut: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Message kinds the editor listens to. `Any` receives every message on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Saving,
    TreeSelection,
    TabChanging,
    Any,
}

/// Notifications published by the host.
#[derive(Clone)]
pub enum HostMessage {
    /// The user asked to persist everything.
    Saving,
    /// Another datafile was selected in the navigation tree.
    TreeSelection {
        datafile: Option<Rc<dyn DatafileController>>,
    },
    /// The whole suite was reloaded and every model replaced.
    OpenSuite,
    /// A datafile was marked modified. Published in response to the editor's own edits.
    DataChangedToDirty,
    /// The active notebook page is about to change.
    TabChanging {
        old_tab: Option<String>,
        new_tab: Option<String>,
    },
    /// Any other message on the bus.
    Other(String),
}

impl HostMessage {
    pub fn name(&self) -> &str {
        match self {
            HostMessage::Saving => "saving",
            HostMessage::TreeSelection { .. } => "tree selection",
            HostMessage::OpenSuite => "open suite",
            HostMessage::DataChangedToDirty => "data changed to dirty",
            HostMessage::TabChanging { .. } => "tab changing",
            HostMessage::Other(name) => name,
        }
    }
}

impl std::fmt::Debug for HostMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostMessage::TabChanging { old_tab, new_tab } => f
                .debug_struct("TabChanging")
                .field("old_tab", old_tab)
                .field("new_tab", new_tab)
                .finish(),
            HostMessage::TreeSelection { datafile } => f
                .debug_struct("TreeSelection")
                .field("datafile", &datafile.as_ref().map(|data| data.source()))
                .finish(),
            other => f.write_str(other.name()),
        }
    }
}

/// Services the host application offers to the editor.
pub trait Host {
    type Surface: TextSurface;

    /// Create the text widget and add it as a page titled `title`.
    fn create_surface(&mut self, title: &str) -> Self::Surface;

    /// Datafile currently selected in the navigation tree.
    fn selected_datafile(&self) -> Option<Rc<dyn DatafileController>>;

    /// Refresh tree labels and other views of the current datafile.
    fn refresh_current_datafile(&mut self);

    fn current_page_title(&self) -> Option<String>;

    fn show_tab(&mut self, title: &str);

    fn register_action(&mut self, action: ActionInfo);

    fn unregister_actions(&mut self);

    fn subscribe(&mut self, kind: MessageKind) -> SubscriptionId;

    fn unsubscribe(&mut self, id: SubscriptionId);

    /// Modal yes/no question. Returns `true` for yes.
    fn ask_yes_no(&mut self, title: &str, message: &str) -> bool;

    fn show_error(&mut self, title: &str, message: &str);
}
