//! Drives the source editor from host events.
//!
//! The one policy enforced here is that dirty edits are never dropped by navigating away
//! without asking. Selection changes and leaving the editor tab prompt the user to apply or
//! discard, a host wide save applies silently, and a reloaded suite discards silently since
//! the models the edits were made against are gone.

use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::app::adapter::ModelAdapter;
use crate::app::collaborators::{
    ActionInfo, DatafileController, Dialect, Host, HostMessage, MessageKind, SubscriptionId,
};
use crate::app::session::EditSession;
use crate::domain::errors::EditorError;
use crate::infra::config::Config;

const SUBSCRIPTIONS: [MessageKind; 4] = [
    MessageKind::Saving,
    MessageKind::TreeSelection,
    MessageKind::Any,
    MessageKind::TabChanging,
];

/// Visible state of the editor page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Closed,
    OpenClean,
    OpenDirty,
}

/// The source editor plugin. Owns the edit session and every host registration it made.
pub struct SourceEditorController<H: Host> {
    host: H,
    dialect: Rc<dyn Dialect>,
    config: Config,
    editor: Option<EditSession<H::Surface>>,
    subscriptions: Vec<SubscriptionId>,
}

impl<H: Host> SourceEditorController<H> {
    pub fn new(host: H, dialect: Rc<dyn Dialect>, config: Config) -> Self {
        Self {
            host,
            dialect,
            config,
            editor: None,
            subscriptions: Vec::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn title(&self) -> &str {
        &self.config.editor.title
    }

    /// The session, if the editor page has been created.
    pub fn session(&self) -> Option<&EditSession<H::Surface>> {
        self.editor.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    pub fn state(&self) -> EditorState {
        match &self.editor {
            Some(editor) if editor.dirty() => EditorState::OpenDirty,
            Some(editor) if editor.adapter().is_some() => EditorState::OpenClean,
            _ => EditorState::Closed,
        }
    }

    /// Register the menu action and message subscriptions, then show the selected datafile.
    pub fn enable(&mut self) -> Result<(), EditorError> {
        let action = &self.config.action;
        self.host.register_action(ActionInfo {
            menu: action.menu.clone(),
            name: action.name.clone(),
            shortcut: action.shortcut.clone(),
        });
        for kind in SUBSCRIPTIONS {
            let id = self.host.subscribe(kind);
            self.subscriptions.push(id);
        }
        info!(title = %self.config.editor.title, "source editor enabled");
        self.open()
    }

    /// Drop every registration and the editor session.
    pub fn disable(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.host.unsubscribe(id);
        }
        self.host.unregister_actions();
        self.editor = None;
        info!("source editor disabled");
    }

    /// Menu action: show the selected datafile in the editor.
    pub fn on_open(&mut self) -> Result<(), EditorError> {
        self.open()
    }

    /// Keystroke in the text surface.
    pub fn on_editor_key(&mut self) {
        if self.editor().mark_dirty() {
            debug!("editor content changed");
        }
    }

    /// Dispatch a bus message by kind.
    pub fn handle(&mut self, message: &HostMessage) -> Result<(), EditorError> {
        match message {
            HostMessage::Saving => self.on_saving(),
            HostMessage::TabChanging { old_tab, new_tab } => {
                self.on_tab_change(old_tab.as_deref(), new_tab.as_deref())
            }
            HostMessage::DataChangedToDirty => Ok(()),
            HostMessage::OpenSuite => self.on_suite_reloaded(),
            other => self.on_tree_selection(other),
        }
    }

    fn on_saving(&mut self) -> Result<(), EditorError> {
        if !self.is_focused() {
            return Ok(());
        }
        self.save_and_refresh()
    }

    fn on_tree_selection(&mut self, message: &HostMessage) -> Result<(), EditorError> {
        if !self.is_focused() {
            return Ok(());
        }
        if self.editor().dirty() {
            self.ask_and_apply()?;
        }
        let datafile = match message {
            HostMessage::TreeSelection { datafile } => datafile.clone(),
            _ => self.host.selected_datafile(),
        };
        self.open_in_editor(datafile)
    }

    /// Every model was replaced, so pending edits refer to datafiles the host no longer holds.
    /// They are dropped and the selection reloaded whether or not the editor is showing.
    fn on_suite_reloaded(&mut self) -> Result<(), EditorError> {
        let Some(editor) = self.editor.as_mut() else {
            return Ok(());
        };
        debug!(discarded_edits = editor.dirty(), "suite reloaded");
        editor.reset();
        match self.host.selected_datafile() {
            Some(datafile) => self.open_in_editor(Some(datafile)),
            None => {
                editor.close();
                Ok(())
            }
        }
    }

    fn on_tab_change(
        &mut self,
        old_tab: Option<&str>,
        new_tab: Option<&str>,
    ) -> Result<(), EditorError> {
        if new_tab == Some(self.title()) && !self.editor().dirty() {
            self.open()?;
        }
        if old_tab == Some(self.title()) && self.editor().dirty() {
            self.ask_and_apply()?;
        }
        Ok(())
    }

    fn open(&mut self) -> Result<(), EditorError> {
        let datafile = self.host.selected_datafile();
        self.open_in_editor(datafile)?;
        let title = self.config.editor.title.clone();
        self.host.show_tab(&title);
        Ok(())
    }

    fn open_in_editor(
        &mut self,
        datafile: Option<Rc<dyn DatafileController>>,
    ) -> Result<(), EditorError> {
        let Some(datafile) = datafile else {
            return Ok(());
        };
        let adapter = ModelAdapter::new(
            datafile,
            self.dialect.clone(),
            self.config.editor.continuation(),
        );
        self.editor().open(adapter)
    }

    /// Ask whether to apply the pending edits. On apply failure the edits stay dirty and the
    /// error is returned so the caller abandons whatever navigation triggered the question.
    fn ask_and_apply(&mut self) -> Result<(), EditorError> {
        let prompt = &self.config.prompt;
        let apply = self.host.ask_yes_no(&prompt.title, &prompt.message);
        debug!(apply, "answered pending changes prompt");
        if apply {
            self.save_and_refresh()?;
        }
        self.editor().reset();
        Ok(())
    }

    fn save_and_refresh(&mut self) -> Result<(), EditorError> {
        match self.editor().save() {
            Ok(true) => {
                info!("applied source changes");
                self.host.refresh_current_datafile();
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(err) => {
                warn!(error = %err, "could not apply source changes");
                let title = if err.is_recoverable() {
                    "Invalid source"
                } else {
                    "Changes not applied"
                };
                self.host.show_error(title, &err.to_string());
                Err(err)
            }
        }
    }

    fn is_focused(&self) -> bool {
        self.host.current_page_title().as_deref() == Some(self.title())
    }

    fn editor(&mut self) -> &mut EditSession<H::Surface> {
        let host = &mut self.host;
        let title = &self.config.editor.title;
        self.editor
            .get_or_insert_with(|| EditSession::new(host.create_surface(title)))
    }
}
