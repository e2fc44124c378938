//! Buffer lifecycle of the document shown in the editor.

use tracing::debug;

use crate::app::adapter::ModelAdapter;
use crate::app::collaborators::TextSurface;
use crate::domain::errors::EditorError;

/// Text surface plus the adapter of the document it shows.
///
/// `dirty` is only ever set while an adapter is present.
pub struct EditSession<S> {
    surface: S,
    adapter: Option<ModelAdapter>,
    dirty: bool,
}

impl<S: TextSurface> EditSession<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            adapter: None,
            dirty: false,
        }
    }

    pub fn dirty(&self) -> bool {
        self.dirty
    }

    pub fn adapter(&self) -> Option<&ModelAdapter> {
        self.adapter.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Show `adapter`'s document, replacing whatever was open. Unsaved edits of the
    /// previous document are dropped, so resolve them first.
    pub fn open(&mut self, adapter: ModelAdapter) -> Result<(), EditorError> {
        let content = adapter.content()?;
        self.surface.set_text(&content);
        debug!(
            source = %adapter.datafile().source().display(),
            discarded_edits = self.dirty,
            "opened datafile in editor"
        );
        self.adapter = Some(adapter);
        self.dirty = false;
        Ok(())
    }

    /// Record a user edit. Returns `true` on the clean to dirty transition, which is the
    /// only time the host hears about it.
    pub fn mark_dirty(&mut self) -> bool {
        if self.dirty {
            return false;
        }
        let Some(adapter) = &self.adapter else {
            debug!("edit ignored, no datafile open");
            return false;
        };
        self.dirty = true;
        adapter.mark_dirty();
        true
    }

    /// Push the edited text into the model. Returns whether anything was saved.
    ///
    /// On failure the session stays dirty and the text is left as the user wrote it.
    pub fn save(&mut self) -> Result<bool, EditorError> {
        if !self.dirty {
            return Ok(false);
        }
        let adapter = self.adapter.as_ref().ok_or(EditorError::NoDocument)?;
        adapter.update_from(&self.surface.utf8_text())?;
        self.reset();
        Ok(true)
    }

    /// Forget unsaved edits without touching the model or the text.
    pub fn reset(&mut self) {
        self.dirty = false;
    }

    /// Detach from the open document and drop any unsaved edits. The text is left as is
    /// until the next [`open`](Self::open).
    pub fn close(&mut self) {
        self.adapter = None;
        self.reset();
    }
}
