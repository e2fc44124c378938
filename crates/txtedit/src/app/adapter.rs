//! Conversion between a host datafile and its plain-text form.

use std::io::Cursor;
use std::path::Path;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::app::collaborators::{DatafileController, Dialect, Serializer};
use crate::domain::errors::EditorError;
use crate::domain::model::{ModelKind, StructuredModel};

/// Wraps one host datafile and reconciles edited text back into it.
pub struct ModelAdapter {
    data: Rc<dyn DatafileController>,
    dialect: Rc<dyn Dialect>,
    continuation: Continuation,
}

impl ModelAdapter {
    pub fn new(
        data: Rc<dyn DatafileController>,
        dialect: Rc<dyn Dialect>,
        continuation: impl Into<Continuation>,
    ) -> Self {
        Self {
            data,
            dialect,
            continuation: continuation.into(),
        }
    }

    pub fn datafile(&self) -> &Rc<dyn DatafileController> {
        &self.data
    }

    /// Serialized text of the current model.
    pub fn content(&self) -> Result<String, EditorError> {
        render(self.dialect.as_ref(), &self.data.datafile())
    }

    /// Parse `content` into a fresh model of the same kind and install it in the host.
    ///
    /// The host model is left untouched when parsing fails or when the parsed model
    /// serializes to fewer significant lines than `content` has.
    pub fn update_from(&self, content: &[u8]) -> Result<(), EditorError> {
        let text = std::str::from_utf8(content)?;
        let mut target = self.create_target();
        self.dialect
            .populate(&mut Cursor::new(content), &mut target)?;
        self.sanity_check(&target, text)?;
        self.data.set_datafile(target)?;
        debug!(source = %self.data.source().display(), "installed edited datafile");
        self.mark_dirty();
        Ok(())
    }

    pub fn mark_dirty(&self) {
        self.data.mark_dirty();
    }

    fn sanity_check(&self, candidate: &StructuredModel, current: &str) -> Result<(), EditorError> {
        let candidate_text = render(self.dialect.as_ref(), candidate)?;
        let input = significant_lines(current, &self.continuation);
        let reparsed = significant_lines(&candidate_text, &self.continuation);
        if input > reparsed {
            warn!(input, reparsed, "edited text does not survive a round trip");
            return Err(EditorError::SanityCheck { input, reparsed });
        }
        Ok(())
    }

    fn create_target(&self) -> StructuredModel {
        let current = self.data.datafile();
        create_target(&current.kind, &self.data.source(), &self.data.directory())
    }
}

/// Empty model of `kind`. Directory aggregates keep their init file and are rooted at
/// `directory`; files are rooted at `source`.
pub fn create_target(kind: &ModelKind, source: &Path, directory: &Path) -> StructuredModel {
    match kind {
        ModelKind::File => StructuredModel::file(source),
        ModelKind::DirectoryAggregate { init_file } => {
            StructuredModel::directory(directory, init_file.clone())
        }
    }
}

/// How continuation lines are recognised when counting significant lines.
///
/// A line holding only the marker never counts. With `skip_continued_rows`, a line that
/// starts with the marker followed by whitespace does not count either, so a row wrapped by
/// hand compares equal to the same row written on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
    pub marker: String,
    pub skip_continued_rows: bool,
}

impl Continuation {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            skip_continued_rows: false,
        }
    }

    pub fn skipping_continued_rows(mut self) -> Self {
        self.skip_continued_rows = true;
        self
    }

    fn continues(&self, line: &str) -> bool {
        match line.strip_prefix(self.marker.as_str()) {
            Some("") => true,
            Some(rest) => self.skip_continued_rows && rest.starts_with(char::is_whitespace),
            None => false,
        }
    }
}

impl From<&str> for Continuation {
    fn from(marker: &str) -> Self {
        Self::new(marker)
    }
}

impl From<String> for Continuation {
    fn from(marker: String) -> Self {
        Self::new(marker)
    }
}

/// Number of lines that are neither blank nor continuation lines.
pub fn significant_lines(text: &str, continuation: &Continuation) -> usize {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !continuation.continues(line))
        .count()
}

fn render<S: Serializer + ?Sized>(
    serializer: &S,
    model: &StructuredModel,
) -> Result<String, EditorError> {
    let mut output = Vec::new();
    serializer.serialize(model, &mut output)?;
    String::from_utf8(output).map_err(|err| EditorError::Encoding(err.utf8_error()))
}
