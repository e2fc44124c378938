//! In-memory test data model edited through its plain-text form.

use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Shared handle to a host-owned model. Replacing a model swaps the handle, never mutates
/// through it.
pub type ModelHandle = Rc<StructuredModel>;

/// Concrete kind of a model, which decides how an empty replacement target is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelKind {
    /// A single suite or resource file.
    File,
    /// A directory of test data files, optionally carrying directory level settings in an
    /// init file.
    DirectoryAggregate { init_file: Option<PathBuf> },
}

impl ModelKind {
    pub fn is_directory(&self) -> bool {
        matches!(self, ModelKind::DirectoryAggregate { .. })
    }

    pub fn init_file(&self) -> Option<&Path> {
        match self {
            ModelKind::File => None,
            ModelKind::DirectoryAggregate { init_file } => init_file.as_deref(),
        }
    }
}

/// A row of cells inside a table.
pub type Row = Vec<String>;

/// One named table of a test data file (settings, variables, test cases, keywords, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: String,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }
}

/// Parsed representation of a test data file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredModel {
    pub source: PathBuf,
    pub kind: ModelKind,
    pub tables: Vec<Table>,
}

impl StructuredModel {
    /// Empty plain file model.
    pub fn file(source: impl Into<PathBuf>) -> Self {
        Self::empty(ModelKind::File, source)
    }

    /// Empty directory aggregate rooted at `directory`.
    pub fn directory(directory: impl Into<PathBuf>, init_file: Option<PathBuf>) -> Self {
        Self::empty(ModelKind::DirectoryAggregate { init_file }, directory)
    }

    pub fn empty(kind: ModelKind, source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            kind,
            tables: Vec::new(),
        }
    }

    /// Table with the given header, created at the end when missing.
    pub fn table_mut(&mut self, header: &str) -> &mut Table {
        let index = match self.tables.iter().position(|table| table.header == header) {
            Some(index) => index,
            None => {
                self.tables.push(Table::new(header));
                self.tables.len() - 1
            }
        };
        &mut self.tables[index]
    }

    pub fn table(&self, header: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.header == header)
    }

    /// Whether two models carry the same data, ignoring where they came from.
    pub fn same_content(&self, other: &StructuredModel) -> bool {
        self.kind == other.kind && self.tables == other.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_kind_exposes_init_file() {
        let model = StructuredModel::directory("suite", Some("suite/__init__.robot".into()));
        assert!(model.kind.is_directory());
        assert_eq!(
            model.kind.init_file(),
            Some(Path::new("suite/__init__.robot"))
        );
        assert_eq!(ModelKind::File.init_file(), None);
    }

    #[test]
    fn table_mut_reuses_existing_headers() {
        let mut model = StructuredModel::file("a.robot");
        model.table_mut("Settings").push_row(["Library", "OperatingSystem"]);
        model.table_mut("Test Cases").push_row(["Example"]);
        model.table_mut("Settings").push_row(["Resource", "common.robot"]);

        assert_eq!(model.tables.len(), 2);
        assert_eq!(model.table("Settings").map(|t| t.rows.len()), Some(2));
    }
}
