#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use txtedit::{
    ActionInfo, DatafileController, EditorError, Host, MessageKind, ModelHandle, ParseError,
    Parser, Serializer, StructuredModel, SubscriptionId, TextSurface,
};

pub const CONTINUATION: &str = "...";
const CELLS_PER_LINE: usize = 4;

/// Pipe separated tables:
///
/// ```text
/// *** Test Cases ***
/// Example | Log | hello
/// ... | world
/// ```
///
/// Lines starting with `#` are skipped, which makes comments a lossy construct.
pub struct PipeDialect;

impl Parser for PipeDialect {
    fn populate(
        &self,
        source: &mut dyn BufRead,
        target: &mut StructuredModel,
    ) -> Result<(), ParseError> {
        let mut current: Option<String> = None;
        for (index, line) in source.lines().enumerate() {
            let line = line.map_err(|err| ParseError::new(err.to_string()))?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if let Some(header) = trimmed
                .strip_prefix("***")
                .and_then(|rest| rest.strip_suffix("***"))
            {
                let header = header.trim().to_owned();
                target.table_mut(&header);
                current = Some(header);
                continue;
            }
            let header = current
                .as_deref()
                .ok_or_else(|| ParseError::at_line(index + 1, "row outside of a table"))?;
            let cells: Vec<&str> = trimmed.split('|').map(str::trim).collect();
            let table = target.table_mut(header);
            if cells[0] == CONTINUATION {
                let row = table
                    .rows
                    .last_mut()
                    .ok_or_else(|| ParseError::at_line(index + 1, "nothing to continue"))?;
                row.extend(cells[1..].iter().map(|cell| cell.to_string()));
            } else {
                table.push_row(cells);
            }
        }
        Ok(())
    }
}

impl Serializer for PipeDialect {
    fn serialize(&self, model: &StructuredModel, output: &mut dyn Write) -> std::io::Result<()> {
        for (index, table) in model.tables.iter().enumerate() {
            if index > 0 {
                writeln!(output)?;
            }
            writeln!(output, "*** {} ***", table.header)?;
            for row in &table.rows {
                let (head, tail) = row.split_at(row.len().min(CELLS_PER_LINE));
                writeln!(output, "{}", head.join(" | "))?;
                for chunk in tail.chunks(CELLS_PER_LINE - 1) {
                    writeln!(output, "{CONTINUATION} | {}", chunk.join(" | "))?;
                }
            }
        }
        Ok(())
    }
}

pub fn dialect() -> Rc<PipeDialect> {
    Rc::new(PipeDialect)
}

pub fn suite(source: &str, test_name: &str) -> StructuredModel {
    let mut model = StructuredModel::file(source);
    model
        .table_mut("Settings")
        .push_row(["Library", "OperatingSystem"]);
    model
        .table_mut("Test Cases")
        .push_row([test_name, "Log", "hello"]);
    model
}

/// Host side datafile recording what the editor did to it.
pub struct FakeDatafile {
    model: RefCell<ModelHandle>,
    directory: PathBuf,
    pub dirty_marks: Cell<usize>,
    pub updates: Cell<usize>,
    pub read_only: Cell<bool>,
}

impl FakeDatafile {
    pub fn new(model: StructuredModel) -> Rc<Self> {
        let directory = if model.kind.is_directory() {
            model.source.clone()
        } else {
            model.source.parent().map(PathBuf::from).unwrap_or_default()
        };
        Rc::new(Self {
            model: RefCell::new(Rc::new(model)),
            directory,
            dirty_marks: Cell::new(0),
            updates: Cell::new(0),
            read_only: Cell::new(false),
        })
    }

    pub fn model(&self) -> ModelHandle {
        self.model.borrow().clone()
    }
}

impl DatafileController for FakeDatafile {
    fn datafile(&self) -> ModelHandle {
        self.model()
    }

    fn source(&self) -> PathBuf {
        let model = self.model.borrow();
        model
            .kind
            .init_file()
            .map(PathBuf::from)
            .unwrap_or_else(|| model.source.clone())
    }

    fn directory(&self) -> PathBuf {
        self.directory.clone()
    }

    fn set_datafile(&self, model: StructuredModel) -> Result<(), EditorError> {
        if self.read_only.get() {
            return Err(EditorError::Apply("datafile is read-only".into()));
        }
        self.updates.set(self.updates.get() + 1);
        *self.model.borrow_mut() = Rc::new(model);
        Ok(())
    }

    fn mark_dirty(&self) {
        self.dirty_marks.set(self.dirty_marks.get() + 1);
    }
}

/// Text widget sharing its buffer with the test.
pub struct SharedSurface(Rc<RefCell<String>>);

impl TextSurface for SharedSurface {
    fn set_text(&mut self, text: &str) {
        *self.0.borrow_mut() = text.to_owned();
    }

    fn text(&self) -> String {
        self.0.borrow().clone()
    }
}

#[derive(Default)]
pub struct FakeHost {
    buffer: Rc<RefCell<String>>,
    pub selected: Option<Rc<dyn DatafileController>>,
    pub current_page: Option<String>,
    pub answers: VecDeque<bool>,
    pub prompts: Vec<(String, String)>,
    pub errors: Vec<(String, String)>,
    pub refreshes: usize,
    pub actions: Vec<ActionInfo>,
    pub subscriptions: Vec<(SubscriptionId, MessageKind)>,
    pub surfaces_created: usize,
    next_subscription: u64,
}

impl FakeHost {
    pub fn with_selection(datafile: &Rc<FakeDatafile>) -> Self {
        Self {
            selected: Some(datafile.clone()),
            ..Self::default()
        }
    }

    pub fn select(&mut self, datafile: &Rc<FakeDatafile>) {
        self.selected = Some(datafile.clone());
    }

    pub fn text(&self) -> String {
        self.buffer.borrow().clone()
    }

    /// Replace the editor text as if the user typed it.
    pub fn type_text(&self, text: &str) {
        *self.buffer.borrow_mut() = text.to_owned();
    }
}

impl Host for FakeHost {
    type Surface = SharedSurface;

    fn create_surface(&mut self, _title: &str) -> SharedSurface {
        self.surfaces_created += 1;
        SharedSurface(self.buffer.clone())
    }

    fn selected_datafile(&self) -> Option<Rc<dyn DatafileController>> {
        self.selected.clone()
    }

    fn refresh_current_datafile(&mut self) {
        self.refreshes += 1;
    }

    fn current_page_title(&self) -> Option<String> {
        self.current_page.clone()
    }

    fn show_tab(&mut self, title: &str) {
        self.current_page = Some(title.to_owned());
    }

    fn register_action(&mut self, action: ActionInfo) {
        self.actions.push(action);
    }

    fn unregister_actions(&mut self) {
        self.actions.clear();
    }

    fn subscribe(&mut self, kind: MessageKind) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscriptions.push((id, kind));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscriptions.retain(|(existing, _)| *existing != id);
    }

    fn ask_yes_no(&mut self, title: &str, message: &str) -> bool {
        self.prompts.push((title.to_owned(), message.to_owned()));
        self.answers.pop_front().expect("unexpected prompt")
    }

    fn show_error(&mut self, title: &str, message: &str) {
        self.errors.push((title.to_owned(), message.to_owned()));
    }
}
