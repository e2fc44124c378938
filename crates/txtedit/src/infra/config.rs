//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::app::adapter::Continuation;

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".txtedit/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub editor: Editor,
    #[serde(default)]
    pub prompt: Prompt,
    #[serde(default)]
    pub action: Action,
    #[serde(default)]
    pub logging: Logging,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Editor {
    /// Page title of the editor, also used to tell whether it has focus.
    #[serde(default = "Editor::default_title")]
    pub title: String,
    /// Token that on its own line only continues the previous row.
    #[serde(default = "Editor::default_continuation_marker")]
    pub continuation_marker: String,
    /// Also leave `marker <cells>` lines out of the sanity check line count.
    #[serde(default)]
    pub skip_continued_rows: bool,
}

impl Editor {
    fn default_title() -> String {
        "Txt Edit".into()
    }

    fn default_continuation_marker() -> String {
        "...".into()
    }

    pub fn continuation(&self) -> Continuation {
        Continuation {
            marker: self.continuation_marker.clone(),
            skip_continued_rows: self.skip_continued_rows,
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            continuation_marker: Self::default_continuation_marker(),
            skip_continued_rows: false,
        }
    }
}

/// Question asked before edits are applied on navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    #[serde(default = "Prompt::default_title")]
    pub title: String,
    #[serde(default = "Prompt::default_message")]
    pub message: String,
}

impl Prompt {
    fn default_title() -> String {
        "Source changed".into()
    }

    fn default_message() -> String {
        "Apply changes?".into()
    }
}

impl Default for Prompt {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            message: Self::default_message(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default = "Action::default_menu")]
    pub menu: String,
    #[serde(default = "Action::default_name")]
    pub name: String,
    #[serde(default)]
    pub shortcut: Option<String>,
}

impl Action {
    fn default_menu() -> String {
        "Edit".into()
    }

    fn default_name() -> String {
        "Edit Source".into()
    }
}

impl Default for Action {
    fn default() -> Self {
        Self {
            menu: Self::default_menu(),
            name: Self::default_name(),
            shortcut: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logging {
    #[serde(default = "Logging::default_filter")]
    pub filter: String,
}

impl Logging {
    fn default_filter() -> String {
        "info".into()
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            filter: Self::default_filter(),
        }
    }
}

/// One config file. Only the keys a file sets are `Some`, so a later layer can set any
/// value, including one equal to the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Layer {
    editor: EditorLayer,
    prompt: PromptLayer,
    action: ActionLayer,
    logging: LoggingLayer,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct EditorLayer {
    title: Option<String>,
    continuation_marker: Option<String>,
    skip_continued_rows: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct PromptLayer {
    title: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ActionLayer {
    menu: Option<String>,
    name: Option<String>,
    shortcut: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct LoggingLayer {
    filter: Option<String>,
}

impl Layer {
    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
    }

    fn from_str(contents: &str) -> Result<Self> {
        let layer: Layer =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(layer)
    }

    /// Values set in `overlay` win over values set in `self`.
    fn merge(self, overlay: Self) -> Self {
        Self {
            editor: EditorLayer {
                title: overlay.editor.title.or(self.editor.title),
                continuation_marker: overlay
                    .editor
                    .continuation_marker
                    .or(self.editor.continuation_marker),
                skip_continued_rows: overlay
                    .editor
                    .skip_continued_rows
                    .or(self.editor.skip_continued_rows),
            },
            prompt: PromptLayer {
                title: overlay.prompt.title.or(self.prompt.title),
                message: overlay.prompt.message.or(self.prompt.message),
            },
            action: ActionLayer {
                menu: overlay.action.menu.or(self.action.menu),
                name: overlay.action.name.or(self.action.name),
                shortcut: overlay.action.shortcut.or(self.action.shortcut),
            },
            logging: LoggingLayer {
                filter: overlay.logging.filter.or(self.logging.filter),
            },
        }
    }

    fn resolve(self) -> Config {
        Config {
            editor: Editor {
                title: self.editor.title.unwrap_or_else(Editor::default_title),
                continuation_marker: self
                    .editor
                    .continuation_marker
                    .unwrap_or_else(Editor::default_continuation_marker),
                skip_continued_rows: self.editor.skip_continued_rows.unwrap_or(false),
            },
            prompt: Prompt {
                title: self.prompt.title.unwrap_or_else(Prompt::default_title),
                message: self.prompt.message.unwrap_or_else(Prompt::default_message),
            },
            action: Action {
                menu: self.action.menu.unwrap_or_else(Action::default_menu),
                name: self.action.name.unwrap_or_else(Action::default_name),
                shortcut: self.action.shortcut,
            },
            logging: Logging {
                filter: self.logging.filter.unwrap_or_else(Logging::default_filter),
            },
        }
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    title: Option<String>,
    continuation_marker: Option<String>,
    log: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            title: env::var("TXTEDIT_TITLE").ok(),
            continuation_marker: env::var("TXTEDIT_CONTINUATION_MARKER").ok(),
            log: env::var("TXTEDIT_LOG").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(title: &str, log: &str) -> Self {
        Self {
            title: Some(title.to_owned()),
            continuation_marker: None,
            log: Some(log.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Layer> = Vec::new();

        layers.push(Layer::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            layers.push(Layer::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            layers.push(Layer::from_file(&workspace_path)?);
        }

        let merged = layers
            .into_iter()
            .reduce(Layer::merge)
            .unwrap_or_default()
            .resolve();
        Ok(apply_env_overrides(merged, env_overrides))
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("txtedit/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(title) = env.title {
        config.editor.title = title;
    }
    if let Some(marker) = env.continuation_marker {
        config.editor.continuation_marker = marker;
    }
    if let Some(log) = env.log {
        config.logging.filter = log;
    }
    config
}
