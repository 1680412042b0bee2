use crate::lifecycle::EndPolicy;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What the user is typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Activity {
    Text,
    Coding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Language {
    English,
    Cpp,
    Python,
    Javascript,
    Typescript,
    Rust,
}

/// Termination policy selector for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    Timer,
    Words,
    Snippets,
    Fix,
}

/// Which editing surface feeds the capture driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditorKind {
    Text,
    Vscode,
    Vim,
}

/// Active session settings, read-only from the engine's perspective.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub activity: Activity,
    pub language: Language,
    pub mode: Mode,
    pub editor: EditorKind,
    pub timer_seconds: u64,
    pub word_count: usize,
    pub snippet_count: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            activity: Activity::Text,
            language: Language::English,
            mode: Mode::Timer,
            editor: EditorKind::Text,
            timer_seconds: 30,
            word_count: 25,
            snippet_count: 5,
        }
    }
}

impl Settings {
    /// The termination policy these settings imply.
    pub fn end_policy(&self) -> EndPolicy {
        match self.mode {
            Mode::Timer => EndPolicy::Timer {
                seconds: self.timer_seconds,
            },
            Mode::Words => EndPolicy::WordCount {
                words: self.word_count,
            },
            Mode::Snippets => EndPolicy::SnippetCount {
                snippets: self.snippet_count,
            },
            Mode::Fix => EndPolicy::FixTimer {
                seconds: self.timer_seconds,
            },
        }
    }

    /// Whether switching from `old` to these settings invalidates an
    /// in-progress session (the embedder should reset state and re-request
    /// a target sequence).
    pub fn invalidates(&self, old: &Settings) -> bool {
        self.activity != old.activity
            || self.language != old.language
            || self.mode != old.mode
            || self.editor != old.editor
            || self.timer_seconds != old.timer_seconds
    }
}

pub trait ConfigStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "typerun") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("typerun_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Settings {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(settings) = serde_json::from_slice::<Settings>(&bytes) {
                return settings;
            }
        }
        Settings::default()
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
