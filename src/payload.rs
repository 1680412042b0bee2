use crate::config::{Activity, EditorKind, Language, Mode};
use crate::time_series::SeriesPoint;
use chrono::Local;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Mode-specific configuration echoed back to the persistence collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet_count: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub duration_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wpm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_wpm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_completed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_per_minute: Option<f64>,
}

/// The plain data payload handed to the persistence collaborator when a
/// session ends. The engine's only contract is "save this and tell me
/// success or failure"; retries and transport belong to the collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPayload {
    pub activity: Activity,
    pub language: Language,
    pub mode: Mode,
    pub editor: EditorKind,
    pub config: RunConfig,
    pub result: RunResult,
    pub series: Vec<SeriesPoint>,
}

pub trait RunSink {
    fn save(&self, payload: &RunPayload) -> io::Result<()>;
}

/// Reference sink: appends one JSON line per finished run to a local log,
/// stamped with the local save time.
#[derive(Debug, Clone)]
pub struct JsonlRunSink {
    path: PathBuf,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedRun<'a> {
    saved_at: String,
    #[serde(flatten)]
    payload: &'a RunPayload,
}

impl JsonlRunSink {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "typerun") {
            pd.data_local_dir().join("runs.jsonl")
        } else {
            PathBuf::from("typerun_runs.jsonl")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl RunSink for JsonlRunSink {
    fn save(&self, payload: &RunPayload) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let record = SavedRun {
            saved_at: Local::now().to_rfc3339(),
            payload,
        };
        let line = serde_json::to_string(&record)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}
