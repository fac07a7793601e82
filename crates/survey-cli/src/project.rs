//! Project files: a survey record stored as JSON on disk.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use survey_core::{deserialize, serialize, SurveyProject, SurveyRecord};

/// A project loaded from disk, remembered with its path so it can be saved
/// back in place.
#[derive(Debug)]
pub struct OpenProject {
    pub path: PathBuf,
    pub project: SurveyProject,
    /// When the file was last written; `None` for a project not saved yet
    pub saved_at: Option<DateTime<Utc>>,
}

impl OpenProject {
    pub fn new(path: impl Into<PathBuf>, project: SurveyProject) -> Self {
        Self {
            path: path.into(),
            project,
            saved_at: None,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read project {}", path.display()))?;
        let record: SurveyRecord = serde_json::from_str(&text)
            .with_context(|| format!("{} is not a survey project", path.display()))?;
        let saved_at = record.saved_at;
        let report = deserialize(record)
            .with_context(|| format!("failed to restore project {}", path.display()))?;

        for err in &report.rejected {
            tracing::warn!(project = %path.display(), error = %err, "skipped cell");
        }
        if !report.rejected.is_empty() {
            eprintln!(
                "warning: {} malformed cell(s) dropped while loading {}",
                report.rejected.len(),
                path.display()
            );
        }

        Ok(Self {
            path: path.to_path_buf(),
            project: report.project,
            saved_at: Some(saved_at),
        })
    }

    pub fn save(&mut self, pretty: bool) -> Result<()> {
        let record = serialize(&self.project);
        write_json(&self.path, &record, pretty)?;
        tracing::info!(
            project = %self.path.display(),
            cells = record.cells.len(),
            "project saved"
        );
        self.saved_at = Some(record.saved_at);
        Ok(())
    }
}

pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let text = to_json(value, pretty)?;
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}
