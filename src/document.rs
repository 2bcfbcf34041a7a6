//! Document-store mirror: the whole snapshot as one JSON document in a
//! directory that is typically synced between machines.

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::models::Snapshot;

pub const DOCUMENT_FILE: &str = "workshift.json";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Mirror directory {0} is not available")]
    Unavailable(PathBuf),
    #[error("Mirror I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Mirror document is not valid: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn document_path(&self) -> PathBuf {
        self.dir.join(DOCUMENT_FILE)
    }

    fn ensure_available(&self) -> Result<(), DocumentError> {
        if self.dir.is_dir() {
            Ok(())
        } else {
            Err(DocumentError::Unavailable(self.dir.clone()))
        }
    }

    /// `None` when the directory is reachable but nothing was mirrored yet
    pub fn load(&self) -> Result<Option<Snapshot>, DocumentError> {
        self.ensure_available()?;
        let path = self.document_path();
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        let snapshot = serde_json::from_str(&text)?;
        debug!(path = %path.display(), "loaded snapshot from mirror");
        Ok(Some(snapshot))
    }

    /// Write through a temporary file so a crash never leaves half a document
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), DocumentError> {
        self.ensure_available()?;
        let path = self.document_path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(snapshot)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Remove one shift from the mirrored document, leaving the rest untouched
    pub fn delete_shift(&self, employee_id: &str, date: NaiveDate) -> Result<bool, DocumentError> {
        let Some(mut snapshot) = self.load()? else {
            return Ok(false);
        };
        let removed = snapshot
            .schedules
            .get_mut(employee_id)
            .and_then(|shifts| shifts.remove(&date))
            .is_some();
        if removed {
            self.save(&snapshot)?;
        }
        Ok(removed)
    }
}
