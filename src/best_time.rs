//! Best completion time, kept in a small JSON file.
//!
//! Every failure here degrades to "no record"; nothing propagates to the game.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::BestTimeError;

const APP_DIR: &str = "mystery-maze";
const FILE_NAME: &str = "best_time.json";

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct BestTimeRecord {
    best_secs: u64,
}

#[derive(Debug, Clone)]
pub struct BestTimeStore {
    path: Option<PathBuf>,
}

impl BestTimeStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// `<data dir>/mystery-maze/best_time.json`, or a store that never
    /// remembers anything when the platform has no data directory.
    pub fn default_location() -> Self {
        Self {
            path: dirs::data_dir().map(|dir| dir.join(APP_DIR).join(FILE_NAME)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load(&self) -> Option<u64> {
        match self.read() {
            Ok(best) => best,
            Err(err) => {
                tracing::warn!(error = %err, "best time unavailable");
                None
            }
        }
    }

    /// Stores `secs` if it beats the current record (or there is none) and
    /// returns the best time to display afterwards.
    pub fn record(&self, secs: u64) -> Option<u64> {
        let current = self.load();
        if current.is_some_and(|best| secs >= best) {
            return current;
        }
        match self.write(secs) {
            Ok(()) => {
                tracing::info!(secs, "new best time");
                Some(secs)
            }
            Err(err) => {
                tracing::warn!(error = %err, "best time not saved");
                current
            }
        }
    }

    fn read(&self) -> Result<Option<u64>, BestTimeError> {
        let path = self.path.as_ref().ok_or(BestTimeError::NoDataDir)?;
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let record: BestTimeRecord = serde_json::from_reader(BufReader::new(file))?;
        Ok(Some(record.best_secs))
    }

    fn write(&self, best_secs: u64) -> Result<(), BestTimeError> {
        let path = self.path.as_ref().ok_or(BestTimeError::NoDataDir)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &BestTimeRecord { best_secs })?;
        Ok(())
    }
}

/// `MM:SS`, or `--:--` when there is nothing to show.
pub fn format_clock(secs: Option<u64>) -> String {
    match secs {
        Some(secs) => format!("{:02}:{:02}", secs / 60, secs % 60),
        None => "--:--".to_string(),
    }
}
