//! Summary Journal
//!
//! Append-only JSONL record of completed summaries, one `{"name": "summary"}`
//! object per line. The journal is the checkpoint: reopening it restores the
//! [`SummaryStore`] so an interrupted run resumes where it stopped, and each
//! record is synced to disk before the next function starts.

use serde_json::{Map, Value};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::SummaryStore;
use crate::types::{FuncsumError, Result};

pub struct SummaryJournal {
    path: PathBuf,
    file: File,
    store: SummaryStore,
}

impl SummaryJournal {
    /// Open or create the journal at `path`, loading any existing records
    ///
    /// A malformed final line, including one cut inside a multi-byte
    /// character, is treated as a torn write: it is dropped with a warning
    /// and truncated from the file. A malformed line anywhere else is an
    /// error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let existing = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let (store, valid_len) = parse_records(&path, &existing)?;

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        if valid_len < existing.len() {
            tracing::warn!(
                "Dropping incomplete final record in {} ({} bytes)",
                path.display(),
                existing.len() - valid_len
            );
            file.set_len(valid_len as u64)?;
        }

        if valid_len > 0 && !existing[..valid_len].ends_with(b"\n") {
            file.write_all(b"\n")?;
            file.sync_data()?;
        }

        if !store.is_empty() {
            tracing::info!(
                "Resuming from {}: {} summaries already recorded",
                path.display(),
                store.len()
            );
        }

        Ok(Self { path, file, store })
    }

    /// Append one summary and sync it to disk
    ///
    /// Returns `false` without writing when `name` is already recorded.
    pub fn record(&mut self, name: &str, summary: &str) -> Result<bool> {
        if self.store.contains(name) {
            tracing::debug!("Summary for {} already recorded, skipping write", name);
            return Ok(false);
        }

        let mut entry = Map::new();
        entry.insert(name.to_string(), Value::String(summary.to_string()));
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        self.file.sync_data()?;

        self.store.insert(name, summary);
        tracing::debug!("Recorded summary for {} ({} total)", name, self.store.len());
        Ok(true)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.contains(name)
    }

    pub fn store(&self) -> &SummaryStore {
        &self.store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse journal content into a store
///
/// Returns the store and the byte length of the content that is kept.
fn parse_records(path: &Path, content: &[u8]) -> Result<(SummaryStore, usize)> {
    let mut store = SummaryStore::new();

    let lines: Vec<(usize, &[u8])> = content
        .split_inclusive(|b| *b == b'\n')
        .scan(0usize, |offset, raw| {
            let start = *offset;
            *offset += raw.len();
            Some((start, raw))
        })
        .collect();

    let last_record = lines
        .iter()
        .rposition(|(_, raw)| !raw.trim_ascii().is_empty());

    for (idx, (start, raw)) in lines.iter().enumerate() {
        let raw = raw.trim_ascii();
        if raw.is_empty() {
            continue;
        }

        match parse_line(raw) {
            Ok(entries) => {
                for (name, summary) in entries {
                    if !store.insert(name.clone(), summary) {
                        tracing::warn!(
                            "Duplicate summary for {} at {}:{}; keeping the first",
                            name,
                            path.display(),
                            idx + 1
                        );
                    }
                }
            }
            Err(_) if Some(idx) == last_record => return Ok((store, *start)),
            Err(message) => {
                return Err(FuncsumError::Journal {
                    path: path.display().to_string(),
                    line: idx + 1,
                    message,
                });
            }
        }
    }

    Ok((store, content.len()))
}

fn parse_line(raw: &[u8]) -> std::result::Result<Vec<(String, String)>, String> {
    let line = std::str::from_utf8(raw).map_err(|e| e.to_string())?;
    let object: Map<String, Value> = serde_json::from_str(line).map_err(|e| e.to_string())?;

    object
        .into_iter()
        .map(|(name, value)| match value {
            Value::String(summary) => Ok((name, summary)),
            other => Err(format!("summary for {} is not a string: {}", name, other)),
        })
        .collect()
}
