//! CSV-backed ledger storage.
//!
//! A ledger is replaced wholesale on every persist: rows are written to a
//! sibling temp file which is then renamed over the live path. The rename
//! is the synchronization contract between workers — the alarm worker may
//! read the session ledger at any moment, and it must see either the
//! previous complete file or the new complete file, never a partial write.
//! Both files live in the same directory so the rename stays atomic.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::pipeline::SyncError;

#[derive(Debug, Clone)]
pub struct CsvLedger {
    path: PathBuf,
}

impl CsvLedger {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every row, or an empty vec when the ledger has not been created
    /// yet. A row that no longer parses means the stored file is damaged,
    /// which is a persistence fault, not fetchable data.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Vec<T>, SyncError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .map_err(|e| SyncError::Persist(format!("open {}: {e}", self.path.display())))?;

        let mut reader = csv::Reader::from_reader(file);
        reader
            .deserialize()
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| SyncError::Persist(format!("read {}: {e}", self.path.display())))
    }

    /// Atomically replace the ledger with `rows`.
    pub fn replace<T: Serialize>(&self, rows: &[T]) -> Result<(), SyncError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    SyncError::Persist(format!("create {}: {e}", parent.display()))
                })?;
            }
        }

        let tmp_path = self.tmp_path();
        let mut writer = csv::Writer::from_path(&tmp_path)
            .map_err(|e| SyncError::Persist(format!("create {}: {e}", tmp_path.display())))?;

        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| SyncError::Persist(format!("write {}: {e}", tmp_path.display())))?;
        }
        writer
            .flush()
            .map_err(|e| SyncError::Persist(format!("flush {}: {e}", tmp_path.display())))?;
        drop(writer);

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            SyncError::Persist(format!(
                "rename {} -> {}: {e}",
                tmp_path.display(),
                self.path.display()
            ))
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
