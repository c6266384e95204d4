//! Crash-safe snapshot cache
//!
//! Holds at most one snapshot, in a single JSON file.
//!
//! # Crash Safety
//!
//! Saving follows the write-fsync-rename pattern:
//! 1. Write to a temporary file next to the target (`.<name>.tmp`)
//! 2. fsync the temporary file
//! 3. Atomic rename over the target
//! 4. fsync the parent directory
//!
//! A crash at any point leaves either the previous snapshot or the new one
//! in place, never a partial file. Leftover temporary files are removed when
//! the cache is opened.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use roster_core::{Dataset, Snapshot};
use tracing::{debug, info, warn};

use crate::error::{CacheError, CacheResult};
use crate::format::{SnapshotFile, SnapshotFileRef, SNAPSHOT_FORMAT_VERSION};

/// Persists the last successfully fetched snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    /// Open the cache at `path` and clear leftovers of interrupted saves.
    ///
    /// The file itself does not need to exist yet.
    pub fn open(path: impl Into<PathBuf>) -> CacheResult<Self> {
        let cache = SnapshotCache { path: path.into() };
        let removed = cache.cleanup_temp_files()?;
        if removed > 0 {
            warn!(
                target: "roster::cache",
                path = %cache.path.display(),
                removed,
                "Removed temporary files from an interrupted save"
            );
        }
        Ok(cache)
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "snapshot".to_string());
        self.path.with_file_name(format!(".{}.tmp", name))
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Read the persisted snapshot.
    ///
    /// Returns `Ok(None)` when no snapshot has been saved yet.
    pub fn load(&self) -> CacheResult<Option<Snapshot>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(target: "roster::cache", path = %self.path.display(), "No cached snapshot");
                return Ok(None);
            }
            Err(e) => return Err(CacheError::io(&self.path, e)),
        };

        let file: SnapshotFile =
            serde_json::from_slice(&bytes).map_err(|e| CacheError::corrupt(&self.path, e))?;

        if let Some(version) = file.format_version {
            if version != SNAPSHOT_FORMAT_VERSION {
                return Err(CacheError::corrupt(
                    &self.path,
                    format!(
                        "unsupported format version {} (expected {})",
                        version, SNAPSHOT_FORMAT_VERSION
                    ),
                ));
            }
        }

        let dataset = Dataset::new(file.rows).map_err(|e| CacheError::corrupt(&self.path, e))?;
        info!(
            target: "roster::cache",
            path = %self.path.display(),
            records = dataset.len(),
            fetched_at = %file.fetched_at,
            "Loaded cached snapshot"
        );
        Ok(Some(Snapshot::new(file.fetched_at, dataset)))
    }

    /// Persist `snapshot`, replacing any previous one.
    pub fn save(&self, snapshot: &Snapshot) -> CacheResult<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(&dir).map_err(|e| CacheError::io(&dir, e))?;

        let temp_path = self.temp_path();
        let body = SnapshotFileRef {
            format_version: SNAPSHOT_FORMAT_VERSION,
            fetched_at: snapshot.fetched_at,
            rows: snapshot.dataset.records(),
        };

        // Step 1: Write to temporary file
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| CacheError::io(&temp_path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &body)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;
        writer.flush().map_err(|e| CacheError::io(&temp_path, e))?;
        let file = writer
            .into_inner()
            .map_err(|e| CacheError::io(&temp_path, e.into_error()))?;

        // Step 2: fsync the file
        file.sync_all().map_err(|e| CacheError::io(&temp_path, e))?;
        drop(file);

        // Step 3: Atomic rename
        fs::rename(&temp_path, &self.path).map_err(|e| CacheError::io(&self.path, e))?;

        // Step 4: fsync parent directory
        #[cfg(unix)]
        {
            let handle = File::open(&dir).map_err(|e| CacheError::io(&dir, e))?;
            handle.sync_all().map_err(|e| CacheError::io(&dir, e))?;
        }

        info!(
            target: "roster::cache",
            path = %self.path.display(),
            records = snapshot.dataset.len(),
            "Saved snapshot"
        );
        Ok(())
    }

    /// Remove temporary files left behind by interrupted saves.
    pub fn cleanup_temp_files(&self) -> CacheResult<usize> {
        let temp_path = self.temp_path();
        match fs::remove_file(&temp_path) {
            Ok(()) => Ok(1),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(CacheError::io(&temp_path, e)),
        }
    }

    /// Check if a temporary file exists
    pub fn temp_file_exists(&self) -> bool {
        self.temp_path().exists()
    }
}
