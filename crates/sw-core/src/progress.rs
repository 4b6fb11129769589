//! Persisted progress cursor
//!
//! The cursor is a small text file whose whole content is the decimal
//! revision of the newest migration known to be fully applied. It is
//! rewritten after every successful migration, so a run that dies part-way
//! resumes from the last completed file.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::migration::MigrationSet;
use crate::revision::Revision;

/// File-backed store for the "last applied revision" cursor.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    /// Create a store backed by `path`. Nothing is touched until read/write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the recorded revision.
    ///
    /// A missing or blank file means no cursor has been recorded yet. Any
    /// other content that is not a revision is reported as corruption.
    pub fn read(&self) -> CoreResult<Option<Revision>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CoreError::io(&self.path, e)),
        };

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse()
            .map(Some)
            .map_err(|_| CoreError::ProgressCorrupt {
                path: self.path.display().to_string(),
                content: trimmed.to_string(),
            })
    }

    /// Durably replace the cursor with `revision`.
    ///
    /// Uses write-to-temp, fsync, then rename so a crash leaves either the
    /// old or the new value, never a torn file.
    pub fn write(&self, revision: Revision) -> CoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
        }

        let temp_path = self.temp_path();
        {
            let mut file = File::create(&temp_path).map_err(|e| CoreError::io(&temp_path, e))?;
            file.write_all(revision.to_string().as_bytes())
                .and_then(|_| file.sync_all())
                .map_err(|e| CoreError::io(&temp_path, e))?;
        }
        fs::rename(&temp_path, &self.path).map_err(|e| CoreError::io(&self.path, e))?;
        sync_parent_dir(&self.path);

        log::debug!("Recorded revision {} in {}", revision, self.path.display());
        Ok(())
    }

    /// Return the cursor, seeding it on first use.
    ///
    /// A fresh install is assumed to already be at the newest schema, so an
    /// absent cursor is initialised to the latest discovered revision and
    /// historical migrations are never replayed. With no migrations at all
    /// nothing is written.
    pub fn read_or_seed(&self, set: &MigrationSet) -> CoreResult<Option<Revision>> {
        if let Some(current) = self.read()? {
            return Ok(Some(current));
        }
        let Some(latest) = set.latest() else {
            return Ok(None);
        };
        log::info!(
            "No recorded revision in {}; seeding with latest migration {}",
            self.path.display(),
            latest
        );
        self.write(latest)?;
        Ok(Some(latest))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Flush the directory entry for a rename. Best effort: not every platform
/// allows opening a directory for sync.
fn sync_parent_dir(path: &Path) {
    if !cfg!(unix) {
        return;
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = File::open(parent).and_then(|dir| dir.sync_all()) {
            log::debug!("Could not sync directory {}: {}", parent.display(), e);
        }
    }
}

#[cfg(test)]
#[path = "progress_test.rs"]
mod tests;
