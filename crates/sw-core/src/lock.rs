//! Run lock preventing two runner instances from executing at once
//!
//! The lock is a marker file created with `create_new`, so only one process
//! can win the race. Its content is an RFC 2822 timestamp, the holder's pid
//! and a token unique to the acquisition; the timestamp is what staleness is
//! measured from and the token is what release checks before deleting.
//!
//! Every change to the marker (create, stale takeover, release, forced
//! clear) happens while holding an OS advisory lock on a sidecar
//! `<marker>.guard` file. The sidecar is never deleted, and the OS drops the
//! advisory lock when its holder exits.

use chrono::{DateTime, Utc};
use fd_lock::RwLock;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Marker-file lock with optional stale-lock recovery.
#[derive(Debug, Clone)]
pub struct RunLock {
    path: PathBuf,
    stale_after: Option<Duration>,
}

/// What an existing lock marker says about its holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockInfo {
    /// Timestamp recorded by the holder, if it could be parsed
    pub acquired_at: Option<DateTime<Utc>>,

    /// How long the lock has been held
    pub age: Duration,
}

/// Held lock. The marker is removed on [`release`](Self::release) or, failing
/// that, when the guard is dropped. A marker that now carries another
/// holder's token is left in place.
#[derive(Debug)]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard {
    path: PathBuf,
    token: String,
    released: bool,
}

impl RunLock {
    /// A lock at `path` that never treats an existing marker as stale.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stale_after: None,
        }
    }

    /// Treat markers older than `threshold` as abandoned.
    pub fn with_stale_after(mut self, threshold: Option<Duration>) -> Self {
        self.stale_after = threshold;
        self
    }

    /// Path of the marker file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Try to take the lock.
    ///
    /// Returns `Ok(None)` when another run holds it. With a staleness
    /// threshold configured, an abandoned marker is replaced by a fresh one
    /// in the same critical section that judged it stale.
    pub fn try_acquire(&self) -> CoreResult<Option<LockGuard>> {
        with_marker_guard(&self.path, || {
            if let Some(guard) = self.create_marker()? {
                return Ok(Some(guard));
            }

            let Some(threshold) = self.stale_after else {
                return Ok(None);
            };
            let Some(info) = self.inspect()? else {
                // Holder released between our attempt and the inspection.
                return self.create_marker();
            };
            if info.age < threshold {
                return Ok(None);
            }

            log::warn!(
                "Removing stale lock {} (held for {}s, threshold {}s)",
                self.path.display(),
                info.age.as_secs(),
                threshold.as_secs()
            );
            remove_if_present(&self.path)?;
            self.create_marker()
        })
    }

    /// Describe the current marker, or `None` when no run holds the lock.
    pub fn inspect(&self) -> CoreResult<Option<LockInfo>> {
        let Some(content) = read_marker(&self.path)? else {
            return Ok(None);
        };

        let acquired_at = content
            .lines()
            .next()
            .and_then(|line| DateTime::parse_from_rfc2822(line.trim()).ok())
            .map(|ts| ts.with_timezone(&Utc));

        let age = match acquired_at {
            Some(ts) => (Utc::now() - ts).to_std().unwrap_or(Duration::ZERO),
            None => {
                // Unreadable timestamp; fall back to the file's mtime.
                let modified = fs::metadata(&self.path)
                    .and_then(|m| m.modified())
                    .map_err(|e| CoreError::io(&self.path, e))?;
                SystemTime::now()
                    .duration_since(modified)
                    .unwrap_or(Duration::ZERO)
            }
        };

        Ok(Some(LockInfo { acquired_at, age }))
    }

    /// Remove the marker regardless of who holds it.
    ///
    /// Returns whether a marker was present.
    pub fn force_clear(&self) -> CoreResult<bool> {
        with_marker_guard(&self.path, || remove_if_present(&self.path))
    }

    /// Must be called with the marker guard held.
    fn create_marker(&self) -> CoreResult<Option<LockGuard>> {
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(None),
            Err(e) => return Err(CoreError::io(&self.path, e)),
        };

        let token = Uuid::new_v4().to_string();
        let stamp = format!(
            "{}\npid {}\ntoken {token}\n",
            Utc::now().to_rfc2822(),
            std::process::id()
        );
        if let Err(e) = file.write_all(stamp.as_bytes()).and_then(|_| file.sync_all()) {
            // No guard exists yet, so clean up here rather than in Drop.
            drop(file);
            let _ = fs::remove_file(&self.path);
            return Err(CoreError::io(&self.path, e));
        }

        log::debug!("Acquired run lock {}", self.path.display());
        Ok(Some(LockGuard {
            path: self.path.clone(),
            token,
            released: false,
        }))
    }
}

impl LockGuard {
    /// Path of the marker this guard owns.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the marker, reporting any failure.
    pub fn release(mut self) -> CoreResult<()> {
        self.released = true;
        self.remove_own_marker()
    }

    fn remove_own_marker(&self) -> CoreResult<()> {
        with_marker_guard(&self.path, || {
            let Some(content) = read_marker(&self.path)? else {
                return Ok(());
            };
            let ours = content
                .lines()
                .any(|line| line.strip_prefix("token ") == Some(self.token.as_str()));
            if !ours {
                log::warn!(
                    "Run lock {} was taken over by another run; leaving it in place",
                    self.path.display()
                );
                return Ok(());
            }

            remove_if_present(&self.path)?;
            log::debug!("Released run lock {}", self.path.display());
            Ok(())
        })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.remove_own_marker() {
            log::warn!("Failed to release run lock: {e}");
        }
    }
}

/// Run `f` while holding the exclusive advisory lock on the marker's sidecar.
///
/// Not reentrant: `f` must not call back into anything that takes it.
fn with_marker_guard<T>(marker: &Path, f: impl FnOnce() -> CoreResult<T>) -> CoreResult<T> {
    if let Some(parent) = marker.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
    }

    let mut sidecar = marker.as_os_str().to_owned();
    sidecar.push(".guard");
    let sidecar = PathBuf::from(sidecar);

    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&sidecar)
        .map_err(|e| CoreError::io(&sidecar, e))?;
    let mut lock = RwLock::new(file);
    let _held = lock.write().map_err(|e| CoreError::io(&sidecar, e))?;
    f()
}

fn read_marker(path: &Path) -> CoreResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CoreError::io(path, e)),
    }
}

fn remove_if_present(path: &Path) -> CoreResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CoreError::io(path, e)),
    }
}

#[cfg(test)]
#[path = "lock_test.rs"]
mod tests;
