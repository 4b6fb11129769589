//! Migration file discovery and ordering
//!
//! Migration files live in a single directory and are named
//! `<YYYYMMDDHHMMSS>_<description>.sql`. The revision is taken from the
//! filename alone; the file body is only read when the migration runs.

use regex::Regex;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{CoreError, CoreResult};
use crate::revision::Revision;

/// Comment that marks a migration as applied out-of-band by an operator.
///
/// The runner advances the cursor past such a file without executing it.
pub const MANUAL_INSTALLATION_MARKER: &str = "-- manual-installation";

fn filename_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<revision>[0-9]{14})_(?P<name>.+)\.sql$").expect("valid regex literal")
    })
}

/// A single migration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Migration {
    /// Revision parsed from the filename prefix
    pub revision: Revision,

    /// Human-readable description following the separator
    pub name: String,

    /// Full path to the `.sql` file
    pub path: PathBuf,
}

impl Migration {
    /// Parse a migration from a filename, returning `None` when the name does
    /// not follow the `<revision>_<description>.sql` convention.
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let caps = filename_pattern().captures(file_name)?;
        let revision = caps.name("revision")?.as_str().parse().ok()?;
        Some(Self {
            revision,
            name: caps.name("name")?.as_str().to_string(),
            path: path.to_path_buf(),
        })
    }

    /// The bare filename, for messages.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Read the SQL body from disk.
    pub fn read_sql(&self) -> CoreResult<String> {
        fs::read_to_string(&self.path).map_err(|e| CoreError::io(&self.path, e))
    }

    /// Whether the body asks to be applied manually.
    pub fn is_manual(sql: &str) -> bool {
        sql.contains(MANUAL_INSTALLATION_MARKER)
    }
}

/// All migrations found in a directory, ordered by revision.
#[derive(Debug, Clone, Default)]
pub struct MigrationSet {
    migrations: BTreeMap<Revision, Migration>,
}

impl MigrationSet {
    /// Scan `dir` for migration files.
    ///
    /// Entries that do not match the naming convention (including
    /// subdirectories) are skipped. Two files with the same revision are
    /// rejected rather than one silently shadowing the other.
    pub fn discover(dir: &Path) -> CoreResult<Self> {
        if !dir.is_dir() {
            return Err(CoreError::MigrationsDirNotFound {
                path: dir.display().to_string(),
            });
        }

        let mut set = Self::default();
        let entries = fs::read_dir(dir).map_err(|e| CoreError::io(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::io(dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match Migration::from_path(&path) {
                Some(migration) => set.insert(migration)?,
                None => log::debug!("Ignoring non-migration file: {}", path.display()),
            }
        }

        log::debug!(
            "Discovered {} migration(s) in {}",
            set.len(),
            dir.display()
        );
        Ok(set)
    }

    /// Add a migration, failing on a revision collision.
    pub fn insert(&mut self, migration: Migration) -> CoreResult<()> {
        match self.migrations.entry(migration.revision) {
            Entry::Vacant(slot) => {
                slot.insert(migration);
                Ok(())
            }
            Entry::Occupied(existing) => {
                // read_dir order is arbitrary; sort the pair so the message is stable.
                let mut names = [existing.get().file_name(), migration.file_name()];
                names.sort();
                let [first, second] = names;
                Err(CoreError::DuplicateRevision {
                    revision: migration.revision.to_string(),
                    first,
                    second,
                })
            }
        }
    }

    /// Number of migrations.
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// True when no migrations were found.
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// The newest revision, if any.
    pub fn latest(&self) -> Option<Revision> {
        self.migrations.keys().next_back().copied()
    }

    /// Look up a migration by revision.
    pub fn get(&self, revision: Revision) -> Option<&Migration> {
        self.migrations.get(&revision)
    }

    /// Iterate in ascending revision order.
    pub fn iter(&self) -> impl Iterator<Item = &Migration> {
        self.migrations.values()
    }

    /// Migrations strictly newer than `cursor`, ascending.
    ///
    /// With no cursor every migration is pending.
    pub fn pending_after(&self, cursor: Option<Revision>) -> Vec<&Migration> {
        match cursor {
            Some(applied) => self
                .migrations
                .range((std::ops::Bound::Excluded(applied), std::ops::Bound::Unbounded))
                .map(|(_, m)| m)
                .collect(),
            None => self.migrations.values().collect(),
        }
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
