//! New command implementation

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use sw_core::{CoreError, MigrationSet, Revision};

use crate::cli::{GlobalArgs, NewArgs};
use crate::commands::common::{display_path, load_project};

/// Execute the new command
pub(crate) fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let dir = project.config.migrations_path_absolute(&project.root);

    let path = create_migration(&dir, &args.description, Utc::now())?;
    println!("Created {}", display_path(&project.root, &path));
    Ok(())
}

/// Write an empty migration named after `now` and `description`.
///
/// Refuses to overwrite an existing file, and refuses a revision that would
/// not sort after every migration already in `dir`.
pub(crate) fn create_migration(
    dir: &Path,
    description: &str,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    let slug = slugify(description);
    if slug.is_empty() {
        bail!("Description '{description}' has no letters or digits to name the file with");
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create migrations directory {}", dir.display()))?;

    let revision = Revision::from_datetime(now)?;
    let existing = MigrationSet::discover(dir)?;
    if let Some(latest) = existing.latest() {
        if revision <= latest {
            return Err(CoreError::RevisionNotNewer {
                revision: revision.to_string(),
                latest: latest.to_string(),
            }
            .into());
        }
    }

    let path = dir.join(format!("{revision}_{slug}.sql"));
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(CoreError::MigrationExists {
                path: path.display().to_string(),
            }
            .into());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to create {}", path.display()));
        }
    };

    let header = format!("-- {description}\n-- Created {}\n\n", now.to_rfc2822());
    file.write_all(header.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    log::info!("Created migration {}", path.display());
    Ok(path)
}

/// Lowercase ASCII letters and digits joined by single underscores.
pub(crate) fn slugify(description: &str) -> String {
    let mut slug = String::with_capacity(description.len());
    for c in description.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_end_matches('_').to_string()
}

#[cfg(test)]
#[path = "new_test.rs"]
mod tests;
