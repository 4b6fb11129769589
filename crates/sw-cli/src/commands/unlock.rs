//! Unlock command implementation

use anyhow::Result;
use std::time::Duration;
use sw_core::RunLock;

use crate::cli::{GlobalArgs, UnlockArgs};
use crate::commands::common::{display_path, format_age, load_project};

/// What the unlock command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UnlockOutcome {
    /// There was no marker
    NotHeld,

    /// The marker is younger than `--if-older-than`
    Kept { age: Duration },

    /// The marker was removed
    Removed { age: Duration },
}

/// Execute the unlock command
pub(crate) fn execute(args: &UnlockArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let lock = project.lock();
    let shown = display_path(&project.root, lock.path());

    match unlock(&lock, args.if_older_than.map(Duration::from_secs))? {
        UnlockOutcome::NotHeld => println!("No lock held at {shown}"),
        UnlockOutcome::Kept { age } => println!(
            "Lock {shown} is only {} old; left in place",
            format_age(age)
        ),
        UnlockOutcome::Removed { age } => {
            println!("Removed lock {shown} (held for {})", format_age(age))
        }
    }
    Ok(())
}

/// Remove the marker, unless it is younger than `min_age`.
pub(crate) fn unlock(lock: &RunLock, min_age: Option<Duration>) -> Result<UnlockOutcome> {
    let Some(info) = lock.inspect()? else {
        return Ok(UnlockOutcome::NotHeld);
    };

    if let Some(min_age) = min_age {
        if info.age < min_age {
            return Ok(UnlockOutcome::Kept { age: info.age });
        }
    }

    if !lock.force_clear()? {
        // Released by its holder after we looked.
        return Ok(UnlockOutcome::NotHeld);
    }
    log::warn!(
        "Removed lock {} held since {}",
        lock.path().display(),
        info.acquired_at
            .map_or_else(|| "an unknown time".to_string(), |ts| ts.to_rfc2822())
    );
    Ok(UnlockOutcome::Removed { age: info.age })
}

#[cfg(test)]
#[path = "unlock_test.rs"]
mod tests;
