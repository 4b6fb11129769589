//! Status command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use sw_core::{Migration, Revision};

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::{display_path, format_age, load_project, Project};

/// Whether a migration is at or below the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum MigrationState {
    Applied,
    Pending,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct MigrationStatus {
    pub revision: Revision,
    pub name: String,
    pub state: MigrationState,
    pub manual: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LockStatus {
    pub path: String,
    pub acquired_at: Option<String>,
    pub age_secs: u64,
    pub stale: bool,
}

/// Snapshot of the project's migration state. Computing it takes no lock
/// and writes nothing.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct StatusReport {
    /// Recorded cursor, or the seed a first run would record
    pub cursor: Option<Revision>,
    pub needs_seed: bool,
    pub lock: Option<LockStatus>,
    pub migrations: Vec<MigrationStatus>,
}

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let report = collect(&project)?;

    match args.output {
        StatusOutput::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        StatusOutput::Table => print_table(&report),
    }
    Ok(())
}

pub(crate) fn collect(project: &Project) -> Result<StatusReport> {
    let plan = project
        .migrator()
        .plan()
        .context("Failed to read migration state")?;

    let run_lock = project.lock();
    let lock = run_lock.inspect()?.map(|info| LockStatus {
        path: display_path(&project.root, run_lock.path()),
        acquired_at: info.acquired_at.map(|ts| ts.to_rfc2822()),
        age_secs: info.age.as_secs(),
        stale: project
            .config
            .stale_lock_after()
            .is_some_and(|threshold| info.age >= threshold),
    });

    let migrations = plan
        .migrations
        .iter()
        .map(|m| -> Result<MigrationStatus> {
            let applied = plan.cursor.is_some_and(|cursor| m.revision <= cursor);
            Ok(MigrationStatus {
                revision: m.revision,
                name: m.name.clone(),
                state: if applied {
                    MigrationState::Applied
                } else {
                    MigrationState::Pending
                },
                manual: Migration::is_manual(&m.read_sql()?),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(StatusReport {
        cursor: plan.cursor,
        needs_seed: plan.needs_seed,
        lock,
        migrations,
    })
}

fn print_table(report: &StatusReport) {
    match (report.cursor, report.needs_seed) {
        (Some(seed), true) => println!("Cursor: not recorded (a run would seed it to {seed})"),
        (Some(cursor), false) => println!("Cursor: {cursor}"),
        (None, _) => println!("Cursor: not recorded"),
    }

    match &report.lock {
        None => println!("Lock:   free"),
        Some(lock) => println!(
            "Lock:   {} held for {}{}",
            lock.path,
            format_age(std::time::Duration::from_secs(lock.age_secs)),
            if lock.stale { " (stale)" } else { "" }
        ),
    }
    println!();

    if report.migrations.is_empty() {
        println!("No migrations found.");
        return;
    }

    println!("{:<16} {:<8} {:<7} NAME", "REVISION", "STATE", "MANUAL");
    println!("{}", "-".repeat(48));
    for m in &report.migrations {
        let state = match m.state {
            MigrationState::Applied => "applied",
            MigrationState::Pending => "pending",
        };
        let manual = if m.manual { "yes" } else { "" };
        println!(
            "{:<16} {:<8} {:<7} {}",
            m.revision.to_string(),
            state,
            manual,
            m.name
        );
    }

    let pending = report
        .migrations
        .iter()
        .filter(|m| m.state == MigrationState::Pending)
        .count();
    println!();
    println!("{} migration(s), {pending} pending", report.migrations.len());
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
