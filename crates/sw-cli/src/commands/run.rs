//! Run command implementation

use anyhow::{Context, Result};
use sw_core::Migration;
use sw_runner::{Plan, RunReport};

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common::{load_project, ExitCode};

/// Execute the run command
pub(crate) fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let migrator = project.migrator();

    if args.dry_run {
        let plan = migrator.plan().context("Failed to plan migrations")?;
        for line in dry_run_lines(&plan)? {
            println!("{line}");
        }
        return Ok(());
    }

    let report = migrator
        .run(|| project.connect())
        .context("Migration run aborted")?;
    for line in report_lines(&report) {
        println!("{line}");
    }

    if report.is_failure() {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

/// Human-readable summary of a finished run.
pub(crate) fn report_lines(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();

    let (applied, cursor) = match report {
        RunReport::LockHeld { lock_file } => {
            lines.push(format!(
                "Skipped: another run holds {}",
                lock_file.display()
            ));
            return lines;
        }
        RunReport::Completed {
            applied, cursor, ..
        }
        | RunReport::Failed {
            applied, cursor, ..
        } => (applied, cursor),
    };

    for migration in applied {
        let detail = if migration.manual {
            "manual installation, not executed".to_string()
        } else {
            format!(
                "{} statement(s), {} ms",
                migration.statements, migration.duration_ms
            )
        };
        lines.push(format!(
            "  applied  {}_{}  ({detail})",
            migration.revision, migration.name
        ));
    }

    if let RunReport::Failed { failure, .. } = report {
        let position = match failure.statement {
            0 => "outside its statements".to_string(),
            n => format!("at statement {n}"),
        };
        lines.push(format!(
            "  FAILED   {}_{}  {position}: {}",
            failure.revision, failure.name, failure.message
        ));
    }

    let cursor = cursor.map_or_else(|| "(none)".to_string(), |c| c.to_string());
    let summary = match report {
        RunReport::Failed { .. } => format!(
            "Stopped after {} migration(s); cursor at {cursor}",
            applied.len()
        ),
        _ if applied.is_empty() => format!("Up to date; cursor at {cursor}"),
        _ => format!("Applied {} migration(s); cursor at {cursor}", applied.len()),
    };
    lines.push(summary);
    lines
}

/// What a run would do, without locking, connecting or writing.
pub(crate) fn dry_run_lines(plan: &Plan) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    let pending = plan.pending();

    match plan.cursor {
        None => lines.push("No migrations found and no cursor recorded".to_string()),
        Some(seed) if plan.needs_seed => lines.push(format!(
            "No cursor recorded; a run would seed it to {seed} and apply nothing"
        )),
        Some(cursor) => lines.push(format!("Cursor at {cursor}")),
    }

    if pending.is_empty() {
        lines.push("Nothing to apply".to_string());
        return Ok(lines);
    }

    lines.push(format!("Would apply {} migration(s):", pending.len()));
    for migration in pending {
        let manual = Migration::is_manual(&migration.read_sql()?);
        let suffix = if manual { "  (manual installation)" } else { "" };
        lines.push(format!("  {}{suffix}", migration.file_name()));
    }
    Ok(lines)
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
