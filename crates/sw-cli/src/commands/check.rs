//! Check command implementation
//!
//! Preflight checks run in a fixed order. Each one reports PASS or FAIL with
//! a short detail line; nothing is written and no lock is taken.

use anyhow::{anyhow, bail, Result};
use std::path::Path;
use sw_core::{MigrationSet, ProgressStore};
use sw_db::Database;

use crate::cli::GlobalArgs;
use crate::commands::common::{format_age, load_project, ExitCode, Project};

/// State shared by the checks. Only the config check fills in `project`.
pub(crate) struct Preflight<'a> {
    global: &'a GlobalArgs,
    project: Option<Project>,
}

impl Preflight<'_> {
    fn project(&self) -> Result<&Project> {
        self.project
            .as_ref()
            .ok_or_else(|| anyhow!("configuration did not load"))
    }
}

type CheckFn = fn(&mut Preflight<'_>) -> Result<String>;

/// Every check, in the order it runs.
pub(crate) const CHECKS: &[(&str, CheckFn)] = &[
    ("config", check_config),
    ("migrations", check_migrations),
    ("progress", check_progress),
    ("lock", check_lock),
    ("database", check_database),
];

/// Result of one check.
#[derive(Debug)]
pub(crate) struct CheckResult {
    pub name: &'static str,
    pub outcome: Result<String>,
}

impl CheckResult {
    pub(crate) fn passed(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Execute the check command
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let results = run_checks(global);

    for result in &results {
        match &result.outcome {
            Ok(detail) => println!("PASS  {:<11} {detail}", result.name),
            Err(err) => println!("FAIL  {:<11} {err:#}", result.name),
        }
    }

    let failed = results.iter().filter(|r| !r.passed()).count();
    println!();
    if failed > 0 {
        println!("{failed} of {} check(s) failed", results.len());
        return Err(ExitCode(1).into());
    }
    println!("All {} checks passed", results.len());
    Ok(())
}

/// Run every check in order and collect the outcomes.
pub(crate) fn run_checks(global: &GlobalArgs) -> Vec<CheckResult> {
    let mut preflight = Preflight {
        global,
        project: None,
    };
    CHECKS
        .iter()
        .map(|&(name, check)| {
            let outcome = check(&mut preflight);
            log::debug!("check {name}: {}", if outcome.is_ok() { "pass" } else { "fail" });
            CheckResult { name, outcome }
        })
        .collect()
}

fn check_config(preflight: &mut Preflight<'_>) -> Result<String> {
    let project = load_project(preflight.global)?;
    let detail = format!(
        "{} database at {}",
        project.config.database.db_type,
        project.database_path()
    );
    preflight.project = Some(project);
    Ok(detail)
}

fn check_migrations(preflight: &mut Preflight<'_>) -> Result<String> {
    let project = preflight.project()?;
    let dir = project.config.migrations_path_absolute(&project.root);
    let set = MigrationSet::discover(&dir)?;
    Ok(match set.latest() {
        Some(latest) => format!("{} migration(s), latest {latest}", set.len()),
        None => format!("no migrations in {}", dir.display()),
    })
}

fn check_progress(preflight: &mut Preflight<'_>) -> Result<String> {
    let project = preflight.project()?;
    let store = ProgressStore::new(project.config.state_file_absolute(&project.root));
    Ok(match store.read()? {
        Some(cursor) => format!("cursor at {cursor}"),
        None => "no cursor recorded yet".to_string(),
    })
}

fn check_lock(preflight: &mut Preflight<'_>) -> Result<String> {
    let project = preflight.project()?;
    let lock = project.lock();
    let Some(info) = lock.inspect()? else {
        return Ok("not held".to_string());
    };

    let age = format_age(info.age);
    match project.config.stale_lock_after() {
        Some(threshold) if info.age >= threshold => Ok(format!(
            "held for {age}, stale; the next run will take it over"
        )),
        _ => bail!("{} held for {age}", lock.path().display()),
    }
}

fn check_database(preflight: &mut Preflight<'_>) -> Result<String> {
    let project = preflight.project()?;
    let path = project.database_path();
    if path != ":memory:" && !Path::new(&path).exists() {
        // Opening would create the file; leave that to the first run.
        return Ok(format!("{path} does not exist yet and will be created"));
    }

    let db = project.connect()?;
    db.execute("SELECT 1")?;
    Ok(format!("connected to {}", db.db_type()))
}

#[cfg(test)]
#[path = "check_test.rs"]
mod tests;
