use super::*;
use std::fs;
use tempfile::tempdir;

fn global_for(dir: &Path) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        project_dir: dir.to_path_buf(),
        config: None,
        database: None,
    }
}

fn healthy_project(dir: &Path) {
    fs::write(dir.join("stepwise.yml"), "database:\n  path: \":memory:\"\n").unwrap();
    let migrate = dir.join("db/migrate");
    fs::create_dir_all(&migrate).unwrap();
    fs::write(migrate.join("20240101000000_one.sql"), "SELECT 1;").unwrap();
}

fn outcome<'a>(results: &'a [CheckResult], name: &str) -> &'a CheckResult {
    results.iter().find(|r| r.name == name).unwrap()
}

#[test]
fn test_checks_run_in_declared_order() {
    let names: Vec<&str> = CHECKS.iter().map(|(name, _)| *name).collect();
    assert_eq!(
        names,
        vec!["config", "migrations", "progress", "lock", "database"]
    );
}

#[test]
fn test_healthy_project_passes_everything() {
    let dir = tempdir().unwrap();
    healthy_project(dir.path());

    let results = run_checks(&global_for(dir.path()));
    assert_eq!(results.len(), CHECKS.len());
    assert!(results.iter().all(CheckResult::passed), "{results:?}");
    assert!(execute(&global_for(dir.path())).is_ok());
}

#[test]
fn test_missing_config_fails_every_check() {
    let dir = tempdir().unwrap();

    let results = run_checks(&global_for(dir.path()));
    assert!(results.iter().all(|r| !r.passed()));

    let err = execute(&global_for(dir.path())).unwrap_err();
    assert!(matches!(err.downcast_ref::<ExitCode>(), Some(ExitCode(1))));
}

#[test]
fn test_duplicate_revisions_fail_migrations_check() {
    let dir = tempdir().unwrap();
    healthy_project(dir.path());
    fs::write(
        dir.path().join("db/migrate/20240101000000_again.sql"),
        "SELECT 2;",
    )
    .unwrap();

    let results = run_checks(&global_for(dir.path()));
    let migrations = outcome(&results, "migrations");
    assert!(!migrations.passed());
    let message = format!("{:#}", migrations.outcome.as_ref().unwrap_err());
    assert!(message.contains("C005"), "{message}");
    assert!(outcome(&results, "progress").passed());
}

#[test]
fn test_corrupt_progress_fails_progress_check() {
    let dir = tempdir().unwrap();
    healthy_project(dir.path());
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::write(dir.path().join("data/dbmigrate.txt"), "not-a-revision").unwrap();

    let results = run_checks(&global_for(dir.path()));
    assert!(!outcome(&results, "progress").passed());
}

#[test]
fn test_held_lock_fails_unless_stale() {
    let dir = tempdir().unwrap();
    healthy_project(dir.path());
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::write(
        dir.path().join("data/dbmigrate.txt.lock"),
        "Mon, 01 Jan 2001 00:00:00 +0000\npid 1\n",
    )
    .unwrap();

    let results = run_checks(&global_for(dir.path()));
    assert!(!outcome(&results, "lock").passed());

    fs::write(
        dir.path().join("stepwise.yml"),
        "stale_lock_after_secs: 60\ndatabase:\n  path: \":memory:\"\n",
    )
    .unwrap();
    let results = run_checks(&global_for(dir.path()));
    assert!(outcome(&results, "lock").passed());
    assert!(dir.path().join("data/dbmigrate.txt.lock").exists());
}

#[test]
fn test_database_check_does_not_create_file() {
    let dir = tempdir().unwrap();
    healthy_project(dir.path());
    let mut global = global_for(dir.path());
    global.database = Some("fresh.duckdb".to_string());

    let results = run_checks(&global);
    assert!(outcome(&results, "database").passed());
    assert!(!dir.path().join("fresh.duckdb").exists());
}
