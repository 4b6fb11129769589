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

#[test]
fn test_load_project_from_dir() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("stepwise.yml"),
        "migrations_path: sql\ndatabase:\n  path: app.duckdb\n",
    )
    .unwrap();

    let project = load_project(&global_for(dir.path())).unwrap();
    assert_eq!(project.config.migrations_path, "sql");
    assert_eq!(
        project.database_path(),
        dir.path().join("app.duckdb").display().to_string()
    );
}

#[test]
fn test_database_flag_overrides_config() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("stepwise.yml"), "database:\n  path: app.duckdb\n").unwrap();

    let mut global = global_for(dir.path());
    global.database = Some(":memory:".to_string());
    let project = load_project(&global).unwrap();
    assert_eq!(project.database_path(), ":memory:");
    assert!(project.connect().is_ok());
}

#[test]
fn test_explicit_config_path() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("deploy.yml");
    fs::write(&config_path, "transactional: true\n").unwrap();

    let mut global = global_for(dir.path());
    global.config = Some(config_path);
    let project = load_project(&global).unwrap();
    assert!(project.config.transactional);
}

#[test]
fn test_missing_config_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_project(&global_for(dir.path())).unwrap_err();
    assert!(format!("{err:#}").contains("C001"));
}

#[test]
fn test_empty_database_flag_is_rejected() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("stepwise.yml"), "{}\n").unwrap();

    let mut global = global_for(dir.path());
    global.database = Some("  ".to_string());
    assert!(load_project(&global).is_err());
}

#[test]
fn test_format_age() {
    assert_eq!(format_age(Duration::from_secs(0)), "0s");
    assert_eq!(format_age(Duration::from_secs(59)), "59s");
    assert_eq!(format_age(Duration::from_secs(3_600)), "1h 0m 0s");
    assert_eq!(format_age(Duration::from_secs(90_061)), "1d 1h 1m 1s");
}

#[test]
fn test_display_path_strips_root() {
    let root = Path::new("/srv/app");
    assert_eq!(
        display_path(root, Path::new("/srv/app/db/migrate")),
        "db/migrate"
    );
    assert_eq!(display_path(root, Path::new("/tmp/x.lock")), "/tmp/x.lock");
}
