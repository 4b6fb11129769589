//! End-to-end runs against a file-backed DuckDB database

use std::path::Path;
use sw_core::{Config, Revision};
use sw_db::DuckDbBackend;
use sw_runner::test_utils::write_migration;
use sw_runner::{Migrator, MigratorConfig, RunReport};
use tempfile::tempdir;

fn rev(s: &str) -> Revision {
    s.parse().unwrap()
}

fn migrator_for(root: &Path, yaml: &str) -> (Migrator, String) {
    let config: Config = load_config(yaml);
    let migrator = Migrator::new(MigratorConfig::from_config(&config, root));
    (migrator, config.database_path_absolute(root))
}

fn load_config(yaml: &str) -> Config {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stepwise.yml");
    std::fs::write(&path, yaml).unwrap();
    Config::load(&path).unwrap()
}

#[test]
fn test_run_against_duckdb_file() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let (migrator, db_path) = migrator_for(root, "database:\n  path: app.duckdb\n");
    let migrate = migrator.config().migrations_dir.clone();

    write_migration(&migrate, "20240101000000_users.sql", "CREATE TABLE users (id INT);");
    // First run on a fresh install only seeds the cursor.
    let report = migrator.run(|| DuckDbBackend::new(&db_path)).unwrap();
    assert!(report.applied().is_empty());
    assert_eq!(report.cursor(), Some(rev("20240101000000")));

    write_migration(
        &migrate,
        "20240201000000_orders.sql",
        "CREATE TABLE orders (id INT, user_id INT);\nINSERT INTO orders VALUES (1, 1), (2, 1);",
    );
    write_migration(
        &migrate,
        "20240301000000_index.sql",
        "CREATE INDEX orders_user ON orders (user_id);",
    );
    let report = migrator.run(|| DuckDbBackend::new(&db_path)).unwrap();
    assert_eq!(report.applied().len(), 2);
    assert_eq!(report.cursor(), Some(rev("20240301000000")));

    let db = DuckDbBackend::new(&db_path).unwrap();
    assert!(db.relation_exists("orders").unwrap());
    assert!(!db.relation_exists("users").unwrap(), "seeded revision must not run");
    assert_eq!(db.query_count("SELECT * FROM orders").unwrap(), 2);
    assert_eq!(
        std::fs::read_to_string(root.join("data/dbmigrate.txt")).unwrap(),
        "20240301000000"
    );
}

#[test]
fn test_partial_failure_on_duckdb() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let (migrator, db_path) = migrator_for(root, "database:\n  path: app.duckdb\n");
    let migrate = migrator.config().migrations_dir.clone();
    migrator.progress().write(rev("20231231000000")).unwrap();

    write_migration(&migrate, "20240101000000_one.sql", "CREATE TABLE one (id INT);");
    write_migration(
        &migrate,
        "20240201000000_two.sql",
        "CREATE TABLE two (id INT);\nINSERT INTO missing VALUES (1);",
    );
    write_migration(&migrate, "20240301000000_three.sql", "CREATE TABLE three (id INT);");

    let report = migrator.run(|| DuckDbBackend::new(&db_path)).unwrap();
    let RunReport::Failed { failure, .. } = &report else {
        panic!("expected failure, got {report:?}");
    };
    assert_eq!(failure.revision, rev("20240201000000"));
    assert_eq!(failure.statement, 2);
    assert!(!root.join("data/dbmigrate.txt.lock").exists());

    let db = DuckDbBackend::new(&db_path).unwrap();
    assert!(db.relation_exists("one").unwrap());
    // Without transactions the first statement of the failed file stays applied.
    assert!(db.relation_exists("two").unwrap());
    assert!(!db.relation_exists("three").unwrap());
    assert_eq!(
        migrator.progress().read().unwrap(),
        Some(rev("20240101000000"))
    );
}

#[test]
fn test_transactional_partial_failure_on_duckdb() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let (migrator, db_path) = migrator_for(
        root,
        "transactional: true\nschema: app\ndatabase:\n  path: app.duckdb\n",
    );
    let migrate = migrator.config().migrations_dir.clone();
    {
        let db = DuckDbBackend::new(&db_path).unwrap();
        sw_db::Database::execute(&db, "CREATE SCHEMA app").unwrap();
    }
    migrator.progress().write(rev("20231231000000")).unwrap();

    write_migration(&migrate, "20240101000000_one.sql", "CREATE TABLE one (id INT);");
    write_migration(
        &migrate,
        "20240201000000_two.sql",
        "CREATE TABLE two (id INT);\nINSERT INTO missing VALUES (1);",
    );

    let report = migrator.run(|| DuckDbBackend::new(&db_path)).unwrap();
    assert!(report.is_failure());

    let db = DuckDbBackend::new(&db_path).unwrap();
    assert!(db.relation_exists("app.one").unwrap());
    assert!(!db.relation_exists("app.two").unwrap());
}
