use super::*;
use chrono::TimeZone;
use sw_core::Migration;
use tempfile::tempdir;

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

#[test]
fn test_slugify() {
    assert_eq!(slugify("Add users table"), "add_users_table");
    assert_eq!(slugify("  drop--legacy  index!! "), "drop_legacy_index");
    assert_eq!(slugify("v2 API keys"), "v2_api_keys");
    assert_eq!(slugify("***"), "");
}

#[test]
fn test_creates_timestamped_file() {
    let dir = tempdir().unwrap();
    let migrate = dir.path().join("db/migrate");

    let path = create_migration(&migrate, "Add users", at(2024, 3, 5, 14, 7, 9)).unwrap();

    assert_eq!(path, migrate.join("20240305140709_add_users.sql"));
    let migration = Migration::from_path(&path).unwrap();
    assert_eq!(migration.name, "add_users");
    let sql = fs::read_to_string(&path).unwrap();
    assert!(sql.starts_with("-- Add users\n"));
    assert!(!Migration::is_manual(&sql));
}

#[test]
fn test_refuses_revision_not_newer_than_latest() {
    let dir = tempdir().unwrap();
    let migrate = dir.path().join("db/migrate");
    create_migration(&migrate, "later", at(2024, 6, 1, 0, 0, 0)).unwrap();

    let err = create_migration(&migrate, "earlier", at(2024, 5, 1, 0, 0, 0)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CoreError>(),
        Some(CoreError::RevisionNotNewer { .. })
    ));

    let err = create_migration(&migrate, "same second", at(2024, 6, 1, 0, 0, 0)).unwrap_err();
    assert!(err.to_string().contains("C008"));
    assert_eq!(fs::read_dir(&migrate).unwrap().count(), 1);
}

#[test]
fn test_refuses_description_without_usable_characters() {
    let dir = tempdir().unwrap();
    assert!(create_migration(dir.path(), "---", at(2024, 1, 1, 0, 0, 0)).is_err());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_refuses_clock_outside_revision_range() {
    let dir = tempdir().unwrap();
    let migrate = dir.path().join("db/migrate");

    let err = create_migration(&migrate, "far future", at(10000, 1, 1, 0, 0, 0)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CoreError>(),
        Some(CoreError::InvalidRevision { .. })
    ));
    assert_eq!(fs::read_dir(&migrate).unwrap().count(), 0);
}

#[test]
fn test_new_migration_is_discovered_as_pending() {
    let dir = tempdir().unwrap();
    let migrate = dir.path().join("db/migrate");
    create_migration(&migrate, "first", at(2024, 1, 1, 0, 0, 0)).unwrap();
    create_migration(&migrate, "second", at(2024, 1, 2, 0, 0, 0)).unwrap();

    let set = MigrationSet::discover(&migrate).unwrap();
    let first: Revision = "20240101000000".parse().unwrap();
    let pending = set.pending_after(Some(first));
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].name, "second");
}
