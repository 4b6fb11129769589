use super::*;
use std::fs;
use tempfile::tempdir;

const OLD_MARKER: &str = "Mon, 01 Jan 2001 00:00:00 +0000\npid 4242\n";

#[test]
fn test_unlock_without_marker() {
    let dir = tempdir().unwrap();
    let lock = RunLock::new(dir.path().join("run.lock"));
    assert_eq!(unlock(&lock, None).unwrap(), UnlockOutcome::NotHeld);
}

#[test]
fn test_unlock_removes_marker() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.lock");
    fs::write(&path, OLD_MARKER).unwrap();
    let lock = RunLock::new(&path);

    assert!(matches!(
        unlock(&lock, None).unwrap(),
        UnlockOutcome::Removed { .. }
    ));
    assert!(!path.exists());
}

#[test]
fn test_unlock_keeps_young_marker() {
    let dir = tempdir().unwrap();
    let lock = RunLock::new(dir.path().join("run.lock"));
    let guard = lock.try_acquire().unwrap().unwrap();

    let outcome = unlock(&lock, Some(Duration::from_secs(3_600))).unwrap();
    assert!(matches!(outcome, UnlockOutcome::Kept { .. }));
    assert!(guard.path().exists());
    guard.release().unwrap();
}

#[test]
fn test_unlock_threshold_removes_old_marker() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.lock");
    fs::write(&path, OLD_MARKER).unwrap();

    let outcome = unlock(&RunLock::new(&path), Some(Duration::from_secs(3_600))).unwrap();
    assert!(matches!(outcome, UnlockOutcome::Removed { .. }));
    assert!(!path.exists());
}

#[test]
fn test_execute_uses_configured_lock_file() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("stepwise.yml"),
        "lock_file: run/stepwise.lock\n",
    )
    .unwrap();
    fs::create_dir_all(dir.path().join("run")).unwrap();
    fs::write(dir.path().join("run/stepwise.lock"), OLD_MARKER).unwrap();

    let global = GlobalArgs {
        verbose: false,
        project_dir: dir.path().to_path_buf(),
        config: None,
        database: None,
    };
    execute(&UnlockArgs { if_older_than: None }, &global).unwrap();

    assert!(!dir.path().join("run/stepwise.lock").exists());
}
