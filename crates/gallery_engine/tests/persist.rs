use std::fs;

use gallery_engine::{ensure_dir, write_atomically, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_directory() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("conf").join("nested");
    assert!(!new_dir.exists());
    ensure_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("gallery_sync.ron");

    write_atomically(&target, "(chunk_size: 1)").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "(chunk_size: 1)");

    write_atomically(&target, "(chunk_size: 2)").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "(chunk_size: 2)");

    // Only the target remains; the temp file was renamed away.
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn no_partial_file_when_parent_is_a_file() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();

    let result = write_atomically(&blocker.join("config.ron"), "data");
    assert!(matches!(result, Err(PersistError::Directory(_))));
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "x");
}
