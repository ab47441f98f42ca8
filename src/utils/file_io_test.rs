use std::io::Write;

use super::file_io::*;

/// Passed: "<tmp>/files/data.txt"
/// Expected: "<tmp>/files" created, file itself not created
#[test]
fn test_create_parent_dir_for_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file_path = temp_dir.path().join("files").join("data.txt");

    create_parent_dir_if_not_exist(&file_path).unwrap();

    assert!(file_path.parent().unwrap().is_dir());
    assert!(!file_path.exists());
}

#[test]
fn test_open_file_for_append_keeps_existing_content() {
    let temp_dir = tempfile::tempdir().unwrap();
    let log_path = temp_dir.path().join("logs").join("skillshare.log");

    {
        let mut file = open_file_for_append(&log_path).unwrap();
        writeln!(file, "first").unwrap();
    }
    {
        let mut file = open_file_for_append(&log_path).unwrap();
        writeln!(file, "second").unwrap();
    }

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert_eq!(content, "first\nsecond\n");
}

#[test]
fn test_open_file_for_append_fails_when_parent_is_a_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, b"x").unwrap();

    assert!(open_file_for_append(&blocker.join("skillshare.log")).is_err());
}
