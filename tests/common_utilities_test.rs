mod common;

use common::*;

#[test]
fn test_generate_content() {
    let content = generate_test_content(300);
    assert_eq!(content.len(), 300);
    assert_eq!(content[0], 0);
    assert_eq!(content[256], 0);
    assert_eq!(content[299], 43);
}

#[test]
fn test_project_tree_shape() {
    let temp = tempfile::tempdir().unwrap();
    let (files, bytes) = create_project_tree(temp.path());

    assert_eq!(files, 10);
    assert_eq!(bytes, 100_000);
    assert_eq!(snapshot_tree(temp.path()).len(), 10);
    assert!(temp.path().join("src").is_dir());
}

#[test]
fn test_verify_file_content() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_file(temp.path(), "a/b.txt", b"abc");

    assert!(verify_file_content(&path, b"abc").is_ok());
    assert!(verify_file_content(&path, b"abcd").is_err());
}
