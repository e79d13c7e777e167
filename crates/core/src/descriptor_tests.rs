use super::*;
use std::fs;

#[test]
fn plain_path_deserializes_as_file() {
    let d: PathDescriptor = serde_json::from_str("\"/tmp/out\"").unwrap();
    assert_eq!(d, PathDescriptor::File(PathBuf::from("/tmp/out")));
}

#[test]
fn pair_with_true_flag_deserializes_as_dir() {
    let d: PathDescriptor = serde_json::from_str("[\"/tmp/dir\", true]").unwrap();
    assert_eq!(d, PathDescriptor::Dir(PathBuf::from("/tmp/dir")));
}

#[test]
fn pair_with_false_flag_deserializes_as_file() {
    let d: PathDescriptor = serde_json::from_str("[\"/tmp/out\", false]").unwrap();
    assert_eq!(d, PathDescriptor::File(PathBuf::from("/tmp/out")));
}

#[test]
fn pair_with_truthy_int_flag_deserializes_as_dir() {
    let d: PathDescriptor = serde_json::from_str("[\"/tmp/dir\", 1]").unwrap();
    assert_eq!(d, PathDescriptor::Dir(PathBuf::from("/tmp/dir")));
}

#[test]
fn sorts_lexicographically_on_path() {
    let mut v = vec![
        PathDescriptor::File(PathBuf::from("/z")),
        PathDescriptor::Dir(PathBuf::from("/a")),
        PathDescriptor::File(PathBuf::from("/m")),
    ];
    v.sort();
    assert_eq!(
        v,
        vec![
            PathDescriptor::Dir(PathBuf::from("/a")),
            PathDescriptor::File(PathBuf::from("/m")),
            PathDescriptor::File(PathBuf::from("/z")),
        ]
    );
}

#[test]
fn file_resolves_iff_present_and_non_empty() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("out.txt");
    let desc = PathDescriptor::File(file.clone());
    assert!(!desc.resolves(false));

    fs::write(&file, b"").unwrap();
    assert!(!desc.resolves(false));
    assert!(desc.resolves(true));

    fs::write(&file, b"hi").unwrap();
    assert!(desc.resolves(false));
}

#[test]
fn dir_resolves_iff_existing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("sub");
    let desc = PathDescriptor::Dir(sub.clone());
    assert!(!desc.resolves(true));
    fs::create_dir(&sub).unwrap();
    assert!(desc.resolves(true));
}

#[test]
fn clear_ignores_missing_file() {
    let desc = PathDescriptor::File(PathBuf::from("/nonexistent/path/does/not/exist"));
    assert!(desc.clear().is_ok());
}

#[test]
fn clear_removes_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("out.txt");
    fs::write(&file, b"hi").unwrap();
    let desc = PathDescriptor::File(file.clone());
    desc.clear().unwrap();
    assert!(!file.exists());
}
