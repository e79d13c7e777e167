use super::*;
use yerba_core::{Task, TaskSpec};

fn task() -> Task {
    let spec: TaskSpec =
        serde_json::from_value(serde_json::json!({ "cmd": "echo", "description": "say hi" })).unwrap();
    Task::from_spec(spec)
}

#[test]
fn task_done_writes_banner_and_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wf.log");
    let sink = FileLogSink::new(&path);
    let mut t = task();
    t.info.returned = Some(0);
    t.info.elapsed = Some(1.5);
    sink.task_done("demo", &t);
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("say hi"));
    assert!(contents.contains("Return status: 0"));
    assert!(contents.starts_with(BANNER));
}

#[test]
fn task_skipped_writes_one_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wf.log");
    let sink = FileLogSink::new(&path);
    sink.task_skipped("demo", &task());
    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 1);
    assert!(contents.starts_with("SKIPPED:"));
}

#[test]
fn resolve_with_no_path_is_a_noop() {
    let sink = resolve(None);
    // Must not panic and must not create any file.
    sink.task_done("demo", &task());
}

#[test]
fn entries_append_across_calls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wf.log");
    let sink = FileLogSink::new(&path);
    sink.task_skipped("demo", &task());
    sink.task_not_run("demo", &task());
    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 2);
}
