use super::*;
use std::fs;

fn spec(json: &str) -> TaskSpec {
    serde_json::from_str(json).unwrap()
}

#[test]
fn from_spec_sorts_inputs_and_outputs() {
    let t = Task::from_spec(spec(
        r#"{"cmd": "echo", "inputs": ["/z", "/a"], "outputs": ["/y", "/b"]}"#,
    ));
    assert_eq!(t.inputs[0].path(), std::path::Path::new("/a"));
    assert_eq!(t.inputs[1].path(), std::path::Path::new("/z"));
    assert_eq!(t.outputs[0].path(), std::path::Path::new("/b"));
    assert_eq!(t.outputs[1].path(), std::path::Path::new("/y"));
}

#[test]
fn from_spec_round_trips_description_and_paths() {
    // P4: state() of a freshly constructed task contains the submitted
    // description, command, and sorted inputs/outputs verbatim.
    let t = Task::from_spec(spec(
        r#"{"cmd": "echo", "description": "say hi", "inputs": ["/a"], "outputs": ["/b"]}"#,
    ));
    let state = t.state();
    assert_eq!(state.description, "say hi");
    assert_eq!(state.cmd, "echo ");
    assert_eq!(state.inputs, vec![PathDescriptor::File("/a".into())]);
    assert_eq!(state.outputs, vec![PathDescriptor::File("/b".into())]);
}

#[test]
fn arg_rendering_law_s1() {
    // S1: args=[["-n","hi",0]] renders as "echo  -n hi" (two spaces: the cmd
    // separator, plus the leading space baked into the args string).
    let t = Task::from_spec(spec(r#"{"cmd": "echo", "args": [["-n", "hi", 0]]}"#));
    assert_eq!(t.rendered_command(), "echo  -n hi");
}

#[test]
fn arg_rendering_shortens_absolute_path_when_truthy() {
    let t = Task::from_spec(spec(
        r#"{"cmd": "run", "args": [["--file", "/tmp/sub/data.txt", 1]]}"#,
    ));
    assert_eq!(t.rendered_command(), "run --file data.txt");
}

#[test]
fn arg_rendering_does_not_shorten_relative_path() {
    let t = Task::from_spec(spec(
        r#"{"cmd": "run", "args": [["--file", "sub/data.txt", 1]]}"#,
    ));
    assert_eq!(t.rendered_command(), "run --file sub/data.txt");
}

#[test]
fn arg_rendering_leaves_value_untouched_when_shorten_falsy() {
    let t = Task::from_spec(spec(
        r#"{"cmd": "run", "args": [["--file", "/tmp/sub/data.txt", 0]]}"#,
    ));
    assert_eq!(t.rendered_command(), "run --file /tmp/sub/data.txt");
}

#[test]
fn arg_rendering_concatenates_in_order() {
    let t = Task::from_spec(spec(
        r#"{"cmd": "run", "args": [["-a", "1", 0], ["-b", "2", 0]]}"#,
    ));
    assert_eq!(t.rendered_command(), "run -a 1 -b 2");
}

#[test]
fn ready_requires_all_inputs_present() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    let mut t = Task::from_spec(TaskSpec {
        cmd: "x".into(),
        args: Vec::new(),
        inputs: vec![PathDescriptor::File(input.clone())],
        outputs: Vec::new(),
        description: None,
        priority: 0,
        options: Default::default(),
        overwrite: serde_json::Value::Null,
    });
    assert!(!t.ready());
    fs::write(&input, b"hi").unwrap();
    assert!(t.ready());
    t.options.allow_zero_length = false;
    fs::write(&input, b"").unwrap();
    assert!(!t.ready());
}

#[test]
fn completed_with_outputs_checks_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.txt");
    let t = Task::from_spec(TaskSpec {
        cmd: "x".into(),
        args: Vec::new(),
        inputs: Vec::new(),
        outputs: vec![PathDescriptor::File(output.clone())],
        description: None,
        priority: 0,
        options: Default::default(),
        overwrite: serde_json::Value::Null,
    });
    assert!(!t.completed());
    fs::write(&output, b"hi").unwrap();
    assert!(t.completed());
}

#[test]
fn completed_without_outputs_checks_accepted_return_codes() {
    let mut t = Task::from_spec(spec(r#"{"cmd": "x"}"#));
    assert!(!t.completed());
    t.info.returned = Some(1);
    assert!(!t.completed());
    t.info.returned = Some(0);
    assert!(t.completed());
}

#[test]
fn completed_without_outputs_honors_accepted_return_codes_option() {
    let mut t = Task::from_spec(spec(
        r#"{"cmd": "x", "options": {"accepted-return-codes": [0, 2]}}"#,
    ));
    t.info.returned = Some(2);
    assert!(t.completed());
}

#[test]
fn retries_exhausted_follows_attempts_vs_retries() {
    let mut t = Task::from_spec(spec(r#"{"cmd": "x", "options": {"retries": 1}}"#));
    assert_eq!(t.attempts, 1);
    assert!(!t.retries_exhausted());
    t.restart();
    assert_eq!(t.attempts, 2);
    assert!(!t.retries_exhausted());
    t.restart();
    assert_eq!(t.attempts, 3);
    assert!(t.retries_exhausted());
}

#[test]
fn default_zero_retries_fails_after_first_attempt_alone() {
    let t = Task::from_spec(spec(r#"{"cmd": "x"}"#));
    assert!(!t.retries_exhausted());
}

#[test]
fn overwrite_truthy_removes_existing_outputs_at_construction() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.txt");
    fs::write(&output, b"stale").unwrap();
    let spec_str = format!(
        r#"{{"cmd": "x", "outputs": ["{}"], "overwrite": 1}}"#,
        output.display()
    );
    Task::from_spec(spec(&spec_str));
    assert!(!output.exists());
}

#[test]
fn equality_ignores_status_and_info() {
    let mut a = Task::from_spec(spec(r#"{"cmd": "echo", "inputs": ["/a"]}"#));
    let b = Task::from_spec(spec(r#"{"cmd": "echo", "inputs": ["/a"]}"#));
    a.set_status(TaskStatus::Running);
    a.info.returned = Some(0);
    assert_eq!(a, b);
}

#[test]
fn equality_differs_on_command_or_inputs() {
    let a = Task::from_spec(spec(r#"{"cmd": "echo", "inputs": ["/a"]}"#));
    let b = Task::from_spec(spec(r#"{"cmd": "echo", "inputs": ["/b"]}"#));
    assert_ne!(a, b);
}

#[test]
fn clear_removes_outputs_and_ignores_missing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.txt");
    fs::write(&output, b"hi").unwrap();
    let t = Task::from_spec(TaskSpec {
        cmd: "x".into(),
        args: Vec::new(),
        inputs: Vec::new(),
        outputs: vec![PathDescriptor::File(output.clone())],
        description: None,
        priority: 0,
        options: Default::default(),
        overwrite: serde_json::Value::Null,
    });
    t.clear();
    assert!(!output.exists());
    t.clear(); // second call: already missing, must not panic
}
