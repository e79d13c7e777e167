use super::*;

#[test]
fn done_set_matches_spec() {
    assert!(WorkflowStatus::Completed.is_done());
    assert!(WorkflowStatus::Cancelled.is_done());
    assert!(WorkflowStatus::Stopped.is_done());
    assert!(WorkflowStatus::Failed.is_done());
    assert!(!WorkflowStatus::Initialized.is_done());
    assert!(!WorkflowStatus::Scheduled.is_done());
    assert!(!WorkflowStatus::Running.is_done());
    assert!(!WorkflowStatus::NotFound.is_done());
    assert!(!WorkflowStatus::Error.is_done());
}

#[test]
fn db_code_roundtrip() {
    for s in [
        WorkflowStatus::Initialized,
        WorkflowStatus::Scheduled,
        WorkflowStatus::Running,
        WorkflowStatus::Completed,
        WorkflowStatus::Cancelled,
        WorkflowStatus::Stopped,
        WorkflowStatus::Failed,
        WorkflowStatus::NotFound,
        WorkflowStatus::Error,
    ] {
        assert_eq!(WorkflowStatus::from_db_code(s.as_db_code()), Some(s));
    }
}

#[test]
fn task_terminal_set() {
    assert!(TaskStatus::Completed.is_terminal());
    assert!(TaskStatus::Failed.is_terminal());
    assert!(TaskStatus::Cancelled.is_terminal());
    assert!(TaskStatus::Stopped.is_terminal());
    assert!(TaskStatus::Skipped.is_terminal());
    assert!(!TaskStatus::Waiting.is_terminal());
    assert!(!TaskStatus::Scheduled.is_terminal());
    assert!(!TaskStatus::Running.is_terminal());
}

#[test]
fn display_impls() {
    assert_eq!(TaskStatus::Running.to_string(), "running");
    assert_eq!(WorkflowStatus::NotFound.to_string(), "NotFound");
}
