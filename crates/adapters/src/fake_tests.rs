use super::*;
use yerba_core::TaskSpec;

fn task() -> Task {
    let spec: TaskSpec = serde_json::from_value(serde_json::json!({ "cmd": "x" })).unwrap();
    Task::from_spec(spec)
}

#[tokio::test]
async fn schedule_records_calls() {
    let adapter = FakeAdapter::new("local", "fake");
    let t = task();
    adapter.schedule("wf-1", &[t.clone()], 3).await.unwrap();
    let scheduled = adapter.scheduled();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].0, "wf-1");
    assert_eq!(scheduled[0].2, 3);
}

#[tokio::test]
async fn update_delivers_queued_completions_once() {
    let adapter = FakeAdapter::new("local", "fake");
    let notifier = Notifier::new();
    let count = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let c = count.clone();
    notifier.register(
        "TASK_DONE",
        std::sync::Arc::new(move |_e: &NotifierEvent| {
            c.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }),
    );
    adapter.complete("wf-1", "tsk-1", TaskInfo { returned: Some(0), ..Default::default() });
    adapter.update(&notifier).await.unwrap();
    adapter.update(&notifier).await.unwrap();
    assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cancel_is_recorded() {
    let adapter = FakeAdapter::new("local", "fake");
    adapter.cancel("wf-1").await.unwrap();
    assert_eq!(adapter.cancelled(), vec!["wf-1".to_string()]);
}
