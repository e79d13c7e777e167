use super::*;
use std::time::Duration;
use tokio::net::TcpStream;
use yerba_adapters::fake::FakeAdapter;
use yerba_engine::WorkflowManager;
use yerba_storage::Store;

fn daemon() -> Daemon {
    Daemon::new(WorkflowManager::new(Store::open_in_memory().unwrap()))
}

#[tokio::test]
async fn health_replies_ok() {
    let mut daemon = daemon();
    let response = daemon.handle(Request { request: "health".into(), data: serde_json::json!({}) }).await;
    assert_eq!(response.status, "OK");
}

#[tokio::test]
async fn unknown_request_is_a_failed_reply() {
    let mut daemon = daemon();
    let response = daemon.handle(Request { request: "nonsense".into(), data: serde_json::json!({}) }).await;
    assert_eq!(response.status, "Failed");
    assert!(response.error.is_some());
}

#[tokio::test]
async fn schedule_then_get_status_round_trips_through_the_handlers() {
    let mut daemon = daemon();
    let backend = Arc::new(FakeAdapter::new("local", "default"));
    daemon.register_backend(backend.clone());

    let submitted = daemon
        .handle(Request {
            request: "schedule".into(),
            data: serde_json::json!({"tasks": [{"cmd": "a"}]}),
        })
        .await;
    assert_eq!(submitted.status, "Scheduled");
    let id = submitted.id.clone().unwrap();

    // SCHEDULE_TASK fans out through a spawned task; give it a tick.
    tokio::task::yield_now().await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(backend.scheduled().len(), 1);

    let status = daemon
        .handle(Request { request: "get_status".into(), data: serde_json::json!({"id": id}) })
        .await;
    assert_eq!(status.status, "Running");
    assert_eq!(status.jobs.unwrap().len(), 1);
}

#[tokio::test]
async fn schedule_with_invalid_object_is_rejected() {
    let mut daemon = daemon();
    let response = daemon
        .handle(Request { request: "schedule".into(), data: serde_json::json!({"tasks": "not-a-list"}) })
        .await;
    assert_eq!(response.status, "Error");
    assert!(!response.errors.is_empty());
}

#[tokio::test]
async fn cancel_unknown_id_fails() {
    let mut daemon = daemon();
    let response = daemon
        .handle(Request { request: "cancel".into(), data: serde_json::json!({"id": "404"}) })
        .await;
    assert_eq!(response.status, "Failed");
}

#[tokio::test]
async fn workflows_lists_persisted_rows() {
    let mut daemon = daemon();
    daemon
        .handle(Request { request: "schedule".into(), data: serde_json::json!({"tasks": [{"cmd": "a"}]}) })
        .await;
    let response = daemon.handle(Request { request: "workflows".into(), data: serde_json::json!({}) }).await;
    assert_eq!(response.status, "OK");
    assert_eq!(response.workflows.unwrap().len(), 1);
}

#[tokio::test]
async fn shutdown_stops_the_run_loop() {
    let daemon = daemon();
    let port = free_port();
    let handle = tokio::spawn(daemon.run(port));

    // Give the accept loop a moment to bind before connecting.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    write_response_as_request(&mut stream, "shutdown").await;

    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("run loop should exit after shutdown")
        .unwrap()
        .unwrap();
}

async fn write_response_as_request(stream: &mut TcpStream, request: &str) {
    let payload = serde_json::to_vec(&serde_json::json!({"request": request, "data": {}})).unwrap();
    let len = (payload.len() as u32).to_be_bytes();
    use tokio::io::AsyncWriteExt;
    stream.write_all(&len).await.unwrap();
    stream.write_all(&payload).await.unwrap();
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}
