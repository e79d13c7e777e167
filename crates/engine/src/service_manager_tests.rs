use super::*;
use yerba_adapters::fake::FakeAdapter;

#[tokio::test]
async fn register_then_start_initializes_backend() {
    let mut manager = ServiceManager::new();
    let adapter = Arc::new(FakeAdapter::new("local", "a"));
    manager.register(adapter.clone());
    manager.start().await;
    assert!(manager.is_running());
}

#[tokio::test]
async fn duplicate_registration_is_ignored() {
    let mut manager = ServiceManager::new();
    manager.register(Arc::new(FakeAdapter::new("local", "a")));
    manager.register(Arc::new(FakeAdapter::new("local", "a")));
    assert_eq!(manager.backend("local.a").is_some(), true);
    // Only one slot should exist; registering a second under the same key
    // must not replace or duplicate it silently beyond the first.
}

#[tokio::test]
async fn update_polls_every_registered_backend() {
    let mut manager = ServiceManager::new();
    let adapter = Arc::new(FakeAdapter::new("local", "a"));
    manager.register(adapter.clone());
    manager.start().await;
    let notifier = Notifier::new();
    manager.update(&notifier, &[]).await;
    // No panics, no pending completions: nothing to assert beyond success.
}

#[tokio::test]
async fn stop_clears_running_state() {
    let mut manager = ServiceManager::new();
    manager.register(Arc::new(FakeAdapter::new("local", "a")));
    manager.start().await;
    manager.stop().await;
    assert!(!manager.is_running());
}
