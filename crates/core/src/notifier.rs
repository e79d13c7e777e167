// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process synchronous pub/sub bus (spec.md §4.6).
//!
//! Design Notes (spec.md §9, "Coroutine-free event notifier"): a synchronous
//! fan-out is sufficient — callbacks run on the caller's thread and must not
//! block.

use crate::event::NotifierEvent;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// A subscriber to one notifier event.
pub trait Receiver: Send + Sync {
    fn handle(&self, event: &NotifierEvent);
}

impl<F> Receiver for F
where
    F: Fn(&NotifierEvent) + Send + Sync,
{
    fn handle(&self, event: &NotifierEvent) {
        self(event)
    }
}

/// Mapping from event name to an ordered list of receivers (spec.md §4.6).
#[derive(Default)]
pub struct Notifier {
    receivers: Mutex<HashMap<&'static str, Vec<Arc<dyn Receiver>>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a receiver for `event`.
    pub fn register(&self, event: &'static str, receiver: Arc<dyn Receiver>) {
        self.receivers.lock().entry(event).or_default().push(receiver);
    }

    /// Removes the first receiver registered for `event` that is the same
    /// `Arc` as `receiver`.
    pub fn unregister(&self, event: &'static str, receiver: &Arc<dyn Receiver>) {
        if let Some(list) = self.receivers.lock().get_mut(event) {
            if let Some(pos) = list.iter().position(|r| Arc::ptr_eq(r, receiver)) {
                list.remove(pos);
            }
        }
    }

    /// Invokes each receiver registered for `event.name()` in registration
    /// order, synchronously, on the caller's thread. A receiver that panics
    /// is logged and does not prevent subsequent receivers from running.
    pub fn notify(&self, event: &NotifierEvent) {
        let receivers = self
            .receivers
            .lock()
            .get(event.name())
            .cloned()
            .unwrap_or_default();
        for receiver in receivers {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| receiver.handle(event))) {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "receiver panicked".to_string());
                eprintln!("notifier: receiver for {} failed: {message}", event.name());
            }
        }
    }
}

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod tests;
