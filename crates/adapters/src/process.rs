// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local-process back-end: runs each task's rendered command as a child
//! process. A stand-in for the real distributed work-queue (spec.md §1
//! "out of scope"), useful for single-node deployments and manual testing.

use crate::error::AdapterError;
use crate::WorkQueueAdapter;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BinaryHeap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use yerba_core::event::NotifierEvent;
use yerba_core::{Notifier, Task, TaskInfo};

/// How many child processes may run at once.
const MAX_CONCURRENT: usize = 4;

struct PendingTask {
    priority: i64,
    seq: u64,
    workflow_id: String,
    task: Task,
}

impl PartialEq for PendingTask {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}
impl Eq for PendingTask {}

impl Ord for PendingTask {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Higher priority first; among equal priority, earlier submission
        // (lower seq) first (spec.md §4.3).
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
impl PartialOrd for PendingTask {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

struct Completion {
    workflow_id: String,
    task_id: String,
    info: TaskInfo,
}

struct State {
    queue: BinaryHeap<PendingTask>,
    next_seq: u64,
    completions: VecDeque<Completion>,
    seen: HashSet<(String, String)>,
    cancelled: HashSet<String>,
    in_flight: usize,
}

impl State {
    fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
            completions: VecDeque::new(),
            seen: HashSet::new(),
            cancelled: HashSet::new(),
            in_flight: 0,
        }
    }
}

/// A work-queue adapter that executes task commands directly as local
/// processes (spec.md §4.3).
pub struct LocalProcessAdapter {
    group: String,
    name: String,
    state: Arc<Mutex<State>>,
    wake: Arc<Notify>,
    dispatcher_started: AtomicBool,
    running_children: Arc<AtomicUsize>,
}

impl LocalProcessAdapter {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            state: Arc::new(Mutex::new(State::new())),
            wake: Arc::new(Notify::new()),
            dispatcher_started: AtomicBool::new(false),
            running_children: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn spawn_dispatcher(&self) {
        let state = self.state.clone();
        let wake = self.wake.clone();
        let running = self.running_children.clone();
        tokio::spawn(async move {
            loop {
                let next = {
                    let mut guard = state.lock();
                    if guard.in_flight >= MAX_CONCURRENT {
                        None
                    } else if let Some(pending) = guard.queue.pop() {
                        if guard.cancelled.contains(&pending.workflow_id) {
                            continue;
                        }
                        guard.in_flight += 1;
                        Some(pending)
                    } else {
                        None
                    }
                };
                match next {
                    Some(pending) => {
                        let state = state.clone();
                        let wake = wake.clone();
                        let running = running.clone();
                        running.fetch_add(1, Ordering::SeqCst);
                        tokio::spawn(async move {
                            let info = run_task(&pending.task).await;
                            let mut guard = state.lock();
                            guard.in_flight -= 1;
                            guard.completions.push_back(Completion {
                                workflow_id: pending.workflow_id,
                                task_id: pending.task.id.as_str().to_string(),
                                info,
                            });
                            drop(guard);
                            running.fetch_sub(1, Ordering::SeqCst);
                            wake.notify_one();
                        });
                    }
                    None => {
                        wake.notified().await;
                    }
                }
            }
        });
    }
}

async fn run_task(task: &Task) -> TaskInfo {
    let started = std::time::Instant::now();
    let command = task.rendered_command();
    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        return TaskInfo {
            returned: Some(-1),
            output: Some("empty command".to_string()),
            ..Default::default()
        };
    };
    let output = tokio::process::Command::new(program).args(parts).output().await;
    let elapsed = started.elapsed().as_secs_f64();
    match output {
        Ok(out) => TaskInfo {
            started: None,
            ended: None,
            elapsed: Some(elapsed),
            taskid: Some(task.id.as_str().to_string()),
            returned: out.status.code().map(|c| c as i64),
            output: Some(
                String::from_utf8_lossy(if out.status.success() { &out.stdout } else { &out.stderr })
                    .into_owned(),
            ),
        },
        Err(e) => TaskInfo {
            elapsed: Some(elapsed),
            taskid: Some(task.id.as_str().to_string()),
            returned: Some(-1),
            output: Some(e.to_string()),
            ..Default::default()
        },
    }
}

#[async_trait]
impl WorkQueueAdapter for LocalProcessAdapter {
    fn group(&self) -> &str {
        &self.group
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn initialize(&self) -> Result<(), AdapterError> {
        if !self.dispatcher_started.swap(true, Ordering::SeqCst) {
            self.spawn_dispatcher();
        }
        Ok(())
    }

    async fn schedule(
        &self,
        workflow_id: &str,
        tasks: &[Task],
        priority: i64,
    ) -> Result<(), AdapterError> {
        let mut guard = self.state.lock();
        for task in tasks {
            let seq = guard.next_seq;
            guard.next_seq += 1;
            guard.queue.push(PendingTask {
                priority,
                seq,
                workflow_id: workflow_id.to_string(),
                task: task.clone(),
            });
        }
        drop(guard);
        self.wake.notify_one();
        Ok(())
    }

    async fn cancel(&self, workflow_id: &str) -> Result<(), AdapterError> {
        let mut guard = self.state.lock();
        guard.cancelled.insert(workflow_id.to_string());
        let remaining: BinaryHeap<PendingTask> = guard
            .queue
            .drain()
            .filter(|p| p.workflow_id != workflow_id)
            .collect();
        guard.queue = remaining;
        Ok(())
    }

    async fn update(&self, notifier: &Notifier) -> Result<(), AdapterError> {
        let completions: Vec<Completion> = {
            let mut guard = self.state.lock();
            guard.completions.drain(..).collect()
        };
        for completion in completions {
            let key = (completion.workflow_id.clone(), completion.task_id.clone());
            {
                let mut guard = self.state.lock();
                if !guard.seen.insert(key) {
                    continue;
                }
            }
            notifier.notify(&NotifierEvent::TaskDone {
                workflow_id: completion.workflow_id,
                task_id: completion.task_id,
                info: completion.info,
            });
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), AdapterError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
