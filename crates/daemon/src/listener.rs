// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-threaded control loop: request socket, periodic service tick, and
//! notifier wiring between the workflow manager and registered back-ends
//! (spec.md §4.8, §5, C9).

use crate::protocol::{read_request, write_response, Request, Response};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use yerba_adapters::WorkQueueAdapter;
use yerba_core::{Notifier, NotifierEvent, WorkflowStatus};
use yerba_engine::{EngineError, ServiceManager, SubmitOutcome, WorkflowManager};

/// How often the control loop polls for a request before running a service
/// tick (spec.md §5 "10ms / else call update / sleep 50ms").
const TICK: Duration = Duration::from_millis(50);

/// The request loop described in spec.md §4.8: owns the active workflow map
/// and the back-end registry, and is the only task that ever mutates either.
pub struct Daemon {
    manager: Arc<Mutex<WorkflowManager>>,
    service: ServiceManager,
    notifier: Arc<Notifier>,
    running: bool,
}

impl Daemon {
    /// Wraps `manager` and wires the `TASK_DONE` receiver that feeds
    /// completions back into it (spec.md §4.4 `update`, bound to C2).
    pub fn new(manager: WorkflowManager) -> Self {
        let manager = Arc::new(Mutex::new(manager));
        let notifier = Arc::new(Notifier::new());

        let done_manager = manager.clone();
        notifier.register(
            "TASK_DONE",
            Arc::new(move |event: &NotifierEvent| {
                if let NotifierEvent::TaskDone { workflow_id, task_id, info } = event {
                    let mut mgr = done_manager.lock();
                    if let Err(e) = mgr.update(workflow_id, task_id, info.clone()) {
                        tracing::warn!(workflow_id = %workflow_id, task_id = %task_id, error = %e, "TASK_DONE update failed");
                    }
                }
            }),
        );

        Self { manager, service: ServiceManager::new(), notifier, running: true }
    }

    /// Register a work-queue back-end: wires `SCHEDULE_TASK`/`CANCEL_TASK`
    /// receivers and adds it to the service registry (spec.md §4.5, C7).
    ///
    /// spec.md does not define how a `SCHEDULE_TASK`/`CANCEL_TASK` event
    /// picks among several registered back-ends, so every registered
    /// back-end receives every event (see DESIGN.md).
    pub fn register_backend(&mut self, adapter: Arc<dyn WorkQueueAdapter>) {
        let schedule_adapter = adapter.clone();
        self.notifier.register(
            "SCHEDULE_TASK",
            Arc::new(move |event: &NotifierEvent| {
                if let NotifierEvent::ScheduleTask { workflow_id, tasks, priority } = event {
                    let adapter = schedule_adapter.clone();
                    let workflow_id = workflow_id.clone();
                    let tasks = tasks.clone();
                    let priority = *priority;
                    tokio::spawn(async move {
                        if let Err(e) = adapter.schedule(&workflow_id, &tasks, priority).await {
                            tracing::warn!(workflow_id = %workflow_id, error = %e, "schedule failed");
                        }
                    });
                }
            }),
        );

        let cancel_adapter = adapter.clone();
        self.notifier.register(
            "CANCEL_TASK",
            Arc::new(move |event: &NotifierEvent| {
                if let NotifierEvent::CancelTask { workflow_id } = event {
                    let adapter = cancel_adapter.clone();
                    let workflow_id = workflow_id.clone();
                    tokio::spawn(async move {
                        if let Err(e) = adapter.cancel(&workflow_id).await {
                            tracing::warn!(workflow_id = %workflow_id, error = %e, "cancel failed");
                        }
                    });
                }
            }),
        );

        self.service.register(adapter);
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    /// spec.md §4.4 boot-time `cleanup`: fail every row left non-terminal by
    /// a prior run.
    pub fn cleanup(&self) -> Result<(), EngineError> {
        self.manager.lock().cleanup()
    }

    /// Route one decoded request to its handler (spec.md §4.8 "Registered
    /// handlers"). Never panics: handler errors become a `Failed` reply.
    pub async fn handle(&mut self, request: Request) -> Response {
        match request.request.as_str() {
            "shutdown" => {
                self.running = false;
                self.service.stop().await;
                Response::status("OK")
            }
            "health" => Response::status("OK"),
            "schedule" => self.submit(request.data),
            "restart" => self.restart(request.data),
            "cancel" => self.cancel(request.data),
            "workflows" => self.workflows(request.data),
            "get_status" => self.get_status(request.data),
            other => Response::failed(format!("unknown request \"{other}\"")),
        }
    }

    fn submit(&self, data: serde_json::Value) -> Response {
        let mut mgr = self.manager.lock();
        match mgr.submit(&self.notifier, data) {
            Ok(SubmitOutcome::Scheduled { id }) => Response::scheduled(id),
            Ok(SubmitOutcome::Error { errors }) => Response::rejected(errors),
            Err(e) => Response::failed(e),
        }
    }

    fn restart(&self, data: serde_json::Value) -> Response {
        let id = match required_id(&data) {
            Ok(id) => id,
            Err(resp) => return resp,
        };
        let mut mgr = self.manager.lock();
        match mgr.restart(&self.notifier, &id) {
            Ok(status) => Response::status(status.to_string()),
            Err(e) => Response::failed(e),
        }
    }

    fn cancel(&self, data: serde_json::Value) -> Response {
        let id = match required_id(&data) {
            Ok(id) => id,
            Err(resp) => return resp,
        };
        let mut mgr = self.manager.lock();
        match mgr.cancel(&self.notifier, &id) {
            Ok(status) => Response::status(status.to_string()),
            Err(e) => Response::failed(e),
        }
    }

    fn workflows(&self, data: serde_json::Value) -> Response {
        let ids: Option<Vec<i64>> = data
            .get("ids")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(serde_json::Value::as_i64).collect());
        let status = data
            .get("status")
            .and_then(|v| v.as_str())
            .and_then(parse_status);

        let mgr = self.manager.lock();
        match mgr.list(ids.as_deref(), status) {
            Ok(rows) => {
                let values = rows
                    .into_iter()
                    .map(|row| serde_json::to_value(row).unwrap_or(serde_json::Value::Null))
                    .collect();
                Response::with_workflows("OK", values)
            }
            Err(e) => Response::failed(e),
        }
    }

    fn get_status(&self, data: serde_json::Value) -> Response {
        let id = match required_id(&data) {
            Ok(id) => id,
            Err(resp) => return resp,
        };
        let mut mgr = self.manager.lock();
        match mgr.status(&id) {
            Ok((status, states)) => {
                let jobs = states
                    .into_iter()
                    .map(|state| serde_json::to_value(state).unwrap_or(serde_json::Value::Null))
                    .collect();
                Response::with_jobs(status.to_string(), jobs)
            }
            Err(e) => Response::failed(e),
        }
    }

    /// Accept connections, drain the request channel against a periodic
    /// service tick, and run until `shutdown` flips `running` (spec.md §4.8,
    /// §5 "Scheduling model": the control loop is the only task that ever
    /// touches workflow/task state, so no further locking is needed there).
    pub async fn run(mut self, port: u16) -> std::io::Result<()> {
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        let (tx, mut rx) = mpsc::channel::<(Request, oneshot::Sender<Response>)>(64);
        tokio::spawn(accept_loop(listener, tx));

        self.service.start().await;
        let mut ticker = tokio::time::interval(TICK);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        while self.running {
            tokio::select! {
                Some((request, reply)) = rx.recv() => {
                    let response = self.handle(request).await;
                    let _ = reply.send(response);
                }
                _ = ticker.tick() => {
                    let statuses = self.manager.lock().active_statuses();
                    self.service.update(&self.notifier, &statuses).await;
                }
            }
        }
        Ok(())
    }
}

fn required_id(data: &serde_json::Value) -> Result<String, Response> {
    data.get("id")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| Response::failed("missing \"id\""))
}

fn parse_status(raw: &str) -> Option<WorkflowStatus> {
    serde_json::from_value(serde_json::Value::String(raw.to_string())).ok()
}

async fn accept_loop(
    listener: TcpListener,
    tx: mpsc::Sender<(Request, oneshot::Sender<Response>)>,
) {
    loop {
        let (socket, _) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
                continue;
            }
        };
        tokio::spawn(handle_connection(socket, tx.clone()));
    }
}

/// Reads and replies to every request on one connection until the client
/// disconnects (spec.md §4.8: "Each iteration ... If a message arrived").
async fn handle_connection(
    mut socket: TcpStream,
    tx: mpsc::Sender<(Request, oneshot::Sender<Response>)>,
) {
    loop {
        let request = match read_request(&mut socket).await {
            Ok(r) => r,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::UnexpectedEof {
                    tracing::warn!(error = %e, "failed to read request");
                }
                return;
            }
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        if tx.send((request, reply_tx)).await.is_err() {
            return;
        }
        let response = reply_rx.await.unwrap_or_else(|_| Response::failed("daemon shut down"));
        if write_response(&mut socket, &response).await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
