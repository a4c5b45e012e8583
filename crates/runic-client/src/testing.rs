//! Scripted executor for tests and offline embedding.
//!
//! `ScriptedExecutor` implements the kernel's [`PrivilegedExecutor`]
//! contract with canned responses and records every request it
//! receives, so embedders can test their routing and state-sync logic
//! without a running executor service.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use runic_kernel::executor::{ExecuteRequest, ExecuteResponse, ExecutorError, PrivilegedExecutor};

/// An executor that answers from a queue of canned responses.
///
/// When the queue is empty, it answers with an empty success (no output,
/// state unchanged). Reachability is toggleable to exercise the
/// router's probe path.
#[derive(Default)]
pub struct ScriptedExecutor {
    reachable: AtomicBool,
    responses: Mutex<VecDeque<ExecuteResponse>>,
    requests: Mutex<Vec<ExecuteRequest>>,
}

impl ScriptedExecutor {
    /// A reachable executor with no queued responses.
    pub fn new() -> Self {
        Self {
            reachable: AtomicBool::new(true),
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a response for the next exchange.
    pub fn respond_with(self, response: ExecuteResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Toggle probe reachability.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ExecuteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PrivilegedExecutor for ScriptedExecutor {
    async fn probe(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    async fn execute(&self, request: ExecuteRequest) -> Result<ExecuteResponse, ExecutorError> {
        self.requests.lock().unwrap().push(request);
        let response = self.responses.lock().unwrap().pop_front();
        Ok(response.unwrap_or(ExecuteResponse {
            success: true,
            output_lines: Vec::new(),
            state: None,
            error: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn answers_from_the_queue_then_defaults() {
        let executor = ScriptedExecutor::new().respond_with(ExecuteResponse {
            success: false,
            output_lines: vec!["queued".into()],
            state: None,
            error: Some("boom".into()),
        });

        let request = ExecuteRequest { source: "MESH.SEND(1)".into(), state: json!({}) };
        let first = executor.execute(request.clone()).await.unwrap();
        assert!(!first.success);
        assert_eq!(first.output_lines, ["queued"]);

        let second = executor.execute(request).await.unwrap();
        assert!(second.success);
        assert!(second.output_lines.is_empty());
    }

    #[tokio::test]
    async fn records_requests_in_order() {
        let executor = ScriptedExecutor::new();
        for source in ["FILE.READ(1)", "FILE.READ(2)"] {
            executor
                .execute(ExecuteRequest { source: source.into(), state: json!({"n": 1}) })
                .await
                .unwrap();
        }
        let requests = executor.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].source, "FILE.READ(1)");
        assert_eq!(requests[1].state, json!({"n": 1}));
    }

    #[tokio::test]
    async fn reachability_toggles() {
        let executor = ScriptedExecutor::new();
        assert!(executor.probe().await);
        executor.set_reachable(false);
        assert!(!executor.probe().await);
    }
}
