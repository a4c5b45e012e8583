//! The privileged-executor contract.
//!
//! The router treats the executor as opaque: one liveness probe and one
//! request/response RPC. How the executor implements capability
//! operations is not this crate's business; transports live in
//! `runic-client`, and tests implement the trait directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request sent to the privileged executor: the full source text and the
/// caller's current state document. The executor re-parses and runs the
/// whole script itself — the safe prefix is never run locally first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub source: String,
    pub state: serde_json::Value,
}

/// Response from the privileged executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub success: bool,
    #[serde(default)]
    pub output_lines: Vec<String>,
    /// The executor's state after the run. `None` means unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<serde_json::Value>,
    /// Error description when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Transport-level errors from an executor client.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The executor could not be reached.
    #[error("executor unreachable: {0}")]
    Unreachable(String),
    /// The executor answered with something other than the contract.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// A privileged executor reachable from the router.
#[async_trait]
pub trait PrivilegedExecutor: Send + Sync {
    /// Lightweight liveness check. Called freshly before every
    /// delegation — never cached, since the remote may have come online
    /// (or gone away) since the last run.
    async fn probe(&self) -> bool;

    /// Execute a script remotely. A single exchange, not a stream.
    async fn execute(&self, request: ExecuteRequest) -> Result<ExecuteResponse, ExecutorError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_wire_shape() {
        let request = ExecuteRequest {
            source: "FILE.READ(\"a\")".into(),
            state: json!({"k": 1}),
        };
        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(wire, json!({"source": "FILE.READ(\"a\")", "state": {"k": 1}}));
    }

    #[test]
    fn response_optional_fields_default() {
        let response: ExecuteResponse =
            serde_json::from_value(json!({"success": true})).unwrap();
        assert!(response.success);
        assert!(response.output_lines.is_empty());
        assert!(response.state.is_none());
        assert!(response.error.is_none());
    }

    #[test]
    fn response_round_trip() {
        let response = ExecuteResponse {
            success: false,
            output_lines: vec!["partial".into()],
            state: Some(json!({"n": 2})),
            error: Some("file not found".into()),
        };
        let wire = serde_json::to_string(&response).unwrap();
        let back: ExecuteResponse = serde_json::from_str(&wire).unwrap();
        assert_eq!(back, response);
    }
}
