//! HTTP client for a remote privileged executor.
//!
//! Implements the kernel's [`PrivilegedExecutor`] contract over plain
//! HTTP: `GET {base}/healthz` for the reachability probe and
//! `POST {base}/execute` for the single request/response exchange. The
//! transport is blocking (ureq) and driven through `spawn_blocking`;
//! the router adds its own delegation timeout on top of the agent's
//! transport timeout.

use std::time::Duration;

use async_trait::async_trait;

use runic_kernel::executor::{ExecuteRequest, ExecuteResponse, ExecutorError, PrivilegedExecutor};

use crate::traits::{ClientError, ClientResult};

/// Default per-request transport timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A privileged executor reachable over HTTP.
///
/// # Example
///
/// ```ignore
/// use runic_client::HttpExecutor;
/// use runic_kernel::{ExecutionRouter, RouterConfig};
/// use std::sync::Arc;
///
/// let executor = Arc::new(HttpExecutor::new("http://127.0.0.1:7433")?);
/// let router = ExecutionRouter::with_executor(RouterConfig::default(), executor);
/// ```
pub struct HttpExecutor {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpExecutor {
    /// Create a client for the executor at `base_url`.
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit transport timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::Connection(format!(
                "executor base url must be http(s), got {base_url:?}"
            )));
        }
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Ok(Self { agent, base_url })
    }

    fn health_url(&self) -> String {
        format!("{}/healthz", self.base_url)
    }

    fn execute_url(&self) -> String {
        format!("{}/execute", self.base_url)
    }
}

#[async_trait]
impl PrivilegedExecutor for HttpExecutor {
    async fn probe(&self) -> bool {
        let agent = self.agent.clone();
        let url = self.health_url();
        let reachable = tokio::task::spawn_blocking(move || {
            matches!(agent.get(&url).call(), Ok(response) if response.status() == 200)
        })
        .await
        .unwrap_or(false);
        tracing::debug!(url = %self.health_url(), reachable, "executor probe");
        reachable
    }

    async fn execute(&self, request: ExecuteRequest) -> Result<ExecuteResponse, ExecutorError> {
        let agent = self.agent.clone();
        let url = self.execute_url();
        tokio::task::spawn_blocking(move || match agent.post(&url).send_json(&request) {
            Ok(response) => response
                .into_json::<ExecuteResponse>()
                .map_err(|e| ExecutorError::Protocol(format!("invalid executor response: {e}"))),
            Err(ureq::Error::Status(code, _)) => {
                Err(ExecutorError::Protocol(format!("executor returned HTTP {code}")))
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(ExecutorError::Unreachable(transport.to_string()))
            }
        })
        .await
        .map_err(|e| ExecutorError::Protocol(format!("transport task failed: {e}")))?
    }
}
