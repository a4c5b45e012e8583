//! The execution router — the runtime's host embedding surface.
//!
//! One script run moves through a small state machine:
//!
//! ```text
//! Idle ──parse──▶ Classified ──┬──▶ LocalExecuting ──▶ Completed | Failed
//!                              └──▶ AwaitingPrivileged ──▶ Completed | Failed
//! ```
//!
//! Classification happens before any evaluation: a script that needs
//! privileged execution is never partially run locally, so the safe
//! prefix of a mixed script cannot produce duplicated side effects.
//! Once delegation occurs the executor is the sole source of truth for
//! state — its returned document overwrites the local one wholesale,
//! never a field-by-field merge, because it may have performed
//! capability side effects the local context has no way to reconstruct.
//!
//! Errors never cross this boundary as `Err`: the embedder always gets
//! a [`RoutedResult`] value with the error as a field.
//!
//! Cancellation is caller-driven: dropping the future returned by
//! [`ExecutionRouter::run`] abandons a pending privileged exchange, and
//! the in-flight response is discarded without mutating held state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::classifier::classify;
use crate::error::ErrorKind;
use crate::executor::{ExecuteRequest, PrivilegedExecutor};
use crate::interpreter::{
    interpret, ExecutionContext, DEFAULT_CALL_DEPTH_LIMIT, DEFAULT_ITERATION_LIMIT,
};
use crate::parser::{parse_full, ParseMode};
use crate::state::StateDocument;

/// Which layer actually executed the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutedVia {
    /// The local sandboxed interpreter.
    Local,
    /// The privileged executor (attempted; also set when delegation
    /// itself failed, since classification had already ruled out the
    /// local path).
    Privileged,
}

/// The unified result of one routed script run.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedResult {
    pub succeeded: bool,
    /// Lines printed before completion or failure — partial output is
    /// preserved, not discarded.
    pub output_lines: Vec<String>,
    /// State after the last successful execution layer. A failed run
    /// returns the initial state unchanged.
    pub final_state: StateDocument,
    pub executed_via: ExecutedVia,
    pub error: Option<ErrorKind>,
}

impl RoutedResult {
    fn completed(via: ExecutedVia, output_lines: Vec<String>, final_state: StateDocument) -> Self {
        Self { succeeded: true, output_lines, final_state, executed_via: via, error: None }
    }

    fn failed(
        via: ExecutedVia,
        output_lines: Vec<String>,
        final_state: StateDocument,
        error: ErrorKind,
    ) -> Self {
        Self { succeeded: false, output_lines, final_state, executed_via: via, error: Some(error) }
    }
}

/// Router configuration.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Permissive (default) or strict lex/parse behavior.
    pub parse_mode: ParseMode,
    /// Shared loop-iteration bound per run.
    pub iteration_limit: u64,
    /// User-function call depth bound per run.
    pub call_depth_limit: u32,
    /// Timeout for the privileged exchange.
    pub delegation_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            parse_mode: ParseMode::Permissive,
            iteration_limit: DEFAULT_ITERATION_LIMIT,
            call_depth_limit: DEFAULT_CALL_DEPTH_LIMIT,
            delegation_timeout: Duration::from_secs(30),
        }
    }
}

impl RouterConfig {
    /// Config that rejects malformed scripts instead of degrading.
    pub fn strict() -> Self {
        Self { parse_mode: ParseMode::Strict, ..Self::default() }
    }

    /// Set the parse mode.
    pub fn with_parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = mode;
        self
    }

    /// Set the shared iteration bound.
    pub fn with_iteration_limit(mut self, limit: u64) -> Self {
        self.iteration_limit = limit;
        self
    }

    /// Set the privileged-exchange timeout.
    pub fn with_delegation_timeout(mut self, timeout: Duration) -> Self {
        self.delegation_timeout = timeout;
        self
    }
}

/// Router phases, tracked for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Classified,
    LocalExecuting,
    AwaitingPrivileged,
    Completed,
    Failed,
}

fn transition(phase: &mut Phase, next: Phase) {
    tracing::debug!(from = ?phase, to = ?next, "router transition");
    *phase = next;
}

/// The execution router: classify, place, execute, reconcile.
///
/// This is the runtime's entire embedding surface: [`run`] and
/// [`update_state`] (plus the [`state`] accessor). File formats and
/// persistence are the embedder's responsibility.
///
/// [`run`]: ExecutionRouter::run
/// [`update_state`]: ExecutionRouter::update_state
/// [`state`]: ExecutionRouter::state
pub struct ExecutionRouter {
    config: RouterConfig,
    executor: Option<Arc<dyn PrivilegedExecutor>>,
    /// State held between runs. Replaced by `run`'s argument at entry,
    /// by a successful run's final state at exit, and by
    /// `update_state` in between.
    held_state: RwLock<StateDocument>,
}

impl ExecutionRouter {
    /// A router with no privileged executor: capability scripts fail
    /// with `PrivilegedUnavailable`.
    pub fn new(config: RouterConfig) -> Self {
        Self { config, executor: None, held_state: RwLock::new(StateDocument::new()) }
    }

    /// A router that can delegate to the given executor.
    pub fn with_executor(config: RouterConfig, executor: Arc<dyn PrivilegedExecutor>) -> Self {
        Self { config, executor: Some(executor), held_state: RwLock::new(StateDocument::new()) }
    }

    /// Push externally-changed state between runs (e.g. after the
    /// embedder mutated state through its own UI).
    pub async fn update_state(&self, new_state: StateDocument) {
        *self.held_state.write().await = new_state;
    }

    /// The state currently held between runs.
    pub async fn state(&self) -> StateDocument {
        self.held_state.read().await.clone()
    }

    /// Run one script against the given state document.
    ///
    /// Never returns an error: failures come back as a `RoutedResult`
    /// with `succeeded == false` and an [`ErrorKind`].
    #[tracing::instrument(level = "info", skip(self, source, initial_state), fields(source_len = source.len()))]
    pub async fn run(&self, source: &str, initial_state: StateDocument) -> RoutedResult {
        let mut phase = Phase::Idle;
        *self.held_state.write().await = initial_state.clone();

        let (program, issues) = parse_full(source);
        if self.config.parse_mode == ParseMode::Strict && !issues.is_empty() {
            let message = issues
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            transition(&mut phase, Phase::Failed);
            return RoutedResult::failed(
                ExecutedVia::Local,
                Vec::new(),
                initial_state,
                ErrorKind::Parse(message),
            );
        }

        let classification = classify(&program);
        transition(&mut phase, Phase::Classified);
        tracing::debug!(
            privileged = classification.privileged,
            namespaces = ?classification.namespaces,
            "classified script"
        );

        if !classification.privileged {
            transition(&mut phase, Phase::LocalExecuting);
            let mut ctx = ExecutionContext::with_limits(
                initial_state.clone(),
                self.config.iteration_limit,
                self.config.call_depth_limit,
            );
            return match interpret(&program, &mut ctx) {
                Ok(()) => {
                    let (final_state, output_lines) = ctx.into_parts();
                    *self.held_state.write().await = final_state.clone();
                    transition(&mut phase, Phase::Completed);
                    RoutedResult::completed(ExecutedVia::Local, output_lines, final_state)
                }
                Err(err) => {
                    let (_, output_lines) = ctx.into_parts();
                    transition(&mut phase, Phase::Failed);
                    RoutedResult::failed(
                        ExecutedVia::Local,
                        output_lines,
                        initial_state,
                        err.into(),
                    )
                }
            };
        }

        self.delegate(&mut phase, source, initial_state).await
    }

    /// Delegate a privileged script to the executor.
    async fn delegate(
        &self,
        phase: &mut Phase,
        source: &str,
        initial_state: StateDocument,
    ) -> RoutedResult {
        let unavailable = |phase: &mut Phase, state: StateDocument| {
            transition(phase, Phase::Failed);
            RoutedResult::failed(
                ExecutedVia::Privileged,
                Vec::new(),
                state,
                ErrorKind::PrivilegedUnavailable,
            )
        };

        let Some(executor) = &self.executor else {
            tracing::debug!("no privileged executor configured");
            return unavailable(phase, initial_state);
        };

        // Always a fresh probe, never a cached flag: the remote may have
        // come online since the last failure.
        if !executor.probe().await {
            tracing::debug!("privileged executor failed the reachability probe");
            return unavailable(phase, initial_state);
        }

        transition(phase, Phase::AwaitingPrivileged);
        let request = ExecuteRequest {
            source: source.to_string(),
            state: initial_state.as_json().clone(),
        };

        let exchange = tokio::time::timeout(self.config.delegation_timeout, executor.execute(request));
        match exchange.await {
            Err(_elapsed) => {
                // Whatever arrives after this point is discarded; no
                // partial state is applied.
                transition(phase, Phase::Failed);
                RoutedResult::failed(
                    ExecutedVia::Privileged,
                    Vec::new(),
                    initial_state,
                    ErrorKind::PrivilegedTimeout,
                )
            }
            Ok(Err(err)) => {
                tracing::debug!(error = %err, "privileged exchange failed");
                unavailable(phase, initial_state)
            }
            Ok(Ok(response)) => {
                if response.success {
                    let final_state = response
                        .state
                        .map(StateDocument::from_json)
                        .unwrap_or(initial_state);
                    *self.held_state.write().await = final_state.clone();
                    transition(phase, Phase::Completed);
                    RoutedResult::completed(
                        ExecutedVia::Privileged,
                        response.output_lines,
                        final_state,
                    )
                } else {
                    transition(phase, Phase::Failed);
                    let message = response
                        .error
                        .unwrap_or_else(|| "privileged execution failed".to_string());
                    RoutedResult::failed(
                        ExecutedVia::Privileged,
                        response.output_lines,
                        initial_state,
                        ErrorKind::Evaluation(message),
                    )
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{ExecuteResponse, ExecutorError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock executor with a canned response and probe/call counters.
    struct MockExecutor {
        reachable: bool,
        response: ExecuteResponse,
        probes: AtomicUsize,
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl MockExecutor {
        fn new(response: ExecuteResponse) -> Self {
            Self {
                reachable: true,
                response,
                probes: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
                delay: None,
            }
        }

        fn unreachable() -> Self {
            Self {
                reachable: false,
                response: ExecuteResponse {
                    success: true,
                    output_lines: vec![],
                    state: None,
                    error: None,
                },
                probes: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
                delay: None,
            }
        }
    }

    #[async_trait]
    impl PrivilegedExecutor for MockExecutor {
        async fn probe(&self) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.reachable
        }

        async fn execute(
            &self,
            _request: ExecuteRequest,
        ) -> Result<ExecuteResponse, ExecutorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn safe_script_runs_locally() {
        let router = ExecutionRouter::new(RouterConfig::default());
        let result = router.run("SET x = 2 PRINT x", StateDocument::new()).await;
        assert!(result.succeeded);
        assert_eq!(result.executed_via, ExecutedVia::Local);
        assert_eq!(result.output_lines, ["2"]);
    }

    #[tokio::test]
    async fn privileged_script_without_executor_is_unavailable() {
        let router = ExecutionRouter::new(RouterConfig::default());
        let result = router
            .run(r#"FILE.READ("a.txt")"#, StateDocument::new())
            .await;
        assert!(!result.succeeded);
        assert_eq!(result.executed_via, ExecutedVia::Privileged);
        assert_eq!(result.error, Some(ErrorKind::PrivilegedUnavailable));
        assert!(result.output_lines.is_empty());
    }

    #[tokio::test]
    async fn probe_is_fresh_per_run_not_cached() {
        let executor = Arc::new(MockExecutor::unreachable());
        let router = ExecutionRouter::with_executor(RouterConfig::default(), executor.clone());
        for _ in 0..3 {
            let result = router.run("MESH.SEND(1)", StateDocument::new()).await;
            assert_eq!(result.error, Some(ErrorKind::PrivilegedUnavailable));
        }
        assert_eq!(executor.probes.load(Ordering::SeqCst), 3);
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn delegation_overwrites_state_wholesale() {
        let executor = Arc::new(MockExecutor::new(ExecuteResponse {
            success: true,
            output_lines: vec!["remote".into()],
            state: Some(json!({"remote": true})),
            error: None,
        }));
        let router = ExecutionRouter::with_executor(RouterConfig::default(), executor);
        let initial = StateDocument::from_json(json!({"local": 1, "remote": false}));
        let result = router.run("ARCHIVE.STORE(1)", initial).await;
        assert!(result.succeeded);
        assert_eq!(result.executed_via, ExecutedVia::Privileged);
        // Overwrite, not a merge: the local-only key is gone.
        assert_eq!(result.final_state.as_json(), &json!({"remote": true}));
        assert_eq!(router.state().await, result.final_state);
    }

    #[tokio::test]
    async fn delegation_timeout_applies_no_partial_state() {
        let mut executor = MockExecutor::new(ExecuteResponse {
            success: true,
            output_lines: vec!["late".into()],
            state: Some(json!({"late": true})),
            error: None,
        });
        executor.delay = Some(Duration::from_millis(200));
        let config = RouterConfig::default().with_delegation_timeout(Duration::from_millis(20));
        let router = ExecutionRouter::with_executor(config, Arc::new(executor));
        let initial = StateDocument::from_json(json!({"n": 1}));
        let result = router.run("FILE.WRITE(1)", initial.clone()).await;
        assert_eq!(result.error, Some(ErrorKind::PrivilegedTimeout));
        assert_eq!(result.final_state, initial);
        assert!(result.output_lines.is_empty());
        assert_eq!(router.state().await, initial);
    }

    #[tokio::test]
    async fn remote_failure_preserves_remote_output() {
        let executor = Arc::new(MockExecutor::new(ExecuteResponse {
            success: false,
            output_lines: vec!["got this far".into()],
            state: Some(json!({"should": "not apply"})),
            error: Some("file not found".into()),
        }));
        let router = ExecutionRouter::with_executor(RouterConfig::default(), executor);
        let initial = StateDocument::from_json(json!({"n": 1}));
        let result = router.run("FILE.READ(1)", initial.clone()).await;
        assert!(!result.succeeded);
        assert_eq!(result.output_lines, ["got this far"]);
        assert_eq!(result.final_state, initial);
        assert!(matches!(result.error, Some(ErrorKind::Evaluation(ref m)) if m.contains("file not found")));
    }

    #[tokio::test]
    async fn strict_mode_rejects_malformed_scripts() {
        let router = ExecutionRouter::new(RouterConfig::strict());
        let result = router.run("IF x > 1 PRINT x", StateDocument::new()).await;
        assert!(!result.succeeded);
        assert!(matches!(result.error, Some(ErrorKind::Parse(_))));
    }

    #[tokio::test]
    async fn permissive_mode_runs_malformed_scripts() {
        let router = ExecutionRouter::new(RouterConfig::default());
        let result = router
            .run("SET x = 5 IF x > 1 PRINT x", StateDocument::new())
            .await;
        assert!(result.succeeded, "missing ENDIF is tolerated: {:?}", result.error);
        assert_eq!(result.output_lines, ["5"]);
    }

    #[tokio::test]
    async fn failed_local_run_returns_initial_state_and_partial_output() {
        let router = ExecutionRouter::new(RouterConfig::default());
        let initial = StateDocument::from_json(json!({"n": 1}));
        let result = router
            .run(
                "PRINT \"start\" STATE SET n = 2 WHILE TRUE ENDWHILE",
                initial.clone(),
            )
            .await;
        assert!(!result.succeeded);
        assert_eq!(
            result.error,
            Some(ErrorKind::IterationLimitExceeded { limit: 10_000 })
        );
        assert_eq!(result.output_lines, ["start"]);
        // State reflects the last successful layer — none here.
        assert_eq!(result.final_state, initial);
    }

    #[tokio::test]
    async fn update_state_feeds_the_next_run() {
        let router = ExecutionRouter::new(RouterConfig::default());
        router
            .update_state(StateDocument::from_json(json!({"n": 41})))
            .await;
        let held = router.state().await;
        let result = router
            .run("STATE SET n = (STATE GET n) + 1 PRINT STATE GET n", held)
            .await;
        assert!(result.succeeded);
        assert_eq!(result.output_lines, ["42"]);
        assert_eq!(router.state().await.as_json(), &json!({"n": 42}));
    }
}
