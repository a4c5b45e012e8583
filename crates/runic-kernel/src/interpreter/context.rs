//! Per-run execution context.
//!
//! A context lives for exactly one script invocation. Variables and
//! function definitions die with it; the state document and the output
//! buffer are read back by the router when the run completes.

use std::collections::HashMap;

use crate::ast::{FuncDef, Value};
use crate::state::StateDocument;

use super::eval::EvalError;

/// Default shared bound on loop iterations.
pub const DEFAULT_ITERATION_LIMIT: u64 = 10_000;

/// Default bound on user-function call depth. Keeps deep recursion from
/// overflowing the host stack during the tree walk.
pub const DEFAULT_CALL_DEPTH_LIMIT: u32 = 64;

/// Execution context: variables, functions, state, and output for one run.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Script variables. A distinct namespace from the state document.
    pub variables: HashMap<String, Value>,
    /// User-defined functions, keyed by their source-spelled name.
    pub functions: HashMap<String, FuncDef>,
    /// The mutable state document for this run.
    pub state: StateDocument,
    /// Ordered lines produced by `PRINT`.
    output: Vec<String>,
    /// Loop iterations charged so far, shared across every loop in the run.
    iterations: u64,
    iteration_limit: u64,
    /// Current user-function call depth.
    call_depth: u32,
    call_depth_limit: u32,
}

impl ExecutionContext {
    /// Create a context seeded with the given state document.
    pub fn new(state: StateDocument) -> Self {
        Self::with_limits(state, DEFAULT_ITERATION_LIMIT, DEFAULT_CALL_DEPTH_LIMIT)
    }

    /// Create a context with explicit resource bounds.
    pub fn with_limits(state: StateDocument, iteration_limit: u64, call_depth_limit: u32) -> Self {
        Self {
            variables: HashMap::new(),
            functions: HashMap::new(),
            state,
            output: Vec::new(),
            iterations: 0,
            iteration_limit,
            call_depth: 0,
            call_depth_limit,
        }
    }

    /// Charge one loop iteration against the shared bound.
    ///
    /// This is the interpreter's sole defense against non-terminating
    /// scripts; there is no per-step timeout.
    pub fn charge_iteration(&mut self) -> Result<(), EvalError> {
        self.iterations += 1;
        if self.iterations > self.iteration_limit {
            Err(EvalError::IterationLimit { limit: self.iteration_limit })
        } else {
            Ok(())
        }
    }

    /// Enter a user-function call; errors once the depth bound is hit so
    /// deep recursion surfaces as resource exhaustion, not a stack
    /// overflow.
    pub fn enter_call(&mut self) -> Result<(), EvalError> {
        if self.call_depth >= self.call_depth_limit {
            return Err(EvalError::RecursionLimit { limit: self.call_depth_limit });
        }
        self.call_depth += 1;
        Ok(())
    }

    /// Leave a user-function call.
    pub fn exit_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    /// Append a printed line to the output buffer.
    pub fn print(&mut self, line: String) {
        self.output.push(line);
    }

    /// Lines printed so far.
    pub fn output_lines(&self) -> &[String] {
        &self.output
    }

    /// Consume the context, returning its state and output.
    pub fn into_parts(self) -> (StateDocument, Vec<String>) {
        (self.state, self.output)
    }
}
