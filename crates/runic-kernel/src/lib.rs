//! runic-kernel: the core of runic.
//!
//! Runic makes documents executable: fenced script blocks read and write
//! a persistent key-value state, do arithmetic and control flow, and
//! invoke named capability operations (file access, mesh actions,
//! knowledge-base queries). This crate provides:
//!
//! - **Lexer**: tokenizes script source using logos
//! - **Parser**: recursive-descent AST construction, permissive or strict
//! - **AST**: closed sum types for the tree
//! - **Interpreter**: tree-walking evaluation with bounded iterations
//! - **Classifier**: static capability analysis before any evaluation
//! - **Router**: local/privileged execution placement and state sync
//!
//! The embedding surface is [`ExecutionRouter`]: `run` a script against
//! a state document, `update_state` between runs. Capability operations
//! themselves live behind the [`PrivilegedExecutor`] trait; transports
//! are in the `runic-client` crate.

pub mod ast;
pub mod classifier;
pub mod error;
pub mod executor;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod router;
pub mod state;

pub use classifier::{classify, requires_privileged, Classification, PRIVILEGED_NAMESPACES};
pub use error::ErrorKind;
pub use executor::{ExecuteRequest, ExecuteResponse, ExecutorError, PrivilegedExecutor};
pub use interpreter::{interpret, ExecutionContext};
pub use parser::{parse, parse_full, ParseMode};
pub use router::{ExecutedVia, ExecutionRouter, RoutedResult, RouterConfig};
pub use state::StateDocument;
