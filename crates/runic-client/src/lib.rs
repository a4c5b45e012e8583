//! Client implementations for runic's privileged executor.
//!
//! This crate provides implementations of the kernel's
//! `PrivilegedExecutor` trait:
//!
//! - **HttpExecutor**: talks to a remote executor service over HTTP
//!   (`GET /healthz` probe, `POST /execute` exchange). This is the
//!   transport used by document hosts with a trusted backend.
//!
//! - **ScriptedExecutor**: canned responses for tests and offline use.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use runic_client::HttpExecutor;
//! use runic_kernel::{ExecutionRouter, RouterConfig, StateDocument};
//!
//! let executor = Arc::new(HttpExecutor::new("http://127.0.0.1:7433")?);
//! let router = ExecutionRouter::with_executor(RouterConfig::default(), executor);
//! let result = router.run("FILE.READ(\"notes.md\")", StateDocument::new()).await;
//! ```

mod http;
mod testing;
mod traits;

pub use http::HttpExecutor;
pub use testing::ScriptedExecutor;
pub use traits::{ClientError, ClientResult};
