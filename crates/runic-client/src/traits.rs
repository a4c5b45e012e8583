//! Common error surface for executor clients.

use thiserror::Error;

/// Result type for client construction and configuration.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while setting up an executor client.
///
/// Transport errors during an exchange surface through the kernel's
/// `ExecutorError` instead, so the router can map them onto its own
/// taxonomy.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The endpoint configuration is unusable.
    #[error("connection error: {0}")]
    Connection(String),

    /// Other errors.
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}
