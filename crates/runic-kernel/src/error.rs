//! The error taxonomy surfaced on routed results.
//!
//! Errors cross the router boundary as a value on `RoutedResult`, never
//! as a propagated `Err` — the embedder always gets a result back.

use thiserror::Error;

use crate::interpreter::EvalError;

/// What went wrong with a routed run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    /// Malformed script (strict mode only). Recoverable by the embedder.
    #[error("parse error: {0}")]
    Parse(String),

    /// A loop ran past the shared iteration bound; the run was aborted.
    #[error("iteration limit of {limit} exceeded")]
    IterationLimitExceeded { limit: u64 },

    /// Delegation was required but no executor answered the probe.
    #[error("privileged executor unavailable")]
    PrivilegedUnavailable,

    /// The privileged exchange did not complete in time. No partial
    /// state is applied.
    #[error("privileged execution timed out")]
    PrivilegedTimeout,

    /// A capability call reached the local interpreter. This is an
    /// internal-invariant violation (a defect), not a user error.
    #[error("capability misuse: {0}")]
    CapabilityMisuse(String),

    /// Script-level evaluation failure (type errors, undefined names,
    /// resource exhaustion other than the iteration bound, or a failure
    /// reported by the privileged executor).
    #[error("evaluation error: {0}")]
    Evaluation(String),
}

impl ErrorKind {
    /// Stable machine-readable name for embedders that match on kinds.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Parse(_) => "ParseError",
            ErrorKind::IterationLimitExceeded { .. } => "IterationLimitExceeded",
            ErrorKind::PrivilegedUnavailable => "PrivilegedUnavailable",
            ErrorKind::PrivilegedTimeout => "PrivilegedTimeout",
            ErrorKind::CapabilityMisuse(_) => "CapabilityMisuse",
            ErrorKind::Evaluation(_) => "EvaluationError",
        }
    }
}

impl From<EvalError> for ErrorKind {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::IterationLimit { limit } => ErrorKind::IterationLimitExceeded { limit },
            EvalError::CapabilityMisuse { .. } => ErrorKind::CapabilityMisuse(err.to_string()),
            other => ErrorKind::Evaluation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorKind::Parse("x".into()).code(), "ParseError");
        assert_eq!(
            ErrorKind::IterationLimitExceeded { limit: 10_000 }.code(),
            "IterationLimitExceeded"
        );
        assert_eq!(ErrorKind::PrivilegedUnavailable.code(), "PrivilegedUnavailable");
        assert_eq!(ErrorKind::PrivilegedTimeout.code(), "PrivilegedTimeout");
    }

    #[test]
    fn eval_errors_map_onto_the_taxonomy() {
        assert_eq!(
            ErrorKind::from(EvalError::IterationLimit { limit: 7 }),
            ErrorKind::IterationLimitExceeded { limit: 7 }
        );
        assert!(matches!(
            ErrorKind::from(EvalError::CapabilityMisuse {
                namespace: "FILE".into(),
                operation: "READ".into()
            }),
            ErrorKind::CapabilityMisuse(_)
        ));
        assert!(matches!(
            ErrorKind::from(EvalError::UndefinedVariable("x".into())),
            ErrorKind::Evaluation(_)
        ));
    }
}
