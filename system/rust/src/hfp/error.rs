//! Errors surfaced by coordinator operations

use thiserror::Error;

use crate::hfp::transport::TransportError;

/// Result of a coordinator operation
pub type CoordinatorResult<T = ()> = Result<T, CoordinatorError>;

/// Why a coordinator operation did not complete. Nothing is retried automatically;
/// the operator decides whether to re-issue the command.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CoordinatorError {
    /// No slot, an ambiguous slot, or an out-of-range value was supplied.
    /// No transport call was issued.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// A collaborator returned a negative status for `op`
    #[error("{op} failed with status {code}")]
    TransportRejected {
        /// Name of the originating call
        op: &'static str,
        /// Status returned by the collaborator
        code: i32,
    },

    /// The request competes with the other slot for an exclusive resource.
    /// No state was changed; one side has to be resolved manually first.
    #[error("Resource conflict: {0}")]
    ResourceConflict(String),

    /// Stack-level failure, propagated as reported
    #[error("Stack error: {0}")]
    Stack(TransportError),

    /// The coordinator event loop is not accepting work
    #[error("Coordinator is not running")]
    NotRunning,
}

impl CoordinatorError {
    /// Maps a failed collaborator call onto the error taxonomy
    pub(crate) fn from_transport(op: &'static str, err: TransportError) -> Self {
        match err {
            TransportError::Rejected(code) => CoordinatorError::TransportRejected { op, code },
            e => CoordinatorError::Stack(e),
        }
    }
}
