//! Error types for the evaluation engine

use procure_storage::StorageError;
use procure_types::{
    CriterionId, InvalidCriterion, InvalidScoreValue, InvalidTransition, VendorId, VendorStatus,
};

/// Errors surfaced by engine operations.
///
/// Validation variants are raised before any write is attempted. Store
/// failures other than "not found" and "already exists" are carried
/// unmodified in `StoreUnavailable`; the engine never retries.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    InvalidScoreValue(#[from] InvalidScoreValue),

    #[error(transparent)]
    InvalidCriterion(#[from] InvalidCriterion),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Another writer moved the vendor between our read and our write.
    #[error("vendor {vendor_id} is no longer in status {expected}; reload and retry")]
    StatusConflict {
        vendor_id: VendorId,
        expected: VendorStatus,
    },

    #[error("no scores to reconcile for vendor {vendor_id} on criterion {criterion_id}")]
    NothingToReconcile {
        vendor_id: VendorId,
        criterion_id: CriterionId,
    },

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] StorageError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<StorageError> for EvaluationError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => EvaluationError::NotFound(what),
            StorageError::Conflict(what) => EvaluationError::AlreadyExists(what),
            other => EvaluationError::StoreUnavailable(other),
        }
    }
}

impl From<config::ConfigError> for EvaluationError {
    fn from(err: config::ConfigError) -> Self {
        EvaluationError::Config(err.to_string())
    }
}

impl EvaluationError {
    /// Whether offering the user a manual retry makes sense.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EvaluationError::StoreUnavailable(StorageError::Backend(_))
                | EvaluationError::StatusConflict { .. }
        )
    }
}

/// Result type alias for engine operations
pub type EvaluationResult<T> = Result<T, EvaluationError>;
