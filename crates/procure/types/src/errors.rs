//! Validation errors raised before anything reaches the store

use crate::VendorStatus;

/// Attempted a status edge that is not in the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move vendor from {from} to {to}")]
pub struct InvalidTransition {
    pub from: VendorStatus,
    pub to: VendorStatus,
}

/// Score or consensus value outside the closed range [1, 5]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("score value {0} is outside the allowed range 1..=5")]
pub struct InvalidScoreValue(pub i64);

/// Criterion definition rejected by validation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidCriterion {
    #[error("criterion name must not be empty")]
    EmptyName,

    #[error("criterion weight must be a positive finite number, got {0}")]
    InvalidWeight(f64),
}
