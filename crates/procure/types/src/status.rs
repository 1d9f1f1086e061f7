//! Vendor lifecycle statuses and the static transition table.
//!
//! The table is the only authority on which moves are legal. `selected` is
//! terminal; `rejected` can only be reactivated back to `identified`.

use crate::InvalidTransition;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Position of a vendor in the procurement pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorStatus {
    Identified,
    LongList,
    ShortList,
    RfpIssued,
    ResponseReceived,
    UnderEvaluation,
    Selected,
    Rejected,
}

impl VendorStatus {
    /// Every status in pipeline order.
    pub const ALL: [VendorStatus; 8] = [
        Self::Identified,
        Self::LongList,
        Self::ShortList,
        Self::RfpIssued,
        Self::ResponseReceived,
        Self::UnderEvaluation,
        Self::Selected,
        Self::Rejected,
    ];

    /// Statuses reachable in one step from `self`.
    pub fn valid_transitions(self) -> &'static [VendorStatus] {
        match self {
            Self::Identified => &[Self::LongList, Self::Rejected],
            Self::LongList => &[Self::ShortList, Self::Rejected],
            Self::ShortList => &[Self::RfpIssued, Self::LongList, Self::Rejected],
            Self::RfpIssued => &[Self::ResponseReceived, Self::Rejected],
            Self::ResponseReceived => &[Self::UnderEvaluation, Self::Rejected],
            Self::UnderEvaluation => &[Self::Selected, Self::Rejected],
            Self::Selected => &[],
            Self::Rejected => &[Self::Identified],
        }
    }

    pub fn can_transition_to(self, target: Self) -> bool {
        self.valid_transitions().contains(&target)
    }

    /// No outgoing edges.
    pub fn is_terminal(self) -> bool {
        self.valid_transitions().is_empty()
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Identified => "Identified",
            Self::LongList => "Long List",
            Self::ShortList => "Short List",
            Self::RfpIssued => "RFP Issued",
            Self::ResponseReceived => "Response Received",
            Self::UnderEvaluation => "Under Evaluation",
            Self::Selected => "Selected",
            Self::Rejected => "Rejected",
        }
    }

    /// Display color as a hex string.
    pub fn color(self) -> &'static str {
        match self {
            Self::Identified => "#94a3b8",
            Self::LongList => "#60a5fa",
            Self::ShortList => "#818cf8",
            Self::RfpIssued => "#f59e0b",
            Self::ResponseReceived => "#fb923c",
            Self::UnderEvaluation => "#a855f7",
            Self::Selected => "#22c55e",
            Self::Rejected => "#ef4444",
        }
    }

    /// Wire name, identical to the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identified => "identified",
            Self::LongList => "long_list",
            Self::ShortList => "short_list",
            Self::RfpIssued => "rfp_issued",
            Self::ResponseReceived => "response_received",
            Self::UnderEvaluation => "under_evaluation",
            Self::Selected => "selected",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for VendorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VendorStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == raw)
            .ok_or_else(|| UnknownStatus(raw.to_string()))
    }
}

/// Raised when parsing a status name that is not in the table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown vendor status `{0}`")]
pub struct UnknownStatus(pub String);

/// Check an edge against the transition table.
pub fn ensure_transition(from: VendorStatus, to: VendorStatus) -> Result<(), InvalidTransition> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(InvalidTransition { from, to })
    }
}
