//! Consensus scores recorded by a human reconciler

use crate::{ConsensusId, CriterionId, ProjectId, ScoreId, ScoreValue, UserId, VendorId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single agreed rating for a vendor/criterion pair.
///
/// At most one exists per (project, vendor, criterion). It is never derived
/// automatically; `source_score_ids` is the snapshot of individual scores the
/// reconciler was looking at when it was saved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsensusScore {
    pub id: ConsensusId,
    pub project_id: ProjectId,
    pub vendor_id: VendorId,
    pub criterion_id: CriterionId,
    pub consensus_value: ScoreValue,
    pub rationale: String,
    pub determined_by: UserId,
    pub source_score_ids: Vec<ScoreId>,
    pub determined_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reconciler input for a consensus save
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsensusInput {
    pub vendor_id: VendorId,
    pub criterion_id: CriterionId,
    pub consensus_value: i64,
    pub rationale: String,
    pub determined_by: UserId,
}

impl ConsensusInput {
    pub fn new(
        vendor_id: VendorId,
        criterion_id: CriterionId,
        consensus_value: i64,
        rationale: impl Into<String>,
        determined_by: UserId,
    ) -> Self {
        Self {
            vendor_id,
            criterion_id,
            consensus_value,
            rationale: rationale.into(),
            determined_by,
        }
    }
}

/// How a saved consensus relates to the scores as they are now.
///
/// Purely informational: a stale consensus stays determined until someone
/// reconciles the pair again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConsensusReview {
    Absent,
    Current,
    Stale {
        /// Source scores edited after the consensus was determined
        changed: Vec<ScoreId>,
        /// Source scores no longer part of the comparison set
        missing: Vec<ScoreId>,
        /// Scores in the comparison set that the consensus never saw
        added: Vec<ScoreId>,
    },
}

impl ConsensusReview {
    pub fn is_stale(&self) -> bool {
        matches!(self, ConsensusReview::Stale { .. })
    }
}
