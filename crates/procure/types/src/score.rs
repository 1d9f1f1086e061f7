//! Individual evaluator scores

use crate::{CriterionId, EvidenceId, InvalidScoreValue, ProjectId, ScoreId, UserId, VendorId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A rating in the closed range [1, 5]. Cannot be constructed outside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ScoreValue(u8);

impl ScoreValue {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 5;

    pub fn new(value: i64) -> Result<Self, InvalidScoreValue> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(InvalidScoreValue(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for ScoreValue {
    type Error = InvalidScoreValue;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScoreValue> for i64 {
    fn from(value: ScoreValue) -> Self {
        i64::from(value.0)
    }
}

impl fmt::Display for ScoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether an evaluator has finalized a score
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreStatus {
    #[default]
    Draft,
    Submitted,
}

impl ScoreStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
        }
    }
}

impl fmt::Display for ScoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One evaluator's rating of one vendor against one criterion.
///
/// Keyed by (vendor, criterion, evaluator); a later save for the same tuple
/// overwrites this record in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub id: ScoreId,
    pub project_id: ProjectId,
    pub vendor_id: VendorId,
    pub criterion_id: CriterionId,
    pub evaluator_id: UserId,
    pub value: ScoreValue,
    #[serde(default)]
    pub rationale: Option<String>,
    pub status: ScoreStatus,
    #[serde(default)]
    pub evidence_ids: Vec<EvidenceId>,
    pub created_at: DateTime<Utc>,
    /// Last content change. Submission does not touch it.
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Score {
    pub fn key(&self) -> ScoreKey {
        ScoreKey {
            project_id: self.project_id.clone(),
            vendor_id: self.vendor_id.clone(),
            criterion_id: self.criterion_id.clone(),
            evaluator_id: self.evaluator_id.clone(),
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.status == ScoreStatus::Submitted
    }
}

/// Uniqueness key of a score
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScoreKey {
    pub project_id: ProjectId,
    pub vendor_id: VendorId,
    pub criterion_id: CriterionId,
    pub evaluator_id: UserId,
}

/// Parameters of a score save, before range validation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoreInput {
    pub vendor_id: VendorId,
    pub criterion_id: CriterionId,
    pub evaluator_id: UserId,
    pub value: i64,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub evidence_ids: Vec<EvidenceId>,
}

impl ScoreInput {
    pub fn new(
        vendor_id: VendorId,
        criterion_id: CriterionId,
        evaluator_id: UserId,
        value: i64,
    ) -> Self {
        Self {
            vendor_id,
            criterion_id,
            evaluator_id,
            value,
            rationale: None,
            evidence_ids: Vec::new(),
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    pub fn with_evidence(mut self, evidence: impl IntoIterator<Item = EvidenceId>) -> Self {
        self.evidence_ids.extend(evidence);
        self
    }

    /// Range-check and build a draft record. The store decides whether it
    /// overwrites an existing tuple and keeps the older id and `created_at`.
    pub fn into_draft(
        self,
        project_id: ProjectId,
        now: DateTime<Utc>,
    ) -> Result<Score, InvalidScoreValue> {
        let value = ScoreValue::new(self.value)?;
        let mut evidence_ids = self.evidence_ids;
        evidence_ids.sort();
        evidence_ids.dedup();
        Ok(Score {
            id: ScoreId::generate(),
            project_id,
            vendor_id: self.vendor_id,
            criterion_id: self.criterion_id,
            evaluator_id: self.evaluator_id,
            value,
            rationale: self.rationale,
            status: ScoreStatus::Draft,
            evidence_ids,
            created_at: now,
            updated_at: now,
            submitted_at: None,
        })
    }
}

/// Optional narrowing of a per-vendor score query
#[derive(Clone, Debug, Default)]
pub struct ScoreFilter {
    pub evaluator_id: Option<UserId>,
    pub criterion_id: Option<CriterionId>,
    pub status: Option<ScoreStatus>,
}

impl ScoreFilter {
    pub fn evaluator(evaluator_id: UserId) -> Self {
        Self {
            evaluator_id: Some(evaluator_id),
            ..Default::default()
        }
    }

    pub fn criterion(criterion_id: CriterionId) -> Self {
        Self {
            criterion_id: Some(criterion_id),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: ScoreStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, score: &Score) -> bool {
        self.evaluator_id
            .as_ref()
            .map_or(true, |e| &score.evaluator_id == e)
            && self
                .criterion_id
                .as_ref()
                .map_or(true, |c| &score.criterion_id == c)
            && self.status.map_or(true, |s| score.status == s)
    }
}
