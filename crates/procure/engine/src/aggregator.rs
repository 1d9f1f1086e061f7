//! Score aggregation and per-vendor scorecards.
//!
//! `variance` throughout is the range `max - min` of the values, not the
//! statistical variance. A pair with no scores yields `Comparison::NoScores`
//! so callers can tell "not yet comparable" apart from a failure.

use std::sync::Arc;

use procure_storage::ProcurementStorage;
use procure_types::{
    Comparison, ConsensusScore, Criterion, CriterionId, ProjectId, Score, ScoreComparison,
    ScoreFilter, ScoreStatus, VarianceThresholds, VendorId,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::EvaluationResult;
use crate::lookup;

/// Computes descriptive statistics over the scores of a vendor
#[derive(Clone)]
pub struct ScoreAggregator {
    storage: Arc<dyn ProcurementStorage>,
    thresholds: VarianceThresholds,
    submitted_only: bool,
}

/// One criterion's line in a scorecard
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScorecardRow {
    pub criterion: Criterion,
    pub comparison: Comparison,
    pub consensus: Option<ConsensusScore>,
}

impl ScorecardRow {
    /// Consensus value when one is determined, else the average.
    pub fn effective_value(&self) -> Option<f64> {
        match (&self.consensus, self.comparison.scored()) {
            (Some(consensus), _) => Some(f64::from(consensus.consensus_value.get())),
            (None, Some(scored)) => Some(scored.average),
            (None, None) => None,
        }
    }
}

/// Every criterion of a project, evaluated for one vendor
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VendorScorecard {
    pub vendor_id: VendorId,
    pub rows: Vec<ScorecardRow>,
    /// Weighted mean of the effective values. `None` when nothing is scored.
    pub weighted_total: Option<f64>,
    /// Number of rows that contribute to the total
    pub scored_criteria: usize,
}

impl ScoreAggregator {
    pub fn new(
        storage: Arc<dyn ProcurementStorage>,
        thresholds: VarianceThresholds,
        submitted_only: bool,
    ) -> Self {
        Self {
            storage,
            thresholds,
            submitted_only,
        }
    }

    pub fn thresholds(&self) -> VarianceThresholds {
        self.thresholds
    }

    /// Compare every evaluator's score for a vendor/criterion pair.
    #[instrument(skip(self), fields(project_id = %project_id, vendor_id = %vendor_id, criterion_id = %criterion_id))]
    pub async fn compare(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        criterion_id: &CriterionId,
    ) -> EvaluationResult<Comparison> {
        lookup::live_vendor(self.storage.as_ref(), project_id, vendor_id).await?;
        lookup::criterion(self.storage.as_ref(), project_id, criterion_id).await?;

        let scores = self
            .storage
            .list_scores(project_id, vendor_id, &self.filter_for(criterion_id))
            .await?;
        Ok(summarize(scores, &self.thresholds))
    }

    /// Per-criterion comparison and consensus for a vendor, with a weighted total.
    #[instrument(skip(self), fields(project_id = %project_id, vendor_id = %vendor_id))]
    pub async fn scorecard(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
    ) -> EvaluationResult<VendorScorecard> {
        lookup::live_vendor(self.storage.as_ref(), project_id, vendor_id).await?;

        let criteria = self.storage.list_criteria(project_id).await?;
        let mut scores = self
            .storage
            .list_scores(project_id, vendor_id, &self.base_filter())
            .await?;
        let mut consensus = self.storage.list_consensus(project_id, vendor_id).await?;

        let mut rows = Vec::with_capacity(criteria.len());
        for criterion in criteria {
            let (mine, rest): (Vec<_>, Vec<_>) = scores
                .into_iter()
                .partition(|s| s.criterion_id == criterion.id);
            scores = rest;

            let agreed = consensus
                .iter()
                .position(|c| c.criterion_id == criterion.id)
                .map(|i| consensus.swap_remove(i));

            rows.push(ScorecardRow {
                comparison: summarize(mine, &self.thresholds),
                consensus: agreed,
                criterion,
            });
        }

        let (weighted_total, scored_criteria) = weighted_total(&rows);
        Ok(VendorScorecard {
            vendor_id: vendor_id.clone(),
            rows,
            weighted_total,
            scored_criteria,
        })
    }

    fn base_filter(&self) -> ScoreFilter {
        let filter = ScoreFilter::default();
        if self.submitted_only {
            filter.with_status(ScoreStatus::Submitted)
        } else {
            filter
        }
    }

    fn filter_for(&self, criterion_id: &CriterionId) -> ScoreFilter {
        ScoreFilter {
            criterion_id: Some(criterion_id.clone()),
            ..self.base_filter()
        }
    }
}

/// Descriptive statistics over an already-selected set of scores.
pub fn summarize(scores: Vec<Score>, thresholds: &VarianceThresholds) -> Comparison {
    let values: Vec<u8> = scores.iter().map(|s| s.value.get()).collect();
    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return Comparison::NoScores;
    };

    let count = values.len();
    let sum: u32 = values.iter().map(|v| u32::from(*v)).sum();
    let average = f64::from(sum) / count as f64;
    let variance = f64::from(max - min);

    Comparison::Scored(ScoreComparison {
        scores,
        count,
        average,
        min,
        max,
        variance,
        tier: thresholds.classify(variance),
    })
}

fn weighted_total(rows: &[ScorecardRow]) -> (Option<f64>, usize) {
    let mut weighted = 0.0;
    let mut weights = 0.0;
    let mut scored = 0;
    for row in rows {
        if let Some(value) = row.effective_value() {
            weighted += value * row.criterion.weight;
            weights += row.criterion.weight;
            scored += 1;
        }
    }
    if scored == 0 {
        (None, 0)
    } else {
        (Some(weighted / weights), scored)
    }
}
