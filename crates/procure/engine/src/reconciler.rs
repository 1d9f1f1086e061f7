//! Consensus reconciliation.
//!
//! A consensus is always a deliberate human decision. Saving one snapshots
//! the ids of the scores that were on the table at that moment; later score
//! edits never touch it. `review_state` reports drift but leaves the record
//! alone.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use procure_storage::ProcurementStorage;
use procure_types::{
    Comparison, ConsensusId, ConsensusInput, ConsensusReview, ConsensusScore, CriterionId,
    ProjectId, ScoreId, ScoreValue, VendorId,
};
use tracing::{info, instrument};

use crate::aggregator::ScoreAggregator;
use crate::error::{EvaluationError, EvaluationResult};
use crate::events::{EvaluationEvent, EventBus};
use crate::lookup;

/// Records the single agreed score per vendor/criterion pair
#[derive(Clone)]
pub struct ConsensusReconciler {
    storage: Arc<dyn ProcurementStorage>,
    aggregator: ScoreAggregator,
    events: EventBus,
}

impl ConsensusReconciler {
    pub fn new(
        storage: Arc<dyn ProcurementStorage>,
        aggregator: ScoreAggregator,
        events: EventBus,
    ) -> Self {
        Self {
            storage,
            aggregator,
            events,
        }
    }

    /// The consensus for a pair, or `None` while it is still absent.
    pub async fn get_consensus(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        criterion_id: &CriterionId,
    ) -> EvaluationResult<Option<ConsensusScore>> {
        lookup::live_vendor(self.storage.as_ref(), project_id, vendor_id).await?;
        Ok(self
            .storage
            .get_consensus(project_id, vendor_id, criterion_id)
            .await?)
    }

    /// Create or revise the consensus for a pair.
    #[instrument(
        skip(self, input),
        fields(
            project_id = %project_id,
            vendor_id = %input.vendor_id,
            criterion_id = %input.criterion_id,
            determined_by = %input.determined_by,
        )
    )]
    pub async fn save_consensus(
        &self,
        project_id: &ProjectId,
        input: ConsensusInput,
    ) -> EvaluationResult<ConsensusScore> {
        let value = ScoreValue::new(input.consensus_value)?;

        let comparison = self
            .aggregator
            .compare(project_id, &input.vendor_id, &input.criterion_id)
            .await?;
        let source_score_ids: Vec<ScoreId> =
            comparison.scores().iter().map(|s| s.id.clone()).collect();
        if source_score_ids.is_empty() {
            return Err(EvaluationError::NothingToReconcile {
                vendor_id: input.vendor_id,
                criterion_id: input.criterion_id,
            });
        }

        let now = Utc::now();
        let record = ConsensusScore {
            id: ConsensusId::generate(),
            project_id: project_id.clone(),
            vendor_id: input.vendor_id,
            criterion_id: input.criterion_id,
            consensus_value: value,
            rationale: input.rationale,
            determined_by: input.determined_by,
            source_score_ids,
            determined_at: now,
            created_at: now,
            updated_at: now,
        };
        let saved = self.storage.upsert_consensus(record).await?;
        // An overwrite keeps the original creation stamp.
        let revised = saved.created_at != saved.determined_at;

        self.events.emit(EvaluationEvent::ConsensusRecorded {
            project_id: project_id.clone(),
            vendor_id: saved.vendor_id.clone(),
            criterion_id: saved.criterion_id.clone(),
            value: saved.consensus_value,
            by: saved.determined_by.clone(),
            revised,
        });
        info!(
            value = %saved.consensus_value,
            sources = saved.source_score_ids.len(),
            revised,
            "Consensus recorded"
        );

        Ok(saved)
    }

    /// All consensus records of a vendor, ordered by criterion.
    pub async fn list_for_vendor(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
    ) -> EvaluationResult<Vec<ConsensusScore>> {
        lookup::live_vendor(self.storage.as_ref(), project_id, vendor_id).await?;
        Ok(self.storage.list_consensus(project_id, vendor_id).await?)
    }

    /// Compare a saved consensus with the scores as they stand now.
    pub async fn review_state(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        criterion_id: &CriterionId,
    ) -> EvaluationResult<ConsensusReview> {
        let Some(consensus) = self
            .get_consensus(project_id, vendor_id, criterion_id)
            .await?
        else {
            return Ok(ConsensusReview::Absent);
        };

        let comparison = self
            .aggregator
            .compare(project_id, vendor_id, criterion_id)
            .await?;
        Ok(review(&consensus, &comparison))
    }
}

fn review(consensus: &ConsensusScore, comparison: &Comparison) -> ConsensusReview {
    let current = comparison.scores();
    let sources: HashSet<&ScoreId> = consensus.source_score_ids.iter().collect();
    let present: HashSet<&ScoreId> = current.iter().map(|s| &s.id).collect();

    let changed: Vec<ScoreId> = current
        .iter()
        .filter(|s| sources.contains(&s.id) && s.updated_at > consensus.determined_at)
        .map(|s| s.id.clone())
        .collect();
    let missing: Vec<ScoreId> = consensus
        .source_score_ids
        .iter()
        .filter(|id| !present.contains(id))
        .cloned()
        .collect();
    let added: Vec<ScoreId> = current
        .iter()
        .filter(|s| !sources.contains(&s.id))
        .map(|s| s.id.clone())
        .collect();

    if changed.is_empty() && missing.is_empty() && added.is_empty() {
        ConsensusReview::Current
    } else {
        ConsensusReview::Stale {
            changed,
            missing,
            added,
        }
    }
}
