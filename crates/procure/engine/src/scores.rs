//! Individual evaluator scores

use std::sync::Arc;

use chrono::Utc;
use procure_storage::ProcurementStorage;
use procure_types::{ProjectId, Score, ScoreFilter, ScoreInput, UserId, VendorId};
use tracing::{debug, info, instrument};

use crate::error::EvaluationResult;
use crate::events::{EvaluationEvent, EventBus};
use crate::lookup;

/// Owns per-(vendor, criterion, evaluator) score records.
///
/// A save for an existing tuple overwrites it (last write wins, no
/// versioning) and puts it back into draft.
#[derive(Clone)]
pub struct ScoreService {
    storage: Arc<dyn ProcurementStorage>,
    events: EventBus,
}

impl ScoreService {
    pub fn new(storage: Arc<dyn ProcurementStorage>, events: EventBus) -> Self {
        Self { storage, events }
    }

    #[instrument(
        skip(self, input),
        fields(
            project_id = %project_id,
            vendor_id = %input.vendor_id,
            criterion_id = %input.criterion_id,
            evaluator_id = %input.evaluator_id,
        )
    )]
    pub async fn save_score(
        &self,
        project_id: &ProjectId,
        input: ScoreInput,
    ) -> EvaluationResult<Score> {
        let draft = input.into_draft(project_id.clone(), Utc::now())?;

        lookup::live_vendor(self.storage.as_ref(), project_id, &draft.vendor_id).await?;
        lookup::criterion(self.storage.as_ref(), project_id, &draft.criterion_id).await?;

        let saved = self.storage.upsert_score(draft).await?;

        self.events.emit(EvaluationEvent::ScoreSaved {
            project_id: project_id.clone(),
            score_id: saved.id.clone(),
            vendor_id: saved.vendor_id.clone(),
            criterion_id: saved.criterion_id.clone(),
            evaluator_id: saved.evaluator_id.clone(),
            value: saved.value,
        });
        debug!(score_id = %saved.id, value = %saved.value, "Score saved");

        Ok(saved)
    }

    /// Scores for a vendor, optionally narrowed by evaluator, criterion or status.
    pub async fn get_by_vendor(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        filter: ScoreFilter,
    ) -> EvaluationResult<Vec<Score>> {
        lookup::live_vendor(self.storage.as_ref(), project_id, vendor_id).await?;
        Ok(self
            .storage
            .list_scores(project_id, vendor_id, &filter)
            .await?)
    }

    /// Flip the evaluator's drafts for a vendor to submitted.
    #[instrument(skip(self), fields(project_id = %project_id, vendor_id = %vendor_id, evaluator_id = %evaluator_id))]
    pub async fn submit_all(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        evaluator_id: &UserId,
    ) -> EvaluationResult<usize> {
        lookup::live_vendor(self.storage.as_ref(), project_id, vendor_id).await?;
        let count = self
            .storage
            .submit_scores(project_id, vendor_id, evaluator_id, Utc::now())
            .await?;

        if count > 0 {
            self.events.emit(EvaluationEvent::ScoresSubmitted {
                project_id: project_id.clone(),
                vendor_id: vendor_id.clone(),
                evaluator_id: evaluator_id.clone(),
                count,
            });
        }
        info!(count, "Scores submitted");

        Ok(count)
    }
}
