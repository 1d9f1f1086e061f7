use crate::StorageResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use procure_types::{
    ConsensusScore, Criterion, CriterionId, ProjectId, Score, ScoreFilter, StatusUpdate, UserId,
    Vendor, VendorDetails, VendorId, VendorStatus,
};

/// Generic query window for paged reads. A `limit` of zero means unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryWindow {
    pub limit: usize,
    pub offset: usize,
}

impl QueryWindow {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn page(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }
}

/// Vendor list filter. Tombstoned vendors are excluded unless asked for.
#[derive(Debug, Clone, Copy, Default)]
pub struct VendorQuery {
    pub status: Option<VendorStatus>,
    pub include_deleted: bool,
}

impl VendorQuery {
    pub fn with_status(status: VendorStatus) -> Self {
        Self {
            status: Some(status),
            include_deleted: false,
        }
    }
}

/// Storage interface for vendor records.
#[async_trait]
pub trait VendorStore: Send + Sync {
    /// Insert a new vendor. Fails with `Conflict` if the id is taken.
    async fn create_vendor(&self, vendor: Vendor) -> StorageResult<()>;

    /// Load a vendor, tombstoned or not.
    async fn get_vendor(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
    ) -> StorageResult<Option<Vendor>>;

    /// List vendors of a project ordered by name, then id.
    async fn list_vendors(
        &self,
        project_id: &ProjectId,
        query: VendorQuery,
        window: QueryWindow,
    ) -> StorageResult<Vec<Vendor>>;

    /// Overwrite descriptive fields of a live vendor.
    async fn update_vendor_details(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        details: &VendorDetails,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<Vendor>;

    /// Conditionally move a live vendor to `update.to`.
    ///
    /// Succeeds only if the stored status still equals `expected_from`; the
    /// status, change stamp, appended notes line, and history entry are
    /// written as one unit. A mismatch is `Conflict` and writes nothing.
    async fn transition_status(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        expected_from: VendorStatus,
        update: StatusUpdate,
    ) -> StorageResult<Vendor>;

    /// Tombstone a live vendor.
    async fn soft_delete_vendor(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        deleted_by: &UserId,
        deleted_at: DateTime<Utc>,
    ) -> StorageResult<Vendor>;
}

/// Storage interface for evaluation criteria.
#[async_trait]
pub trait CriterionStore: Send + Sync {
    async fn create_criterion(&self, criterion: Criterion) -> StorageResult<()>;
    async fn get_criterion(
        &self,
        project_id: &ProjectId,
        criterion_id: &CriterionId,
    ) -> StorageResult<Option<Criterion>>;
    /// Ordered by category, then name.
    async fn list_criteria(&self, project_id: &ProjectId) -> StorageResult<Vec<Criterion>>;
}

/// Storage interface for individual scores.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Insert or overwrite the score for its (vendor, criterion, evaluator)
    /// tuple. An overwrite keeps the stored id and `created_at`.
    async fn upsert_score(&self, score: Score) -> StorageResult<Score>;

    /// Scores for a vendor, ordered by criterion then evaluator.
    async fn list_scores(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        filter: &ScoreFilter,
    ) -> StorageResult<Vec<Score>>;

    /// Flip every draft of (vendor, evaluator) to submitted. Returns how
    /// many records changed.
    async fn submit_scores(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        evaluator_id: &UserId,
        submitted_at: DateTime<Utc>,
    ) -> StorageResult<usize>;
}

/// Storage interface for consensus scores.
#[async_trait]
pub trait ConsensusStore: Send + Sync {
    /// Insert or overwrite the consensus for its (vendor, criterion) pair.
    /// An overwrite keeps the stored id and `created_at`.
    async fn upsert_consensus(&self, consensus: ConsensusScore) -> StorageResult<ConsensusScore>;

    async fn get_consensus(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        criterion_id: &CriterionId,
    ) -> StorageResult<Option<ConsensusScore>>;

    /// Ordered by criterion.
    async fn list_consensus(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
    ) -> StorageResult<Vec<ConsensusScore>>;
}

/// Unified storage bundle used by the procurement engine.
pub trait ProcurementStorage:
    VendorStore + CriterionStore + ScoreStore + ConsensusStore + Send + Sync
{
}

impl<T> ProcurementStorage for T where
    T: VendorStore + CriterionStore + ScoreStore + ConsensusStore + Send + Sync
{
}
