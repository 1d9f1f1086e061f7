//! In-memory reference implementation of the procurement storage traits.
//!
//! This adapter is deterministic and test-friendly. Production deployments
//! should use a transactional backend (e.g. PostgreSQL).

use crate::traits::{
    ConsensusStore, CriterionStore, QueryWindow, ScoreStore, VendorQuery, VendorStore,
};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use procure_types::{
    ConsensusScore, Criterion, CriterionId, ProjectId, Score, ScoreFilter, ScoreKey, ScoreStatus,
    StatusUpdate, UserId, Vendor, VendorDetails, VendorId, VendorStatus,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use tracing::debug;

type ConsensusKey = (ProjectId, VendorId, CriterionId);

/// In-memory procurement storage adapter.
#[derive(Default)]
pub struct InMemoryProcurementStorage {
    vendors: RwLock<HashMap<(ProjectId, VendorId), Vendor>>,
    criteria: RwLock<HashMap<(ProjectId, CriterionId), Criterion>>,
    scores: RwLock<HashMap<ScoreKey, Score>>,
    consensus: RwLock<HashMap<ConsensusKey, ConsensusScore>>,
    offline: AtomicBool,
}

impl InMemoryProcurementStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable store: every call fails with `Backend` until
    /// switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> StorageResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("store unavailable".to_string()));
        }
        Ok(())
    }
}

fn poisoned(name: &str) -> StorageError {
    StorageError::Backend(format!("{name} lock poisoned"))
}

fn live_vendor_mut<'a>(
    guard: &'a mut HashMap<(ProjectId, VendorId), Vendor>,
    project_id: &ProjectId,
    vendor_id: &VendorId,
) -> StorageResult<&'a mut Vendor> {
    guard
        .get_mut(&(project_id.clone(), vendor_id.clone()))
        .filter(|v| !v.is_deleted())
        .ok_or_else(|| StorageError::NotFound(format!("vendor {vendor_id} not found")))
}

#[async_trait]
impl VendorStore for InMemoryProcurementStorage {
    async fn create_vendor(&self, vendor: Vendor) -> StorageResult<()> {
        self.ensure_online()?;
        let mut guard = self.vendors.write().map_err(|_| poisoned("vendors"))?;
        let key = (vendor.project_id.clone(), vendor.id.clone());
        if guard.contains_key(&key) {
            return Err(StorageError::Conflict(format!(
                "vendor {} already exists",
                vendor.id
            )));
        }
        guard.insert(key, vendor);
        Ok(())
    }

    async fn get_vendor(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
    ) -> StorageResult<Option<Vendor>> {
        self.ensure_online()?;
        let guard = self.vendors.read().map_err(|_| poisoned("vendors"))?;
        Ok(guard
            .get(&(project_id.clone(), vendor_id.clone()))
            .cloned())
    }

    async fn list_vendors(
        &self,
        project_id: &ProjectId,
        query: VendorQuery,
        window: QueryWindow,
    ) -> StorageResult<Vec<Vendor>> {
        self.ensure_online()?;
        let guard = self.vendors.read().map_err(|_| poisoned("vendors"))?;
        let mut values = guard
            .values()
            .filter(|v| &v.project_id == project_id)
            .filter(|v| query.include_deleted || !v.is_deleted())
            .filter(|v| query.status.map_or(true, |s| v.status == s))
            .cloned()
            .collect::<Vec<_>>();
        values.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(apply_window(values, window))
    }

    async fn update_vendor_details(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        details: &VendorDetails,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<Vendor> {
        self.ensure_online()?;
        let mut guard = self.vendors.write().map_err(|_| poisoned("vendors"))?;
        let vendor = live_vendor_mut(&mut guard, project_id, vendor_id)?;
        details.apply_to(vendor, updated_at);
        Ok(vendor.clone())
    }

    async fn transition_status(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        expected_from: VendorStatus,
        update: StatusUpdate,
    ) -> StorageResult<Vendor> {
        self.ensure_online()?;
        let mut guard = self.vendors.write().map_err(|_| poisoned("vendors"))?;
        let vendor = live_vendor_mut(&mut guard, project_id, vendor_id)?;

        if vendor.status != expected_from {
            debug!(
                vendor_id = %vendor_id,
                expected = %expected_from,
                found = %vendor.status,
                "conditional status write rejected"
            );
            return Err(StorageError::Conflict(format!(
                "vendor {vendor_id} status is {}, expected {expected_from}",
                vendor.status
            )));
        }

        vendor.apply_status_update(&update);
        Ok(vendor.clone())
    }

    async fn soft_delete_vendor(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        deleted_by: &UserId,
        deleted_at: DateTime<Utc>,
    ) -> StorageResult<Vendor> {
        self.ensure_online()?;
        let mut guard = self.vendors.write().map_err(|_| poisoned("vendors"))?;
        let vendor = live_vendor_mut(&mut guard, project_id, vendor_id)?;
        vendor.deleted_at = Some(deleted_at);
        vendor.deleted_by = Some(deleted_by.clone());
        vendor.updated_at = deleted_at;
        Ok(vendor.clone())
    }
}

#[async_trait]
impl CriterionStore for InMemoryProcurementStorage {
    async fn create_criterion(&self, criterion: Criterion) -> StorageResult<()> {
        self.ensure_online()?;
        let mut guard = self.criteria.write().map_err(|_| poisoned("criteria"))?;
        let key = (criterion.project_id.clone(), criterion.id.clone());
        if guard.contains_key(&key) {
            return Err(StorageError::Conflict(format!(
                "criterion {} already exists",
                criterion.id
            )));
        }
        guard.insert(key, criterion);
        Ok(())
    }

    async fn get_criterion(
        &self,
        project_id: &ProjectId,
        criterion_id: &CriterionId,
    ) -> StorageResult<Option<Criterion>> {
        self.ensure_online()?;
        let guard = self.criteria.read().map_err(|_| poisoned("criteria"))?;
        Ok(guard
            .get(&(project_id.clone(), criterion_id.clone()))
            .cloned())
    }

    async fn list_criteria(&self, project_id: &ProjectId) -> StorageResult<Vec<Criterion>> {
        self.ensure_online()?;
        let guard = self.criteria.read().map_err(|_| poisoned("criteria"))?;
        let mut values = guard
            .values()
            .filter(|c| &c.project_id == project_id)
            .cloned()
            .collect::<Vec<_>>();
        values.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(values)
    }
}

#[async_trait]
impl ScoreStore for InMemoryProcurementStorage {
    async fn upsert_score(&self, mut score: Score) -> StorageResult<Score> {
        self.ensure_online()?;
        let mut guard = self.scores.write().map_err(|_| poisoned("scores"))?;
        let key = score.key();
        if let Some(existing) = guard.get(&key) {
            score.id = existing.id.clone();
            score.created_at = existing.created_at;
        }
        guard.insert(key, score.clone());
        Ok(score)
    }

    async fn list_scores(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        filter: &ScoreFilter,
    ) -> StorageResult<Vec<Score>> {
        self.ensure_online()?;
        let guard = self.scores.read().map_err(|_| poisoned("scores"))?;
        let mut values = guard
            .values()
            .filter(|s| &s.project_id == project_id && &s.vendor_id == vendor_id)
            .filter(|s| filter.matches(s))
            .cloned()
            .collect::<Vec<_>>();
        values.sort_by(|a, b| {
            a.criterion_id
                .cmp(&b.criterion_id)
                .then_with(|| a.evaluator_id.cmp(&b.evaluator_id))
        });
        Ok(values)
    }

    async fn submit_scores(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        evaluator_id: &UserId,
        submitted_at: DateTime<Utc>,
    ) -> StorageResult<usize> {
        self.ensure_online()?;
        let mut guard = self.scores.write().map_err(|_| poisoned("scores"))?;
        let mut flipped = 0;
        for score in guard.values_mut().filter(|s| {
            &s.project_id == project_id
                && &s.vendor_id == vendor_id
                && &s.evaluator_id == evaluator_id
                && s.status == ScoreStatus::Draft
        }) {
            score.status = ScoreStatus::Submitted;
            score.submitted_at = Some(submitted_at);
            flipped += 1;
        }
        Ok(flipped)
    }
}

#[async_trait]
impl ConsensusStore for InMemoryProcurementStorage {
    async fn upsert_consensus(
        &self,
        mut consensus: ConsensusScore,
    ) -> StorageResult<ConsensusScore> {
        self.ensure_online()?;
        let mut guard = self.consensus.write().map_err(|_| poisoned("consensus"))?;
        let key = (
            consensus.project_id.clone(),
            consensus.vendor_id.clone(),
            consensus.criterion_id.clone(),
        );
        if let Some(existing) = guard.get(&key) {
            consensus.id = existing.id.clone();
            consensus.created_at = existing.created_at;
        }
        guard.insert(key, consensus.clone());
        Ok(consensus)
    }

    async fn get_consensus(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        criterion_id: &CriterionId,
    ) -> StorageResult<Option<ConsensusScore>> {
        self.ensure_online()?;
        let guard = self.consensus.read().map_err(|_| poisoned("consensus"))?;
        Ok(guard
            .get(&(
                project_id.clone(),
                vendor_id.clone(),
                criterion_id.clone(),
            ))
            .cloned())
    }

    async fn list_consensus(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
    ) -> StorageResult<Vec<ConsensusScore>> {
        self.ensure_online()?;
        let guard = self.consensus.read().map_err(|_| poisoned("consensus"))?;
        let mut values = guard
            .values()
            .filter(|c| &c.project_id == project_id && &c.vendor_id == vendor_id)
            .cloned()
            .collect::<Vec<_>>();
        values.sort_by(|a, b| a.criterion_id.cmp(&b.criterion_id));
        Ok(values)
    }
}

fn apply_window<T>(items: Vec<T>, window: QueryWindow) -> Vec<T> {
    let iter = items.into_iter().skip(window.offset);
    if window.limit == 0 {
        iter.collect()
    } else {
        iter.take(window.limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use procure_types::{NewVendor, ScoreId, ScoreInput, ScoreValue};

    fn project() -> ProjectId {
        ProjectId::new("p1")
    }

    fn vendor(id: &str, name: &str) -> Vendor {
        Vendor::new(
            project(),
            NewVendor::named(name).with_id(VendorId::new(id)),
            UserId::new("u0"),
            Utc::now(),
        )
    }

    fn update(to: VendorStatus) -> StatusUpdate {
        StatusUpdate {
            to,
            changed_at: Utc::now(),
            changed_by: UserId::new("u1"),
            note: None,
        }
    }

    fn score(criterion: &str, evaluator: &str, value: i64) -> Score {
        ScoreInput::new(
            VendorId::new("v1"),
            CriterionId::new(criterion),
            UserId::new(evaluator),
            value,
        )
        .into_draft(project(), Utc::now())
        .unwrap()
    }

    #[tokio::test]
    async fn transition_checks_expected_status() {
        let storage = InMemoryProcurementStorage::new();
        storage.create_vendor(vendor("v1", "Acme")).await.unwrap();

        let moved = storage
            .transition_status(
                &project(),
                &VendorId::new("v1"),
                VendorStatus::Identified,
                update(VendorStatus::LongList),
            )
            .await
            .unwrap();
        assert_eq!(moved.status, VendorStatus::LongList);

        // A second writer still believing the vendor is `identified` loses.
        let stale = storage
            .transition_status(
                &project(),
                &VendorId::new("v1"),
                VendorStatus::Identified,
                update(VendorStatus::Rejected),
            )
            .await;
        assert!(matches!(stale, Err(StorageError::Conflict(_))));

        let stored = storage
            .get_vendor(&project(), &VendorId::new("v1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, VendorStatus::LongList);
        assert_eq!(stored.status_history.len(), 1);
    }

    #[tokio::test]
    async fn tombstoned_vendors_are_hidden_but_kept() {
        let storage = InMemoryProcurementStorage::new();
        storage.create_vendor(vendor("v1", "Beta")).await.unwrap();
        storage.create_vendor(vendor("v2", "Alpha")).await.unwrap();

        storage
            .soft_delete_vendor(&project(), &VendorId::new("v1"), &UserId::new("u9"), Utc::now())
            .await
            .unwrap();

        let live = storage
            .list_vendors(&project(), VendorQuery::default(), QueryWindow::all())
            .await
            .unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].name, "Alpha");

        let all = storage
            .list_vendors(
                &project(),
                VendorQuery {
                    include_deleted: true,
                    ..Default::default()
                },
                QueryWindow::all(),
            )
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let again = storage
            .soft_delete_vendor(&project(), &VendorId::new("v1"), &UserId::new("u9"), Utc::now())
            .await;
        assert!(matches!(again, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn score_upsert_keeps_one_record_per_tuple() {
        let storage = InMemoryProcurementStorage::new();
        let first = storage.upsert_score(score("c1", "e1", 2)).await.unwrap();

        let mut later = score("c1", "e1", 4);
        later.updated_at = first.updated_at + Duration::seconds(5);
        let second = storage.upsert_score(later).await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);

        let all = storage
            .list_scores(&project(), &VendorId::new("v1"), &ScoreFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].value, ScoreValue::new(4).unwrap());
    }

    #[tokio::test]
    async fn submit_only_flips_own_drafts() {
        let storage = InMemoryProcurementStorage::new();
        storage.upsert_score(score("c1", "e1", 3)).await.unwrap();
        storage.upsert_score(score("c2", "e1", 4)).await.unwrap();
        storage.upsert_score(score("c1", "e2", 5)).await.unwrap();

        let flipped = storage
            .submit_scores(&project(), &VendorId::new("v1"), &UserId::new("e1"), Utc::now())
            .await
            .unwrap();
        assert_eq!(flipped, 2);

        let again = storage
            .submit_scores(&project(), &VendorId::new("v1"), &UserId::new("e1"), Utc::now())
            .await
            .unwrap();
        assert_eq!(again, 0);

        let drafts = storage
            .list_scores(
                &project(),
                &VendorId::new("v1"),
                &ScoreFilter::default().with_status(ScoreStatus::Draft),
            )
            .await
            .unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].evaluator_id, UserId::new("e2"));
    }

    #[tokio::test]
    async fn consensus_upsert_is_unique_per_pair() {
        let storage = InMemoryProcurementStorage::new();
        let now = Utc::now();
        let base = ConsensusScore {
            id: procure_types::ConsensusId::generate(),
            project_id: project(),
            vendor_id: VendorId::new("v1"),
            criterion_id: CriterionId::new("c1"),
            consensus_value: ScoreValue::new(3).unwrap(),
            rationale: "split decision".to_string(),
            determined_by: UserId::new("lead"),
            source_score_ids: vec![ScoreId::new("s1")],
            determined_at: now,
            created_at: now,
            updated_at: now,
        };
        let first = storage.upsert_consensus(base.clone()).await.unwrap();

        let mut revised = base;
        revised.id = procure_types::ConsensusId::generate();
        revised.consensus_value = ScoreValue::new(4).unwrap();
        let second = storage.upsert_consensus(revised).await.unwrap();

        assert_eq!(second.id, first.id);
        let listed = storage
            .list_consensus(&project(), &VendorId::new("v1"))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].consensus_value.get(), 4);
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let storage = InMemoryProcurementStorage::new();
        storage.set_offline(true);
        let result = storage.create_vendor(vendor("v1", "Acme")).await;
        assert!(matches!(result, Err(StorageError::Backend(_))));
        storage.set_offline(false);
        storage.create_vendor(vendor("v1", "Acme")).await.unwrap();
    }
}
