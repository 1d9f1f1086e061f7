//! Vendor pipeline: owns vendor status and status history.
//!
//! Every status change is checked against the transition table first and
//! then written as a conditional update keyed on the status we read. If
//! another writer got there first the store rejects the write and nothing
//! changes; no event is emitted until the store has confirmed.

use std::sync::Arc;

use chrono::Utc;
use procure_storage::{ProcurementStorage, QueryWindow, StorageError, VendorQuery};
use procure_types::{
    ensure_transition, NewVendor, ProjectId, StatusUpdate, UserId, Vendor, VendorDetails,
    VendorId, VendorStatus,
};
use tracing::{info, instrument, warn};

use crate::error::{EvaluationError, EvaluationResult};
use crate::events::{EvaluationEvent, EventBus};
use crate::lookup;

/// Validates and applies vendor lifecycle changes
#[derive(Clone)]
pub struct VendorPipeline {
    storage: Arc<dyn ProcurementStorage>,
    events: EventBus,
}

impl VendorPipeline {
    pub fn new(storage: Arc<dyn ProcurementStorage>, events: EventBus) -> Self {
        Self { storage, events }
    }

    /// Create a vendor in `identified`.
    #[instrument(skip(self, draft), fields(project_id = %project_id, actor = %actor))]
    pub async fn register(
        &self,
        project_id: &ProjectId,
        draft: NewVendor,
        actor: &UserId,
    ) -> EvaluationResult<Vendor> {
        if draft.name.trim().is_empty() {
            return Err(EvaluationError::InvalidInput(
                "vendor name must not be empty".to_string(),
            ));
        }

        let vendor = Vendor::new(project_id.clone(), draft, actor.clone(), Utc::now());
        self.storage.create_vendor(vendor.clone()).await?;

        self.events.emit(EvaluationEvent::VendorRegistered {
            project_id: project_id.clone(),
            vendor_id: vendor.id.clone(),
            by: actor.clone(),
        });
        info!(vendor_id = %vendor.id, name = %vendor.name, "Vendor registered");

        Ok(vendor)
    }

    /// Load a live vendor. Tombstoned vendors are `NotFound`.
    pub async fn get(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
    ) -> EvaluationResult<Vendor> {
        lookup::live_vendor(self.storage.as_ref(), project_id, vendor_id).await
    }

    /// Live vendors of a project, ordered by name.
    pub async fn list(
        &self,
        project_id: &ProjectId,
        window: QueryWindow,
    ) -> EvaluationResult<Vec<Vendor>> {
        Ok(self
            .storage
            .list_vendors(project_id, VendorQuery::default(), window)
            .await?)
    }

    pub async fn list_by_status(
        &self,
        project_id: &ProjectId,
        status: VendorStatus,
    ) -> EvaluationResult<Vec<Vendor>> {
        Ok(self
            .storage
            .list_vendors(project_id, VendorQuery::with_status(status), QueryWindow::all())
            .await?)
    }

    /// Targets the vendor can move to from where it is now.
    pub async fn valid_transitions(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
    ) -> EvaluationResult<Vec<VendorStatus>> {
        let vendor = self.get(project_id, vendor_id).await?;
        Ok(vendor.status.valid_transitions().to_vec())
    }

    /// Move a vendor to `to`.
    #[instrument(skip(self, note), fields(project_id = %project_id, vendor_id = %vendor_id, to = %to))]
    pub async fn transition(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        to: VendorStatus,
        actor: &UserId,
        note: Option<&str>,
    ) -> EvaluationResult<Vendor> {
        let current = self.get(project_id, vendor_id).await?;
        let from = current.status;

        if let Err(err) = ensure_transition(from, to) {
            warn!(from = %from, to = %to, actor = %actor, "Rejected vendor status transition");
            return Err(err.into());
        }

        let update = StatusUpdate {
            to,
            changed_at: Utc::now(),
            changed_by: actor.clone(),
            note: note.map(str::to_string),
        };

        let vendor = self
            .storage
            .transition_status(project_id, vendor_id, from, update)
            .await
            .map_err(|e| match e {
                StorageError::Conflict(_) => EvaluationError::StatusConflict {
                    vendor_id: vendor_id.clone(),
                    expected: from,
                },
                other => other.into(),
            })?;

        self.events.emit(EvaluationEvent::StatusChanged {
            project_id: project_id.clone(),
            vendor_id: vendor_id.clone(),
            from,
            to,
            by: actor.clone(),
        });
        info!(from = %from, to = %to, actor = %actor, "Vendor status changed");

        Ok(vendor)
    }

    /// Edit descriptive fields. Status is untouched.
    pub async fn update_details(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        details: VendorDetails,
    ) -> EvaluationResult<Vendor> {
        if details.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(EvaluationError::InvalidInput(
                "vendor name must not be empty".to_string(),
            ));
        }
        Ok(self
            .storage
            .update_vendor_details(project_id, vendor_id, &details, Utc::now())
            .await?)
    }

    /// Soft-delete. The record stays in the store for the audit trail.
    #[instrument(skip(self), fields(project_id = %project_id, vendor_id = %vendor_id))]
    pub async fn archive(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        actor: &UserId,
    ) -> EvaluationResult<Vendor> {
        let vendor = self
            .storage
            .soft_delete_vendor(project_id, vendor_id, actor, Utc::now())
            .await?;

        self.events.emit(EvaluationEvent::VendorArchived {
            project_id: project_id.clone(),
            vendor_id: vendor_id.clone(),
            by: actor.clone(),
        });
        info!(actor = %actor, "Vendor archived");

        Ok(vendor)
    }
}
