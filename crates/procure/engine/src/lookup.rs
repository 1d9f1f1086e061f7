//! Existence checks shared by the engine components

use crate::error::{EvaluationError, EvaluationResult};
use procure_storage::ProcurementStorage;
use procure_types::{Criterion, CriterionId, ProjectId, Vendor, VendorId};

/// Load a vendor that exists and is not tombstoned.
pub(crate) async fn live_vendor(
    storage: &dyn ProcurementStorage,
    project_id: &ProjectId,
    vendor_id: &VendorId,
) -> EvaluationResult<Vendor> {
    storage
        .get_vendor(project_id, vendor_id)
        .await?
        .filter(|v| !v.is_deleted())
        .ok_or_else(|| EvaluationError::NotFound(format!("vendor {vendor_id}")))
}

pub(crate) async fn criterion(
    storage: &dyn ProcurementStorage,
    project_id: &ProjectId,
    criterion_id: &CriterionId,
) -> EvaluationResult<Criterion> {
    storage
        .get_criterion(project_id, criterion_id)
        .await?
        .ok_or_else(|| EvaluationError::NotFound(format!("criterion {criterion_id}")))
}
