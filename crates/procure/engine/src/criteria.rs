//! Criterion registry

use std::sync::Arc;

use chrono::Utc;
use procure_storage::ProcurementStorage;
use procure_types::{Criterion, CriterionId, NewCriterion, ProjectId};
use tracing::{debug, instrument};

use crate::error::EvaluationResult;
use crate::lookup;

/// Defines and looks up the weighted criteria vendors are scored against
#[derive(Clone)]
pub struct CriterionRegistry {
    storage: Arc<dyn ProcurementStorage>,
}

impl CriterionRegistry {
    pub fn new(storage: Arc<dyn ProcurementStorage>) -> Self {
        Self { storage }
    }

    #[instrument(skip(self, draft), fields(project_id = %project_id))]
    pub async fn define(
        &self,
        project_id: &ProjectId,
        draft: NewCriterion,
    ) -> EvaluationResult<Criterion> {
        let criterion = draft.into_criterion(project_id.clone(), Utc::now())?;
        self.storage.create_criterion(criterion.clone()).await?;
        debug!(criterion_id = %criterion.id, weight = criterion.weight, "Criterion defined");
        Ok(criterion)
    }

    pub async fn get(
        &self,
        project_id: &ProjectId,
        criterion_id: &CriterionId,
    ) -> EvaluationResult<Criterion> {
        lookup::criterion(self.storage.as_ref(), project_id, criterion_id).await
    }

    /// All criteria of a project, ordered by category then name.
    pub async fn list(&self, project_id: &ProjectId) -> EvaluationResult<Vec<Criterion>> {
        Ok(self.storage.list_criteria(project_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvaluationError;
    use procure_storage::InMemoryProcurementStorage;
    use procure_types::InvalidCriterion;

    fn registry() -> CriterionRegistry {
        CriterionRegistry::new(Arc::new(InMemoryProcurementStorage::new()))
    }

    #[tokio::test]
    async fn test_define_and_list() {
        let registry = registry();
        let project = ProjectId::new("p1");
        registry
            .define(&project, NewCriterion::new("Technical", "Scalability", 3.0))
            .await
            .unwrap();
        registry
            .define(&project, NewCriterion::new("Commercial", "Price", 2.0))
            .await
            .unwrap();

        let listed = registry.list(&project).await.unwrap();
        let names: Vec<_> = listed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Price", "Scalability"]);
        assert!(registry.list(&ProjectId::new("p2")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_weight_is_rejected_before_write() {
        let registry = registry();
        let project = ProjectId::new("p1");
        let result = registry
            .define(&project, NewCriterion::new("Technical", "Security", 0.0))
            .await;
        assert!(matches!(
            result,
            Err(EvaluationError::InvalidCriterion(InvalidCriterion::InvalidWeight(_)))
        ));
        assert!(registry.list(&project).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_id_is_already_exists() {
        let registry = registry();
        let project = ProjectId::new("p1");
        let draft = NewCriterion::new("Technical", "Security", 1.0).with_id(CriterionId::new("c1"));
        registry.define(&project, draft.clone()).await.unwrap();
        assert!(matches!(
            registry.define(&project, draft).await,
            Err(EvaluationError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_criterion_is_not_found() {
        let result = registry()
            .get(&ProjectId::new("p1"), &CriterionId::new("nope"))
            .await;
        assert!(matches!(result, Err(EvaluationError::NotFound(_))));
    }
}
