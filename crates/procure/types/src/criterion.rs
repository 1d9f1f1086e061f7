//! Weighted evaluation criteria

use crate::{CriterionId, InvalidCriterion, ProjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A weighted dimension vendors are scored against.
///
/// Weights are relative; they do not need to sum to anything in particular.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: CriterionId,
    pub project_id: ProjectId,
    pub category: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub weight: f64,
    pub created_at: DateTime<Utc>,
}

/// Creation payload for a criterion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewCriterion {
    #[serde(default)]
    pub id: Option<CriterionId>,
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub weight: f64,
}

impl NewCriterion {
    pub fn new(category: impl Into<String>, name: impl Into<String>, weight: f64) -> Self {
        Self {
            id: None,
            category: category.into(),
            name: name.into(),
            description: None,
            weight,
        }
    }

    pub fn with_id(mut self, id: CriterionId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn validate(&self) -> Result<(), InvalidCriterion> {
        if self.name.trim().is_empty() {
            return Err(InvalidCriterion::EmptyName);
        }
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(InvalidCriterion::InvalidWeight(self.weight));
        }
        Ok(())
    }

    pub fn into_criterion(
        self,
        project_id: ProjectId,
        now: DateTime<Utc>,
    ) -> Result<Criterion, InvalidCriterion> {
        self.validate()?;
        Ok(Criterion {
            id: self.id.unwrap_or_else(CriterionId::generate),
            project_id,
            category: self.category,
            name: self.name,
            description: self.description,
            weight: self.weight,
            created_at: now,
        })
    }
}
