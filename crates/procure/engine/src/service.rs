//! Wiring of the engine components over one storage backend

use std::sync::Arc;

use procure_storage::{InMemoryProcurementStorage, ProcurementStorage};
use tokio::sync::broadcast;
use tracing::info;

use crate::aggregator::ScoreAggregator;
use crate::config::{EngineConfig, StorageConfig};
use crate::criteria::CriterionRegistry;
use crate::error::{EvaluationError, EvaluationResult};
use crate::events::{EvaluationEvent, EventBus};
use crate::pipeline::VendorPipeline;
use crate::reconciler::ConsensusReconciler;
use crate::scores::ScoreService;

/// Entry point for host applications.
///
/// All components share the same store and event bus.
#[derive(Clone)]
pub struct EvaluationService {
    events: EventBus,
    pipeline: VendorPipeline,
    criteria: CriterionRegistry,
    scores: ScoreService,
    aggregator: ScoreAggregator,
    reconciler: ConsensusReconciler,
}

impl EvaluationService {
    pub fn new(storage: Arc<dyn ProcurementStorage>, config: &EngineConfig) -> Self {
        let events = EventBus::new(config.events.channel_capacity);
        let aggregator = ScoreAggregator::new(
            storage.clone(),
            config.scoring.thresholds(),
            config.scoring.submitted_only,
        );

        Self {
            pipeline: VendorPipeline::new(storage.clone(), events.clone()),
            criteria: CriterionRegistry::new(storage.clone()),
            scores: ScoreService::new(storage.clone(), events.clone()),
            reconciler: ConsensusReconciler::new(storage, aggregator.clone(), events.clone()),
            aggregator,
            events,
        }
    }

    /// Build the storage backend named in the configuration.
    pub async fn from_config(config: &EngineConfig) -> EvaluationResult<Self> {
        let storage: Arc<dyn ProcurementStorage> = match &config.storage {
            StorageConfig::Memory => {
                info!("Using in-memory procurement storage");
                Arc::new(InMemoryProcurementStorage::new())
            }
            #[cfg(feature = "postgres")]
            StorageConfig::Postgres {
                url,
                max_connections,
                connect_timeout_secs,
            } => {
                info!(max_connections, "Connecting to PostgreSQL procurement storage");
                Arc::new(
                    procure_storage::postgres::PostgresProcurementStorage::connect_with_options(
                        url,
                        *max_connections,
                        *connect_timeout_secs,
                    )
                    .await
                    .map_err(EvaluationError::StoreUnavailable)?,
                )
            }
            #[cfg(not(feature = "postgres"))]
            StorageConfig::Postgres { .. } => {
                return Err(EvaluationError::Config(
                    "postgres storage requires the `postgres` feature".to_string(),
                ));
            }
        };

        Ok(Self::new(storage, config))
    }

    pub fn pipeline(&self) -> &VendorPipeline {
        &self.pipeline
    }

    pub fn criteria(&self) -> &CriterionRegistry {
        &self.criteria
    }

    pub fn scores(&self) -> &ScoreService {
        &self.scores
    }

    pub fn aggregator(&self) -> &ScoreAggregator {
        &self.aggregator
    }

    pub fn reconciler(&self) -> &ConsensusReconciler {
        &self.reconciler
    }

    /// Receive every event emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<EvaluationEvent> {
        self.events.subscribe()
    }
}
