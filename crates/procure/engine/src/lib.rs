//! Vendor procurement evaluation engine.
//!
//! Two concerns live here:
//! - the vendor lifecycle, where every status change is validated against a
//!   fixed transition table and written as a compare-and-swap on the prior
//!   status
//! - score reconciliation, where independent evaluator scores are compared
//!   (average, range, variance tier) and a human records one consensus value
//!   per vendor/criterion pair with the ids of the scores it reconciles
//!
//! Persistence is delegated to a [`procure_storage::ProcurementStorage`]
//! backend. Events are broadcast only after the store confirmed the write.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod aggregator;
pub mod config;
pub mod criteria;
pub mod error;
pub mod events;
mod lookup;
pub mod pipeline;
pub mod reconciler;
pub mod scores;
pub mod service;
pub mod telemetry;

pub use aggregator::{summarize, ScoreAggregator, ScorecardRow, VendorScorecard};
pub use config::{EngineConfig, EventsConfig, LoggingConfig, ScoringConfig, StorageConfig};
pub use criteria::CriterionRegistry;
pub use error::{EvaluationError, EvaluationResult};
pub use events::{EvaluationEvent, EventBus};
pub use pipeline::VendorPipeline;
pub use reconciler::ConsensusReconciler;
pub use scores::ScoreService;
pub use service::EvaluationService;
pub use telemetry::init_tracing;
