//! Storage contract for vendor procurement records.
//!
//! The procurement core treats persistence as an external transactional
//! record store. This crate states exactly which operations the core issues
//! against it:
//! - vendor records, with status changes as conditional (compare-and-swap)
//!   writes keyed on the expected prior status
//! - criteria per evaluation project
//! - scores, upserted by (vendor, criterion, evaluator)
//! - consensus scores, upserted by (vendor, criterion)
//!
//! Design stance:
//! - Postgres is the transactional source of truth in production.
//! - The in-memory adapter is deterministic and meant for tests and demos.
//! - No operation spans more than one entity; there are no cross-record
//!   transactions.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod error;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
mod traits;

pub use error::{StorageError, StorageResult};
pub use memory::InMemoryProcurementStorage;
pub use traits::{
    ConsensusStore, CriterionStore, ProcurementStorage, QueryWindow, ScoreStore, VendorQuery,
    VendorStore,
};
