//! Vendor Procurement Domain Types
//!
//! Vendors move through a fixed selection pipeline while evaluators score
//! them against weighted criteria. Disagreement between evaluators is
//! surfaced as a variance tier and settled by a human-recorded consensus.
//!
//! # Key Concepts
//!
//! - **VendorStatus**: The closed set of pipeline stages plus the static
//!   transition table between them.
//! - **Vendor**: A candidate supplier with its current status, cumulative
//!   notes, and structured status history. Never hard-deleted.
//! - **Criterion**: A weighted dimension vendors are scored against.
//! - **Score**: One evaluator's 1–5 rating for one vendor/criterion pair.
//! - **ConsensusScore**: The single agreed rating for a pair, with the ids
//!   of the individual scores it reconciles.
//! - **Comparison**: Descriptive statistics over the scores for a pair, or
//!   the `NoScores` sentinel.
//!
//! Every record is scoped by an explicit [`ProjectId`].

#![deny(unsafe_code)]

mod comparison;
mod consensus;
mod criterion;
mod errors;
mod ids;
mod score;
mod status;
mod vendor;

pub use comparison::*;
pub use consensus::*;
pub use criterion::*;
pub use errors::*;
pub use ids::*;
pub use score::*;
pub use status::*;
pub use vendor::*;
