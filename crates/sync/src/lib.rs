//! Keeping the local cache in step with the remote.
//!
//! A sync cycle lists every remote entry, refetches the ones whose cached
//! copy is missing or stale ([`reconcile`]), and then rebuilds the index from
//! the cache. [`Pipeline`] runs cycles on a timer, one at a time.

pub mod error;
mod freshness;
mod pipeline;
mod reconcile;

pub use crate::freshness::Freshness;
pub use crate::pipeline::{CycleOutcome, CycleReport, Pipeline, Remote};
pub use crate::reconcile::{ReconcileEvent, ReconcileReport, reconcile, reconcile_all};
