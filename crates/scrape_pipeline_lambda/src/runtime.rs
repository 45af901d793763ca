//! Module boundary over the deterministic core crate.

pub use scrape_pipeline_core::{contract, dataset, sampler, sql, storage_keys};
