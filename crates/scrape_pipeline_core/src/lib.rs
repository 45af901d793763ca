//! Deterministic domain primitives for the scraped-message warehouse pipeline.
//!
//! This crate owns the message/batch contracts, the bounded sampling draw,
//! warehouse statement texts, and staged-object key construction. It
//! intentionally excludes AWS SDK and Lambda runtime concerns.

pub mod contract;
pub mod dataset;
pub mod sampler;
pub mod sql;
pub mod storage_keys;
