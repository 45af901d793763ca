//! AWS-oriented adapters and handlers for the scraped-message pipeline.
//!
//! This crate owns runtime integration details (Lambda handlers, queue
//! publishing, warehouse statement execution, and staged-object storage) and
//! exposes a single runtime module boundary over the deterministic core
//! primitives.

pub mod adapters;
pub mod handlers;
pub mod runtime;
