//! # clusterkit
//!
//! Deterministic, concurrency-aware utility primitives for a distributed
//! data-processing engine.
//!
//! ## Modules
//!
//! - `num` - Saturating 64-bit arithmetic and greatest common divisor
//! - `sync` - Run-once memoization of a value producer under concurrent access
//! - `partition` - Round-robin assignment of work items to partitions
//! - `naming` - Collision-avoiding name suffixes
//! - `guarantee` - Processing guarantee levels and their combination
//! - `io` - Zip packaging of job artifacts and stream helpers
//! - `config` - Archive packaging configuration
//! - `error` - Crate-wide error type
pub mod config;
pub mod error;
pub mod guarantee;
pub mod io;
pub mod naming;
pub mod num;
pub mod partition;
pub mod sync;

pub use error::{Error, Result};
pub use guarantee::ProcessingGuarantee;
