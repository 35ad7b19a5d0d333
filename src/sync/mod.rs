//! Synchronization primitives
//!
//! - `memoize` - run-once memoization of a value producer under concurrent access

pub mod memoize;

pub use memoize::{memoize_concurrent, ConcurrentMemo, MemoState};
