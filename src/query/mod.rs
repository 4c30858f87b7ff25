//! Path lookups over a parsed document
//!
//! - Path: bounded, pre-split slash paths
//! - Cache: LRU of compiled paths
//! - Parallel: rayon batch lookups

pub mod cache;
pub mod parallel;
pub mod path;

pub use cache::PathCache;
pub use parallel::{attributes_parallel, find_parallel};
pub use path::{CompiledPath, PathError, MAX_SEGMENT_LEN};
