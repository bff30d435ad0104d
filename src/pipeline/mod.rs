//! Pipeline entry points for alert runs.
//!
//! - `walk`: ancestor chain traversal and classification rules
//! - `scan`: the `AlertEngine` that drives one invocation

pub mod scan;
#[cfg(test)]
pub(crate) mod testing;
pub mod walk;

pub use scan::{AlertEngine, RunSummary, ScanSettings, scan_start};
pub use walk::{Chain, ChainEnd, DEFAULT_MAX_CHAIN_DEPTH, classify, walk_chain};
