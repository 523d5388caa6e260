//! Tracing and logging setup shared by workers and callers.

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use tracing::{init, init_with_filter};
