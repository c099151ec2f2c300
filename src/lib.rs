//! Reconstruct per-node Gantt lanes and an active-job count from HyperFlow
//! execution logs.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod log;
pub mod model;
pub mod render;

pub use config::TimelineConfig;
pub use error::TimelineError;

pub type Result<T> = anyhow::Result<T>;
