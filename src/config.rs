//! Reconstruction options.
//!
//! The CLI maps its flags onto [`TimelineConfig`]; library callers can build
//! one directly or start from `Default`.

use crate::log::LifecycleEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineConfig {
    /// Event value counted as +1 by the occupancy sweep.
    pub occupancy_start: String,
    /// Event value counted as -1 by the occupancy sweep.
    pub occupancy_end: String,
    /// Fail on event values that are not lifecycle transitions instead of
    /// skipping them.
    pub strict_events: bool,
    /// Label lanes with the whole lane key rather than the suffix after the
    /// last `-`.
    pub full_node_names: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            occupancy_start: LifecycleEvent::JobStart.as_str().to_string(),
            occupancy_end: LifecycleEvent::JobEnd.as_str().to_string(),
            strict_events: false,
            full_node_names: false,
        }
    }
}
