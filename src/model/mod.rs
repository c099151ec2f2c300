//! Reconstruction model: parsed log -> timeline -> lanes + occupancy.

pub mod lanes;
pub mod natord;
pub mod occupancy;
pub mod timeline;

pub use lanes::{Lane, pack_lanes};
pub use occupancy::{OccupancySample, sweep};
pub use timeline::{Job, Timeline, build_timeline};

use crate::config::TimelineConfig;
use crate::error::TimelineError;
use crate::log::{JobEvent, ParsedLog, WorkflowInfo};
use crate::log::parse::TIME_FORMAT;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneView {
    pub key: String,
    /// Axis label: the whole key, or the part after the last `-`.
    pub label: String,
    pub node_name: String,
    /// Node name the key was derived from (digit-less names get a `1`).
    pub display_node: String,
    /// Position among the node's lanes, in opening order.
    pub index: usize,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportData {
    pub workflow: WorkflowInfo,
    /// Wall-clock time of the earliest event, `None` for a log with no events.
    pub epoch: Option<String>,
    /// Upper bound of the shared time axis, in whole seconds.
    pub max_time: f64,
    /// Task types ordered by their latest event.
    pub task_types: Vec<String>,
    pub lanes: Vec<LaneView>,
    pub occupancy: Vec<OccupancySample>,
    pub totals: TotalsView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalsView {
    pub jobs: usize,
    pub nodes: usize,
    pub lanes: usize,
    pub peak_active: i64,
}

/// Build report data. Fails on the first malformed job; nothing partial is
/// ever returned.
pub fn build_report_data(log: &ParsedLog, cfg: &TimelineConfig) -> Result<ReportData, TimelineError> {
    let timeline = build_timeline(log, cfg)?;
    let lanes = pack_lanes(&timeline);
    let occupancy = sweep(&log.events, &cfg.occupancy_start, &cfg.occupancy_end);

    let totals = TotalsView {
        jobs: timeline.job_count(),
        nodes: timeline.nodes.len(),
        lanes: lanes.len(),
        peak_active: occupancy::peak(&occupancy),
    };

    let lanes = lanes
        .into_iter()
        .map(|lane| LaneView {
            label: lane_label(&lane.key, cfg.full_node_names),
            key: lane.key,
            node_name: lane.node_name,
            display_node: lane.display_node,
            index: lane.index,
            jobs: lane.jobs,
        })
        .collect();

    Ok(ReportData {
        workflow: log.workflow.clone(),
        epoch: timeline.epoch.map(|t| t.format(TIME_FORMAT).to_string()),
        max_time: max_time(&timeline),
        task_types: ordered_task_types(&log.events),
        lanes,
        occupancy,
        totals,
    })
}

/// Ceiling of the latest `handler_end`, 0 for an empty timeline.
pub fn max_time(timeline: &Timeline) -> f64 {
    timeline
        .jobs()
        .map(|j| j.handler_end)
        .fold(0.0f64, f64::max)
        .ceil()
}

/// Task names ordered by the last time each one produced an event; ties by
/// name.
pub fn ordered_task_types(events: &[JobEvent]) -> Vec<String> {
    let mut latest: BTreeMap<&str, chrono::NaiveDateTime> = BTreeMap::new();
    for event in events {
        latest
            .entry(event.name.as_str())
            .and_modify(|t| *t = (*t).max(event.time))
            .or_insert(event.time);
    }

    let mut ordered: Vec<(&str, chrono::NaiveDateTime)> = latest.into_iter().collect();
    ordered.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    ordered.into_iter().map(|(name, _)| name.to_string()).collect()
}

pub fn lane_label(key: &str, full_node_names: bool) -> String {
    if full_node_names {
        return key.to_string();
    }
    match key.rsplit_once('-') {
        Some((_, suffix)) => suffix.to_string(),
        None => key.to_string(),
    }
}
