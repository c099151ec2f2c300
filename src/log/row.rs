use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One row of `job_descriptions.jsonl`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescription {
    pub job_id: String,
    pub node_name: String,
    /// Task type.
    pub name: String,
    pub workflow_name: String,
    pub size: WorkflowSize,
    pub version: String,
}

/// Workflow size as logged: some producers write a number, others a string.
/// Values are compared as logged, so `5` and `"5"` are different sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkflowSize {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for WorkflowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowSize::Int(v) => write!(f, "{}", v),
            WorkflowSize::Float(v) => write!(f, "{}", v),
            WorkflowSize::Text(v) => f.write_str(v),
        }
    }
}

/// One row of `metrics.jsonl`. Only rows with `parameter == "event"` reach
/// the timeline; other rows carry arbitrary JSON in `value`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    pub job_id: String,
    pub parameter: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub time: String,
}

impl MetricRecord {
    pub fn is_event(&self) -> bool {
        self.parameter == EVENT_PARAMETER
    }
}

pub const EVENT_PARAMETER: &str = "event";

/// The four transitions every job goes through, in their expected order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleEvent {
    HandlerStart,
    JobStart,
    JobEnd,
    HandlerEnd,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 4] = [
        LifecycleEvent::HandlerStart,
        LifecycleEvent::JobStart,
        LifecycleEvent::JobEnd,
        LifecycleEvent::HandlerEnd,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleEvent::HandlerStart => "handlerStart",
            LifecycleEvent::JobStart => "jobStart",
            LifecycleEvent::JobEnd => "jobEnd",
            LifecycleEvent::HandlerEnd => "handlerEnd",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == value)
    }
}

/// A single `parameter == "event"` row with its timestamp parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEvent {
    pub job_id: String,
    /// Task name as logged on the metric row.
    pub name: String,
    pub value: String,
    pub time: NaiveDateTime,
}

/// Workflow identity shared by every description row of one log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowInfo {
    pub name: String,
    pub size: WorkflowSize,
    pub version: String,
}

/// Everything the Event Parser hands to the model.
#[derive(Debug, Clone)]
pub struct ParsedLog {
    pub jobs: JobMap,
    pub workflow: WorkflowInfo,
    pub events: Vec<JobEvent>,
}

/// Job descriptions keyed by job id.
pub type JobMap = BTreeMap<String, JobDescription>;
