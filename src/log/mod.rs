//! Event parsing for HyperFlow job descriptions and metric logs.

pub mod parse;
pub mod row;

pub use parse::{parse_log_dir, parse_records};
pub use row::{
    JobDescription, JobEvent, JobMap, LifecycleEvent, MetricRecord, ParsedLog, WorkflowInfo,
    WorkflowSize,
};
