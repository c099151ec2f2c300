//! Error taxonomy for timeline reconstruction.
//!
//! Every variant is fatal for the log being processed: no partially
//! reconstructed timeline is ever returned.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    #[error("duplicated description for job {job_id}")]
    DuplicateDescription { job_id: String },

    #[error("inconsistent job descriptions: {field} is '{found}', last known '{expected}'")]
    InconsistentWorkflowMetadata {
        field: &'static str,
        expected: String,
        found: String,
    },

    #[error("there was already a \"{event}\" event for job \"{job_id}\"")]
    DuplicateLifecycleEvent { job_id: String, event: String },

    #[error("job {job_id} is incomplete, missing: {}", .missing.join(", "))]
    IncompleteJob {
        job_id: String,
        missing: Vec<&'static str>,
    },

    #[error("unknown event value {value:?} for job {job_id}")]
    UnknownEventValue { job_id: String, value: String },

    #[error("event references job {job_id} which has no description")]
    UnknownJob { job_id: String },

    #[error("job {job_id} has out-of-order lifecycle: {detail}")]
    OutOfOrderLifecycle { job_id: String, detail: String },

    #[error("invalid timestamp {value:?} for job {job_id}: {reason}")]
    InvalidTimestamp {
        job_id: String,
        value: String,
        reason: String,
    },

    #[error("log contains no job descriptions")]
    MissingJobDescriptions,
}
