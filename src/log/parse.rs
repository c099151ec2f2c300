use crate::diagnostics;
use crate::error::TimelineError;
use crate::log::row::{
    JobDescription, JobEvent, JobMap, MetricRecord, ParsedLog, WorkflowInfo, WorkflowSize,
};
use anyhow::{Context, bail};
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub const JOB_DESCRIPTIONS_FILE: &str = "job_descriptions.jsonl";
pub const METRICS_FILE: &str = "metrics.jsonl";

/// Timestamp layout used by the metric log, e.g. `2021-03-04T12:01:02.250000`.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Load one directory of logs: `job_descriptions.jsonl` and `metrics.jsonl`.
pub fn parse_log_dir(dir: &Path) -> anyhow::Result<ParsedLog> {
    let descriptions: Vec<JobDescription> = load_jsonl(&dir.join(JOB_DESCRIPTIONS_FILE))?;
    let metrics: Vec<MetricRecord> = load_jsonl(&dir.join(METRICS_FILE))?;
    tracing::debug!(
        descriptions = descriptions.len(),
        metrics = metrics.len(),
        "loaded {}",
        dir.display()
    );

    let parsed = parse_records(descriptions, &metrics)
        .with_context(|| diagnostics::error_message(format!("malformed logs in {}", dir.display())))?;
    Ok(parsed)
}

/// Read a JSON-lines file, one object per non-blank line.
pub fn load_jsonl<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let text = fs::read_to_string(path)
        .with_context(|| diagnostics::error_message(format!("read {}", path.display())))?;

    let mut out = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let lno = lineno + 1;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        match serde_json::from_str(line) {
            Ok(row) => out.push(row),
            Err(err) => {
                bail!(
                    "{}",
                    diagnostics::error_message(format!(
                        "parse error at {}:{}: {}",
                        path.display(),
                        lno,
                        err
                    ))
                );
            }
        }
    }

    Ok(out)
}

/// The Event Parser proper: validate descriptions and extract event rows.
pub fn parse_records(
    descriptions: Vec<JobDescription>,
    metrics: &[MetricRecord],
) -> Result<ParsedLog, TimelineError> {
    let workflow = workflow_info(&descriptions)?;
    let jobs = build_job_map(descriptions)?;
    let events = extract_events(metrics)?;

    Ok(ParsedLog {
        jobs,
        workflow,
        events,
    })
}

/// Index descriptions by job id; a job id may be described only once.
pub fn build_job_map(descriptions: Vec<JobDescription>) -> Result<JobMap, TimelineError> {
    let mut out = JobMap::new();
    for row in descriptions {
        if out.contains_key(&row.job_id) {
            return Err(TimelineError::DuplicateDescription { job_id: row.job_id });
        }
        out.insert(row.job_id.clone(), row);
    }
    Ok(out)
}

/// Workflow name, size and version must be identical on every row.
pub fn workflow_info(descriptions: &[JobDescription]) -> Result<WorkflowInfo, TimelineError> {
    let Some(first) = descriptions.first() else {
        return Err(TimelineError::MissingJobDescriptions);
    };

    for row in descriptions {
        if row.workflow_name != first.workflow_name {
            return Err(inconsistent("workflowName", &first.workflow_name, &row.workflow_name));
        }
        if row.size != first.size {
            return Err(inconsistent::<WorkflowSize>("size", &first.size, &row.size));
        }
        if row.version != first.version {
            return Err(inconsistent("version", &first.version, &row.version));
        }
    }

    Ok(WorkflowInfo {
        name: first.workflow_name.clone(),
        size: first.size.clone(),
        version: first.version.clone(),
    })
}

fn inconsistent<T: std::fmt::Display + ?Sized>(
    field: &'static str,
    expected: &T,
    found: &T,
) -> TimelineError {
    TimelineError::InconsistentWorkflowMetadata {
        field,
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

/// Keep `parameter == "event"` rows, with `value` as a string and `time`
/// parsed. Rows are returned in input order.
pub fn extract_events(metrics: &[MetricRecord]) -> Result<Vec<JobEvent>, TimelineError> {
    let mut out = Vec::new();
    for metric in metrics.iter().filter(|m| m.is_event()) {
        let value = match &metric.value {
            Some(serde_json::Value::String(v)) => v.clone(),
            other => {
                return Err(TimelineError::UnknownEventValue {
                    job_id: metric.job_id.clone(),
                    value: other
                        .as_ref()
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "<missing>".to_string()),
                });
            }
        };

        let time = parse_timestamp(&metric.time).map_err(|err| TimelineError::InvalidTimestamp {
            job_id: metric.job_id.clone(),
            value: metric.time.clone(),
            reason: err.to_string(),
        })?;

        out.push(JobEvent {
            job_id: metric.job_id.clone(),
            name: metric.name.clone(),
            value,
            time,
        });
    }
    Ok(out)
}

pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s.trim(), TIME_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn desc(job_id: &str, node: &str) -> JobDescription {
        JobDescription {
            job_id: job_id.to_string(),
            node_name: node.to_string(),
            name: "mProject".to_string(),
            workflow_name: "montage".to_string(),
            size: WorkflowSize::Float(0.25),
            version: "1.0.0".to_string(),
        }
    }

    fn metric(job_id: &str, parameter: &str, value: serde_json::Value, time: &str) -> MetricRecord {
        MetricRecord {
            job_id: job_id.to_string(),
            parameter: parameter.to_string(),
            name: "mProject".to_string(),
            value: Some(value),
            time: time.to_string(),
        }
    }

    #[test]
    fn duplicate_description_is_rejected() {
        let err = build_job_map(vec![desc("J1", "node-1"), desc("J1", "node-2")]).unwrap_err();
        assert_eq!(
            err,
            TimelineError::DuplicateDescription {
                job_id: "J1".to_string()
            }
        );
    }

    #[test]
    fn inconsistent_workflow_version_is_rejected() {
        let mut other = desc("J2", "node-1");
        other.version = "2.0.0".to_string();
        let err = workflow_info(&[desc("J1", "node-1"), other]).unwrap_err();
        assert_eq!(
            err,
            TimelineError::InconsistentWorkflowMetadata {
                field: "version",
                expected: "1.0.0".to_string(),
                found: "2.0.0".to_string(),
            }
        );
    }

    #[test]
    fn inconsistent_workflow_name_is_rejected() {
        let mut other = desc("J2", "node-1");
        other.workflow_name = "soykb".to_string();
        let err = workflow_info(&[desc("J1", "node-1"), desc("J3", "node-2"), other]).unwrap_err();
        assert_eq!(
            err,
            TimelineError::InconsistentWorkflowMetadata {
                field: "workflowName",
                expected: "montage".to_string(),
                found: "soykb".to_string(),
            }
        );
    }

    #[test]
    fn numeric_and_text_sizes_differ() {
        let mut other = desc("J2", "node-1");
        other.size = WorkflowSize::Text("0.25".to_string());
        let err = workflow_info(&[desc("J1", "node-1"), other]).unwrap_err();
        assert!(matches!(
            err,
            TimelineError::InconsistentWorkflowMetadata { field: "size", .. }
        ));
    }

    #[test]
    fn empty_descriptions_have_no_workflow() {
        assert_eq!(
            workflow_info(&[]).unwrap_err(),
            TimelineError::MissingJobDescriptions
        );
    }

    #[test]
    fn non_event_rows_are_ignored() {
        let metrics = vec![
            metric("J1", "cpu", serde_json::json!(12.5), "not a time"),
            metric(
                "J1",
                "event",
                serde_json::json!("jobStart"),
                "2021-03-04T12:00:01.500000",
            ),
        ];
        let events = extract_events(&metrics).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].value, "jobStart");
        assert_eq!(
            events[0].time,
            parse_timestamp("2021-03-04T12:00:01.5").unwrap()
        );
    }

    #[test]
    fn event_without_string_value_is_unknown() {
        let metrics = vec![metric("J1", "event", serde_json::json!(3), "2021-03-04T12:00:01.0")];
        assert_eq!(
            extract_events(&metrics).unwrap_err(),
            TimelineError::UnknownEventValue {
                job_id: "J1".to_string(),
                value: "3".to_string(),
            }
        );
    }

    #[test]
    fn bad_event_timestamp_is_reported() {
        let metrics = vec![metric("J1", "event", serde_json::json!("jobEnd"), "yesterday")];
        assert!(matches!(
            extract_events(&metrics).unwrap_err(),
            TimelineError::InvalidTimestamp { .. }
        ));
    }

    #[test]
    fn description_rows_deserialize_from_camel_case() {
        let row: JobDescription = serde_json::from_str(
            r#"{"jobId":"1-2","nodeName":"worker-7","name":"mDiff","workflowName":"montage","size":2,"version":"1.0.0","extra":true}"#,
        )
        .unwrap();
        assert_eq!(row.job_id, "1-2");
        assert_eq!(row.node_name, "worker-7");
        assert_eq!(row.size, WorkflowSize::Int(2));
    }
}
