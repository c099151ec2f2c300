//! Timeline Builder: fold job events into four-point lifecycle intervals.
//!
//! All offsets are measured from one global epoch, the earliest event
//! timestamp of the whole log. Events are folded in `(time, jobId, value)`
//! order so the result never depends on the order rows were read in.
//! A repeated `handlerStart` therefore always arrives with an offset at
//! least as large as the recorded one: later ones are warned about and
//! ignored, equal ones are fatal, and a "smaller duplicate" cannot occur.

use crate::config::TimelineConfig;
use crate::diagnostics;
use crate::error::TimelineError;
use crate::log::{JobEvent, JobMap, LifecycleEvent, ParsedLog};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

/// One fully observed job. Offsets are seconds since the log epoch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub job_id: String,
    pub node_name: String,
    pub task_type: String,
    pub handler_start: f64,
    pub job_start: f64,
    pub job_end: f64,
    pub handler_end: f64,
}

/// Completed jobs grouped by canonical node name, each list ordered by
/// `(handler_start, job_id)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub epoch: Option<NaiveDateTime>,
    pub nodes: BTreeMap<String, Vec<Job>>,
}

impl Timeline {
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.nodes.values().flatten()
    }

    pub fn job_count(&self) -> usize {
        self.nodes.values().map(Vec::len).sum()
    }
}

/// Earliest event timestamp, if there is any event at all.
pub fn epoch(events: &[JobEvent]) -> Option<NaiveDateTime> {
    events.iter().map(|e| e.time).min()
}

/// Offset from the epoch in whole microseconds (the log's resolution).
pub fn offset_micros(time: NaiveDateTime, epoch: NaiveDateTime) -> i64 {
    (time - epoch).num_microseconds().unwrap_or(i64::MAX)
}

pub fn micros_to_secs(micros: i64) -> f64 {
    micros as f64 / 1_000_000.0
}

/// Events ordered by `(time, job_id, value)`.
pub fn canonical_order(events: &[JobEvent]) -> Vec<&JobEvent> {
    let mut sorted: Vec<&JobEvent> = events.iter().collect();
    sorted.sort_by(|a, b| {
        a.time
            .cmp(&b.time)
            .then_with(|| a.job_id.cmp(&b.job_id))
            .then_with(|| a.value.cmp(&b.value))
    });
    sorted
}

type Slots = [Option<i64>; 4];

pub fn build_timeline(log: &ParsedLog, cfg: &TimelineConfig) -> Result<Timeline, TimelineError> {
    let Some(epoch) = epoch(&log.events) else {
        ensure_every_job_has_events(&log.jobs, &BTreeMap::new())?;
        return Ok(Timeline {
            epoch: None,
            nodes: BTreeMap::new(),
        });
    };

    let mut partial: BTreeMap<&str, Slots> = BTreeMap::new();

    for event in canonical_order(&log.events) {
        if !log.jobs.contains_key(&event.job_id) {
            return Err(TimelineError::UnknownJob {
                job_id: event.job_id.clone(),
            });
        }

        let slots = partial.entry(event.job_id.as_str()).or_insert([None; 4]);

        let Some(kind) = LifecycleEvent::from_value(&event.value) else {
            if cfg.strict_events {
                return Err(TimelineError::UnknownEventValue {
                    job_id: event.job_id.clone(),
                    value: event.value.clone(),
                });
            }
            tracing::debug!(job_id = %event.job_id, value = %event.value, "skipping non-lifecycle event");
            continue;
        };

        let offset = offset_micros(event.time, epoch);
        let slot = &mut slots[kind as usize];
        let recorded = *slot;
        match recorded {
            None => *slot = Some(offset),
            Some(prev) if kind == LifecycleEvent::HandlerStart && offset > prev => {
                diagnostics::warn(format!(
                    "inconsistent logs: too many handlerStart occurrences for job {} (keeping {}s, ignoring {}s)",
                    event.job_id,
                    micros_to_secs(prev),
                    micros_to_secs(offset)
                ));
            }
            Some(_) => {
                return Err(TimelineError::DuplicateLifecycleEvent {
                    job_id: event.job_id.clone(),
                    event: event.value.clone(),
                });
            }
        }
    }

    ensure_every_job_has_events(&log.jobs, &partial)?;

    let mut nodes: BTreeMap<String, Vec<Job>> = BTreeMap::new();
    for (job_id, slots) in &partial {
        let [hs, js, je, he] = complete(job_id, slots)?;
        check_order(job_id, [hs, js, je, he])?;

        // Presence in `partial` implies a description (checked above).
        let Some(desc) = log.jobs.get(*job_id) else {
            return Err(TimelineError::UnknownJob {
                job_id: job_id.to_string(),
            });
        };

        nodes.entry(desc.node_name.clone()).or_default().push(Job {
            job_id: job_id.to_string(),
            node_name: desc.node_name.clone(),
            task_type: desc.name.clone(),
            handler_start: micros_to_secs(hs),
            job_start: micros_to_secs(js),
            job_end: micros_to_secs(je),
            handler_end: micros_to_secs(he),
        });
    }

    for jobs in nodes.values_mut() {
        jobs.sort_by(|a, b| {
            a.handler_start
                .total_cmp(&b.handler_start)
                .then_with(|| a.job_id.cmp(&b.job_id))
        });
    }

    Ok(Timeline {
        epoch: Some(epoch),
        nodes,
    })
}

/// A described job that never produced a single event is as incomplete as
/// one that lost a transition.
fn ensure_every_job_has_events(
    jobs: &JobMap,
    seen: &BTreeMap<&str, Slots>,
) -> Result<(), TimelineError> {
    match jobs.keys().find(|id| !seen.contains_key(id.as_str())) {
        Some(job_id) => Err(TimelineError::IncompleteJob {
            job_id: job_id.clone(),
            missing: LifecycleEvent::ALL.iter().map(|e| e.as_str()).collect(),
        }),
        None => Ok(()),
    }
}

fn complete(job_id: &str, slots: &Slots) -> Result<[i64; 4], TimelineError> {
    let missing: Vec<&'static str> = LifecycleEvent::ALL
        .iter()
        .zip(slots)
        .filter(|(_, slot)| slot.is_none())
        .map(|(kind, _)| kind.as_str())
        .collect();

    match slots {
        [Some(hs), Some(js), Some(je), Some(he)] => Ok([*hs, *js, *je, *he]),
        _ => Err(TimelineError::IncompleteJob {
            job_id: job_id.to_string(),
            missing,
        }),
    }
}

fn check_order(job_id: &str, offsets: [i64; 4]) -> Result<(), TimelineError> {
    for (i, pair) in offsets.windows(2).enumerate() {
        if pair[0] > pair[1] {
            return Err(TimelineError::OutOfOrderLifecycle {
                job_id: job_id.to_string(),
                detail: format!(
                    "{} at {}s is after {} at {}s",
                    LifecycleEvent::ALL[i].as_str(),
                    micros_to_secs(pair[0]),
                    LifecycleEvent::ALL[i + 1].as_str(),
                    micros_to_secs(pair[1])
                ),
            });
        }
    }
    Ok(())
}
