//! Occupancy Sweep: number of concurrently active jobs over time.
//!
//! Each start marker adds one and each end marker removes one. Deltas that
//! share an offset are netted before the running sum is sampled, so a job
//! ending exactly when another starts produces no blip.

use crate::log::JobEvent;
use crate::model::timeline::{epoch, micros_to_secs, offset_micros};
use serde::Serialize;
use std::collections::BTreeMap;

/// Active count effective from `time_offset` until the next sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OccupancySample {
    pub time_offset: f64,
    pub active: i64,
}

/// Step function starting at `(0.0, 0)` with strictly increasing offsets.
pub fn sweep(events: &[JobEvent], start: &str, end: &str) -> Vec<OccupancySample> {
    let mut samples = vec![OccupancySample {
        time_offset: 0.0,
        active: 0,
    }];
    let Some(epoch) = epoch(events) else {
        return samples;
    };

    let mut deltas: BTreeMap<i64, i64> = BTreeMap::new();
    for event in events {
        let delta = if event.value == start {
            1
        } else if event.value == end {
            -1
        } else {
            continue;
        };
        *deltas.entry(offset_micros(event.time, epoch)).or_default() += delta;
    }

    let mut active = 0i64;
    for (micros, delta) in deltas {
        active += delta;
        let time_offset = micros_to_secs(micros);
        match samples.last_mut() {
            Some(last) if last.time_offset == time_offset => last.active = active,
            _ => samples.push(OccupancySample {
                time_offset,
                active,
            }),
        }
    }
    samples
}

/// Highest active count reached.
pub fn peak(samples: &[OccupancySample]) -> i64 {
    samples.iter().map(|s| s.active).max().unwrap_or(0)
}
