//! Lane Packer: split each node's jobs into non-overlapping lanes.
//!
//! Greedy earliest-start policy. A lane is filled by walking the node's
//! unplaced jobs in `(handler_start, job_id)` order and taking every job
//! whose `handler_start` is strictly after the lane's current end. When a
//! pass places nothing more, the lane is closed and the next one opens.
//!
//! This is a heuristic: it always yields a valid disjoint partition but is
//! not an optimal interval partitioning.

use crate::model::natord::natural_cmp;
use crate::model::timeline::{Job, Timeline};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lane {
    /// `<display node>_<index>`.
    pub key: String,
    /// Canonical node name, used for identity lookups.
    pub node_name: String,
    /// Node name used only for lane keys and ordering.
    pub display_node: String,
    /// Position among the node's lanes, in opening order.
    pub index: usize,
    pub jobs: Vec<Job>,
}

/// A node name without any digit gets a trailing `1`, so that it orders
/// next to numbered siblings (`worker` -> `worker1`).
pub fn display_node_name(node_name: &str) -> String {
    if node_name.chars().any(|c| c.is_ascii_digit()) {
        node_name.to_string()
    } else {
        format!("{}1", node_name)
    }
}

pub fn lane_key(display_node: &str, index: usize) -> String {
    format!("{}_{}", display_node, index)
}

/// Partition one node's jobs into disjoint groups, in opening order.
pub fn split_disjoint(jobs: &[Job]) -> Vec<Vec<Job>> {
    let mut unplaced: Vec<&Job> = jobs.iter().collect();
    unplaced.sort_by(|a, b| {
        a.handler_start
            .total_cmp(&b.handler_start)
            .then_with(|| a.job_id.cmp(&b.job_id))
    });

    let mut groups = Vec::new();
    while !unplaced.is_empty() {
        let mut group: Vec<Job> = Vec::new();
        let mut current_end: Option<f64> = None;

        unplaced.retain(|job| {
            let fits = current_end.is_none_or(|end| job.handler_start > end);
            if fits {
                current_end = Some(job.handler_end);
                group.push((*job).clone());
            }
            !fits
        });

        groups.push(group);
    }
    groups
}

/// Pack every node of the timeline. Lanes come back in natural key order.
pub fn pack_lanes(timeline: &Timeline) -> Vec<Lane> {
    let mut lanes = Vec::new();
    for (node_name, jobs) in &timeline.nodes {
        let display_node = display_node_name(node_name);
        for (index, group) in split_disjoint(jobs).into_iter().enumerate() {
            lanes.push(Lane {
                key: lane_key(&display_node, index),
                node_name: node_name.clone(),
                display_node: display_node.clone(),
                index,
                jobs: group,
            });
        }
    }

    lanes.sort_by(|a, b| natural_cmp(&a.key, &b.key).then_with(|| a.node_name.cmp(&b.node_name)));
    tracing::debug!(lanes = lanes.len(), nodes = timeline.nodes.len(), "packed lanes");
    lanes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::{BTreeMap, BTreeSet};

    fn job(id: &str, start: f64, end: f64) -> Job {
        Job {
            job_id: id.to_string(),
            node_name: "n1".to_string(),
            task_type: "task".to_string(),
            handler_start: start,
            job_start: start,
            job_end: end,
            handler_end: end,
        }
    }

    fn ids(group: &[Job]) -> Vec<&str> {
        group.iter().map(|j| j.job_id.as_str()).collect()
    }

    fn timeline(nodes: Vec<(&str, Vec<Job>)>) -> Timeline {
        Timeline {
            epoch: None,
            nodes: nodes
                .into_iter()
                .map(|(n, jobs)| (n.to_string(), jobs))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn overlapping_job_opens_second_lane() {
        let groups = split_disjoint(&[job("C", 20.0, 30.0), job("B", 5.0, 15.0), job("A", 0.0, 10.0)]);
        assert_eq!(groups.len(), 2);
        assert_eq!(ids(&groups[0]), vec!["A", "C"]);
        assert_eq!(ids(&groups[1]), vec!["B"]);
    }

    #[test]
    fn touching_intervals_do_not_share_a_lane() {
        // Placement needs a start strictly after the lane's end.
        let groups = split_disjoint(&[job("A", 0.0, 10.0), job("B", 10.0, 12.0)]);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn equal_starts_break_ties_by_job_id() {
        let groups = split_disjoint(&[job("b", 0.0, 1.0), job("a", 0.0, 1.0)]);
        assert_eq!(ids(&groups[0]), vec!["a"]);
        assert_eq!(ids(&groups[1]), vec!["b"]);
    }

    #[test]
    fn lanes_never_overlap_and_keep_every_job() {
        let jobs = vec![
            job("1", 0.0, 4.0),
            job("2", 1.0, 2.0),
            job("3", 2.5, 9.0),
            job("4", 3.0, 3.5),
            job("5", 4.5, 6.0),
            job("6", 5.0, 5.5),
            job("7", 9.5, 11.0),
        ];
        let groups = split_disjoint(&jobs);

        for group in &groups {
            for pair in group.windows(2) {
                assert!(pair[0].handler_end <= pair[1].handler_start);
            }
        }

        let packed: Vec<&str> = groups.iter().flat_map(|g| ids(g)).collect();
        let unique: BTreeSet<&str> = packed.iter().copied().collect();
        assert_eq!(packed.len(), jobs.len());
        assert_eq!(
            unique,
            jobs.iter().map(|j| j.job_id.as_str()).collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn alphabetic_node_gets_numeric_display_name() {
        assert_eq!(display_node_name("master"), "master1");
        assert_eq!(display_node_name("worker-12"), "worker-12");
    }

    #[test]
    fn lane_keys_use_display_name_but_keep_identity() {
        let lanes = pack_lanes(&timeline(vec![(
            "master",
            vec![job("A", 0.0, 10.0), job("B", 5.0, 15.0)],
        )]));
        let keys: Vec<&str> = lanes.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["master1_0", "master1_1"]);
        assert!(lanes.iter().all(|l| l.node_name == "master"));
        assert_eq!(lanes[1].index, 1);
    }

    #[test]
    fn lanes_are_in_natural_order() {
        let lanes = pack_lanes(&timeline(vec![
            ("node-10", vec![job("A", 0.0, 1.0)]),
            ("node-2", vec![job("B", 0.0, 1.0)]),
        ]));
        let keys: Vec<&str> = lanes.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["node-2_0", "node-10_0"]);
    }
}
