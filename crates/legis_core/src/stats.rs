use crate::schema::{StageStatus, TimelineNode};
use std::collections::BTreeMap;

/// How many in-progress processes currently sit at each stage, keyed by
/// the name of their current node.
pub fn stage_breakdown<'a>(
    timelines: impl IntoIterator<Item = &'a [TimelineNode]>,
) -> BTreeMap<String, usize> {
    let mut breakdown = BTreeMap::new();
    for timeline in timelines {
        if let Some(current) = timeline.iter().find(|node| node.status == StageStatus::Current) {
            *breakdown.entry(current.name.clone()).or_insert(0) += 1;
        }
    }
    breakdown
}
