//! Frequency of each status / failure-type combination (pie chart input)

use serde::Serialize;
use std::collections::HashMap;

use crate::types::{MaintenanceStatus, SensorReading};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRatioRecord {
    pub status: String,
    pub count: usize,
}

/// `"needs maintenance - Bearing"` / `"no maintenance needed - Normal"`
pub fn ratio_label(status: MaintenanceStatus, failure_type: &str) -> String {
    format!("{} - {}", status.ratio_prefix(), failure_type)
}

/// Count readings per composite label. Ordered by count descending, then label.
pub fn status_ratio(rows: &[&SensorReading]) -> Vec<StatusRatioRecord> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for r in rows {
        *counts
            .entry(ratio_label(r.maintenance_required, &r.failure_type))
            .or_insert(0) += 1;
    }

    let mut records: Vec<StatusRatioRecord> = counts
        .into_iter()
        .map(|(status, count)| StatusRatioRecord { status, count })
        .collect();
    records.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.status.cmp(&b.status)));
    records
}
