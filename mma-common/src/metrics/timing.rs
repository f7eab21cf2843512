//! Release timing heatmap

use crate::merger::WorkingTable;
use crate::metrics::median;
use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

/// Median views of videos released in one (month, weekday) slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    /// Full month name, e.g. "January"
    pub month: String,
    /// Full weekday name, e.g. "Monday"
    pub weekday: String,
    pub median_views: f64,
    pub videos: usize,
}

fn slot(release: NaiveDateTime) -> (u32, u32) {
    (release.month(), release.weekday().num_days_from_monday())
}

/// Median views by release month and weekday
///
/// Cells are ordered January..December, then Monday..Sunday; empty slots are
/// omitted. `None` when the working table has no release dates.
pub fn timing_heatmap(table: &WorkingTable) -> Option<Vec<HeatmapCell>> {
    if !table.has_release_dates() {
        return None;
    }

    let mut groups: BTreeMap<(u32, u32), (NaiveDateTime, Vec<u64>)> = BTreeMap::new();
    for v in &table.rows {
        if let Some(release) = v.release_date {
            groups
                .entry(slot(release))
                .or_insert_with(|| (release, Vec::new()))
                .1
                .push(v.views);
        }
    }

    let cells = groups
        .into_values()
        .filter_map(|(sample, views)| {
            Some(HeatmapCell {
                month: sample.format("%B").to_string(),
                weekday: sample.format("%A").to_string(),
                median_views: median(&views)?,
                videos: views.len(),
            })
        })
        .collect();

    Some(cells)
}
