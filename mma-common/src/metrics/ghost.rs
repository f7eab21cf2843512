//! Ghost income
//!
//! Passive revenue that old videos still earn today, usually forfeited by an
//! artist who sold the rights outright. A video qualifies when it is older
//! than the configured threshold and still averages more than
//! [`GHOST_MIN_DAILY_VIEWS`] views a day.

use crate::assumptions::Assumptions;
use crate::merger::WorkingTable;
use crate::time::days_since;
use chrono::NaiveDate;
use serde::Serialize;

/// Daily-view floor for a video to count as a ghost-income source
pub const GHOST_MIN_DAILY_VIEWS: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GhostIncomeRow {
    pub title: Option<String>,
    pub artist: String,
    pub days_since_release: i64,
    pub avg_daily_views: f64,
    pub est_annual_passive: f64,
}

/// Qualifying videos, highest passive income first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GhostIncome {
    pub threshold_days: f64,
    pub rows: Vec<GhostIncomeRow>,
    pub total_annual_passive: f64,
}

/// Flag old videos that still earn
///
/// Needs both release dates and average daily views; `None` otherwise. Rows
/// missing either value are skipped individually.
pub fn ghost_income(
    table: &WorkingTable,
    assumptions: &Assumptions,
    as_of: NaiveDate,
) -> Option<GhostIncome> {
    if !table.has_release_dates() || !table.has_avg_daily_views {
        return None;
    }

    let threshold_days = assumptions.ghost_days();
    let mut rows: Vec<_> = table
        .rows
        .iter()
        .filter_map(|v| {
            let days = days_since(v.release_date?, as_of);
            let adv = v.avg_daily_views?;
            if (days as f64) > threshold_days && adv > GHOST_MIN_DAILY_VIEWS {
                Some(GhostIncomeRow {
                    title: v.title.clone(),
                    artist: v.artist.clone(),
                    days_since_release: days,
                    avg_daily_views: adv,
                    est_annual_passive: assumptions.revenue_for_views(adv * 365.0),
                })
            } else {
                None
            }
        })
        .collect();

    rows.sort_by(|a, b| b.est_annual_passive.total_cmp(&a.est_annual_passive));
    let total_annual_passive = rows.iter().map(|r| r.est_annual_passive).sum();

    Some(GhostIncome {
        threshold_days,
        rows,
        total_annual_passive,
    })
}
