//! Revenue-share proposals

use crate::assumptions::Assumptions;
use crate::merger::WorkingTable;
use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Reverse;

/// Videos considered for the monthly salary
pub const SALARY_RECENT_VIDEOS: usize = 5;

/// Days per month in the salary projection
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Money amount in whole cents
pub type Cents = i64;

/// Dollars to whole cents, rounding half away from zero
///
/// Out-of-range amounts saturate at the `i64` bounds.
pub fn to_cents(dollars: f64) -> Cents {
    (dollars * 100.0).round() as Cents
}

pub fn to_dollars(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

/// Proportional split of one revenue figure, in cents
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RevenueSplit {
    pub gross: Cents,
    pub platform_pct: f64,
    pub platform_share: Cents,
    pub artist_pct: f64,
    pub artist_share: Cents,
}

/// Split `gross` dollars between platform and artist
///
/// The platform share is rounded to the nearest cent and the artist keeps the
/// remainder, so `platform_share + artist_share == gross` for every input.
pub fn split_revenue(gross: f64, assumptions: &Assumptions) -> RevenueSplit {
    let gross = to_cents(gross);
    let fraction = assumptions.platform_cut_pct / 100.0;
    let platform_share = ((gross as f64) * fraction)
        .round()
        .clamp(gross.min(0) as f64, gross.max(0) as f64) as Cents;
    RevenueSplit {
        gross,
        platform_pct: assumptions.platform_cut_pct,
        platform_share,
        artist_pct: assumptions.artist_cut_pct(),
        artist_share: gross - platform_share,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayStubRow {
    pub title: Option<String>,
    pub release_date: Option<NaiveDateTime>,
    pub avg_daily_views: Option<f64>,
    pub gross_monthly: Option<f64>,
    pub net_monthly_pay: Option<f64>,
}

/// Monthly paycheck an artist would draw under the proposed split
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryReport {
    pub artist: String,
    pub artist_cut_pct: f64,
    pub rows: Vec<PayStubRow>,
    pub total_monthly: f64,
    pub annual_run_rate: f64,
}

/// Project a monthly salary from an artist's most recent videos
///
/// Returns `Ok(None)` when the working table lacks release dates or average
/// daily views, and `EmptySelection` when the artist has no videos.
pub fn monthly_salary(
    table: &WorkingTable,
    artist: &str,
    assumptions: &Assumptions,
) -> Result<Option<SalaryReport>> {
    if !table.has_release_dates() || !table.has_avg_daily_views {
        return Ok(None);
    }

    let mut videos: Vec<_> = table.rows.iter().filter(|v| v.artist == artist).collect();
    if videos.is_empty() {
        return Err(Error::EmptySelection(format!("no videos for artist '{}'", artist)));
    }

    // Newest first, undated last
    videos.sort_by_key(|v| (v.release_date.is_none(), Reverse(v.release_date)));
    videos.truncate(SALARY_RECENT_VIDEOS);

    let artist_fraction = assumptions.artist_cut_pct() / 100.0;
    let rows: Vec<_> = videos
        .into_iter()
        .map(|v| {
            let gross_monthly = v
                .avg_daily_views
                .map(|adv| assumptions.revenue_for_views(adv * DAYS_PER_MONTH));
            PayStubRow {
                title: v.title.clone(),
                release_date: v.release_date,
                avg_daily_views: v.avg_daily_views,
                gross_monthly,
                net_monthly_pay: gross_monthly.map(|g| g * artist_fraction),
            }
        })
        .collect();

    let total_monthly: f64 = rows.iter().filter_map(|r| r.net_monthly_pay).sum();

    Ok(Some(SalaryReport {
        artist: artist.to_string(),
        artist_cut_pct: assumptions.artist_cut_pct(),
        rows,
        total_monthly,
        annual_run_rate: total_monthly * 12.0,
    }))
}
