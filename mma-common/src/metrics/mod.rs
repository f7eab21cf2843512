//! Metrics engine
//!
//! Every function here is a pure function of its inputs: the working table
//! (or history log), the [`Assumptions`](crate::assumptions::Assumptions) and,
//! where a scenario needs a clock, an explicit `as_of` date. Identical inputs
//! always produce identical outputs.
//!
//! Scenarios that depend on an optional column (release date, average daily
//! views, a second capture date) return `None` when it is missing instead of
//! failing the whole computation.

pub mod deal;
pub mod ghost;
pub mod growth;
pub mod revenue;
pub mod split;
pub mod timing;

pub use deal::{simulate_deal, DealOutcome, DealTerms, DealVerdict};
pub use ghost::{ghost_income, GhostIncome, GhostIncomeRow};
pub use growth::{velocity, weekly_pulse, VelocityPoint, VideoGrowth, WeeklyPulse};
pub use revenue::{
    artist_aggregates, asset_gap, lottery_chart, video_revenue, ArtistAggregate, AssetGap,
    GapVerdict, LotteryChart, Outcome, VideoRevenue,
};
pub use split::{
    monthly_salary, split_revenue, to_cents, to_dollars, Cents, PayStubRow, RevenueSplit,
    SalaryReport,
};
pub use timing::{timing_heatmap, HeatmapCell};

/// Median of a set of view counts; `None` for an empty slice
pub fn median(values: &[u64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0)
    } else {
        Some(sorted[mid] as f64)
    }
}

/// Signed change from `prev` to `now`, clamped to the `i64` range
pub fn view_delta(now: u64, prev: u64) -> i64 {
    let delta = i128::from(now) - i128::from(prev);
    delta.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_delta_clamps() {
        assert_eq!(view_delta(1_200, 1_000), 200);
        assert_eq!(view_delta(1_000, 1_200), -200);
        assert_eq!(view_delta(u64::MAX, 0), i64::MAX);
        assert_eq!(view_delta(0, u64::MAX), i64::MIN);
    }

    #[test]
    fn test_median_odd_even_empty() {
        assert_eq!(median(&[3, 1, 2]), Some(2.0));
        assert_eq!(median(&[4, 1, 3, 2]), Some(2.5));
        assert_eq!(median(&[7]), Some(7.0));
        assert_eq!(median(&[]), None);
    }
}
