//! Per-video revenue and per-artist wealth figures

use crate::assumptions::Assumptions;
use crate::merger::WorkingTable;
use crate::models::VideoRecord;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of artists shown in the asset-gap ranking
pub const ASSET_GAP_TOP_N: usize = 15;

/// Minimum views for a video to appear on the lottery chart
pub const LOTTERY_MIN_VIEWS: u64 = 10_000;

/// Whether selling a video for the flat fee paid off for the artist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// Revenue exceeded the flat fee
    #[serde(rename = "Artist Lost Money (Hit Song)")]
    ArtistLostMoney,
    /// Revenue at or below the flat fee
    #[serde(rename = "Artist Won (Safe)")]
    ArtistWon,
}

impl Outcome {
    /// Classify a video's revenue against the flat fee (ties favour the artist)
    pub fn classify(revenue: f64, flat_fee: f64) -> Self {
        if revenue > flat_fee {
            Outcome::ArtistLostMoney
        } else {
            Outcome::ArtistWon
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::ArtistLostMoney => "Artist Lost Money (Hit Song)",
            Outcome::ArtistWon => "Artist Won (Safe)",
        }
    }
}

/// Working-table row augmented with revenue and outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoRevenue {
    #[serde(flatten)]
    pub video: VideoRecord,
    pub revenue: f64,
    pub outcome: Outcome,
}

/// Per-video revenue, in working-table order
pub fn video_revenue(table: &WorkingTable, assumptions: &Assumptions) -> Vec<VideoRevenue> {
    table
        .rows
        .iter()
        .map(|video| {
            let revenue = assumptions.revenue_for_views(video.views as f64);
            VideoRevenue {
                video: video.clone(),
                revenue,
                outcome: Outcome::classify(revenue, assumptions.flat_fee),
            }
        })
        .collect()
}

/// Wealth figures for one artist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistAggregate {
    pub artist: String,
    pub views: u64,
    pub video_count: usize,
    pub revenue: f64,
    pub est_fees_received: f64,
    pub total_prod_cost: f64,
    pub net_independent_profit: f64,
    pub wealth_gap: f64,
}

/// Group per-video revenue by artist, ordered by artist name
pub fn artist_aggregates(videos: &[VideoRevenue], assumptions: &Assumptions) -> Vec<ArtistAggregate> {
    let mut groups: BTreeMap<&str, (u64, usize, f64)> = BTreeMap::new();
    for v in videos {
        let entry = groups.entry(v.video.artist.as_str()).or_default();
        entry.0 = entry.0.saturating_add(v.video.views);
        entry.1 += 1;
        entry.2 += v.revenue;
    }

    groups
        .into_iter()
        .map(|(artist, (views, video_count, revenue))| {
            let est_fees_received = video_count as f64 * assumptions.flat_fee;
            let total_prod_cost = video_count as f64 * assumptions.prod_cost;
            let net_independent_profit = revenue - total_prod_cost;
            ArtistAggregate {
                artist: artist.to_string(),
                views,
                video_count,
                revenue,
                est_fees_received,
                total_prod_cost,
                net_independent_profit,
                wealth_gap: net_independent_profit - est_fees_received,
            }
        })
        .collect()
}

/// Sign of the summed wealth gap
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GapVerdict {
    /// Money left on the table by selling rights
    OpportunityCost(f64),
    /// Artists collected more in fees than the videos earned
    ValueSaved(f64),
}

/// Asset-gap view: top earners plus the overall verdict
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetGap {
    pub top_artists: Vec<ArtistAggregate>,
    pub total_wealth_gap: f64,
    pub verdict: GapVerdict,
}

/// Rank artists by revenue and sum the wealth gap
pub fn asset_gap(aggregates: &[ArtistAggregate]) -> AssetGap {
    let mut top_artists = aggregates.to_vec();
    top_artists.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    top_artists.truncate(ASSET_GAP_TOP_N);

    let total_wealth_gap: f64 = aggregates.iter().map(|a| a.wealth_gap).sum();
    let verdict = if total_wealth_gap > 0.0 {
        GapVerdict::OpportunityCost(total_wealth_gap)
    } else {
        GapVerdict::ValueSaved(total_wealth_gap.abs())
    };

    AssetGap {
        top_artists,
        total_wealth_gap,
        verdict,
    }
}

/// One dot on the lottery chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotteryPoint {
    pub release_date: NaiveDateTime,
    pub revenue: f64,
    pub outcome: Outcome,
    pub title: Option<String>,
    pub artist: String,
}

/// Revenue-vs-release-date scatter with the flat-fee line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotteryChart {
    pub flat_fee: f64,
    pub points: Vec<LotteryPoint>,
}

/// Videos above the view floor with a known release date
///
/// `None` when the working table has no release-date column.
pub fn lottery_chart(
    table: &WorkingTable,
    videos: &[VideoRevenue],
    assumptions: &Assumptions,
) -> Option<LotteryChart> {
    if !table.has_release_dates() {
        return None;
    }
    let points = videos
        .iter()
        .filter(|v| v.video.views > LOTTERY_MIN_VIEWS)
        .filter_map(|v| {
            Some(LotteryPoint {
                release_date: v.video.release_date?,
                revenue: v.revenue,
                outcome: v.outcome,
                title: v.video.title.clone(),
                artist: v.video.artist.clone(),
            })
        })
        .collect();

    Some(LotteryChart {
        flat_fee: assumptions.flat_fee,
        points,
    })
}
