//! End-to-end pipeline
//!
//! **Stages:**
//! 1. [`ingest`]: classify raw uploads, filter and attribute the history log
//! 2. [`prepare`]: build the working table and apply the artist selection
//! 3. [`compute`]: run every metric into one serializable [`Report`]
//!
//! Each stage takes ownership of the previous stage's output; nothing is
//! shared or mutated afterwards, so re-running with the same inputs gives the
//! same report.

use crate::assumptions::Assumptions;
use crate::filter::{ContentFilter, Selection};
use crate::merger::{merge, WorkingSource, WorkingTable};
use crate::metrics::{
    self, artist_aggregates, lottery_chart, timing_heatmap, video_revenue, ArtistAggregate,
    AssetGap, GhostIncome, HeatmapCell, LotteryChart, VelocityPoint, VideoRevenue, WeeklyPulse,
};
use crate::models::{DetailTable, HistoryTable};
use crate::resolver::{resolve_history, ArtistMap};
use crate::schema::{classify, TableKind};
use crate::table::RawTable;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Read every CSV upload
///
/// A file that cannot be read even leniently aborts the load.
pub fn load_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<RawTable>> {
    paths.iter().map(|p| RawTable::load(p.as_ref())).collect()
}

/// Classified, filtered and attributed uploads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub history: Option<HistoryTable>,
    pub detail: Option<DetailTable>,
}

/// Classify uploads and prepare the history log
///
/// When several files of one kind are uploaded the last one wins. The content
/// filter runs on the history log before artist attribution.
pub fn ingest(tables: Vec<RawTable>, filter: &ContentFilter) -> Dataset {
    let mut history_raw = None;
    let mut detail_raw = None;

    for table in tables {
        let slot = match classify(&table) {
            TableKind::History => &mut history_raw,
            TableKind::Detail => &mut detail_raw,
            TableKind::Ignored => {
                warn!("{}: no marker column, file ignored", table.name);
                continue;
            }
        };
        if let Some(previous) = slot.replace(table) {
            warn!("{}: replaced by a later file of the same kind", previous.name);
        }
    }

    let detail = detail_raw.map(DetailTable::from_raw);
    let map = ArtistMap::from_detail(detail.as_ref());

    let history = history_raw.map(|raw| {
        let history = filter.apply(HistoryTable::from_raw(raw));
        resolve_history(history, &map)
    });

    info!(
        "Ingest: history {} rows, detail {} rows",
        history.as_ref().map_or(0, HistoryTable::len),
        detail.as_ref().map_or(0, DetailTable::len)
    );

    Dataset { history, detail }
}

/// Working table plus the history log, both narrowed by the selection
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    pub working: WorkingTable,
    pub history: Option<HistoryTable>,
    /// Artists available before the selection was applied
    pub artist_options: Vec<String>,
}

impl Prepared {
    /// `EmptySelection` when the selection left no working rows
    pub fn ensure_rows(&self) -> Result<()> {
        if self.working.is_empty() {
            return Err(Error::EmptySelection(
                "current filters leave no videos to analyse".to_string(),
            ));
        }
        Ok(())
    }
}

/// Merge into a working table and apply the artist selection
pub fn prepare(dataset: Dataset, selection: &Selection) -> Result<Prepared> {
    let mut working = merge(dataset.detail.as_ref(), dataset.history.as_ref())?;
    let artist_options = working.artists();

    let mut history = dataset.history;
    if !selection.is_noop() {
        let before = working.len();
        working.rows = selection.apply_videos(working.rows);
        history = history.map(|h| selection.apply_history(h));
        info!("Selection kept {} of {} working rows", working.len(), before);
    }

    if working.is_empty() {
        warn!("No working rows after selection");
    }

    Ok(Prepared {
        working,
        history,
        artist_options,
    })
}

/// Everything computed for one set of inputs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub as_of: NaiveDate,
    pub assumptions: Assumptions,
    pub source: WorkingSource,
    pub artist_options: Vec<String>,
    pub videos: Vec<VideoRevenue>,
    pub artist_stats: Vec<ArtistAggregate>,
    pub asset_gap: AssetGap,
    pub lottery: Option<LotteryChart>,
    pub ghost_income: Option<GhostIncome>,
    pub weekly_pulse: Option<WeeklyPulse>,
    pub velocity: Option<Vec<VelocityPoint>>,
    pub timing: Option<Vec<HeatmapCell>>,
}

/// Run every metric
pub fn compute(prepared: &Prepared, assumptions: &Assumptions, as_of: NaiveDate) -> Report {
    let working = &prepared.working;
    let videos = video_revenue(working, assumptions);
    let artist_stats = artist_aggregates(&videos, assumptions);
    let asset_gap = metrics::asset_gap(&artist_stats);
    let lottery = lottery_chart(working, &videos, assumptions);
    let ghost_income = metrics::ghost_income(working, assumptions, as_of);
    let timing = timing_heatmap(working);

    let (weekly_pulse, velocity) = match &prepared.history {
        Some(h) => (metrics::weekly_pulse(h, assumptions), metrics::velocity(h)),
        None => (None, None),
    };

    debug!(
        "Scenarios: lottery={} ghost={} pulse={} velocity={} timing={}",
        lottery.is_some(),
        ghost_income.is_some(),
        weekly_pulse.is_some(),
        velocity.is_some(),
        timing.is_some()
    );
    info!(
        "Report: {} videos, {} artists, total wealth gap ${:.0}",
        videos.len(),
        artist_stats.len(),
        asset_gap.total_wealth_gap
    );

    Report {
        as_of,
        assumptions: *assumptions,
        source: working.source,
        artist_options: prepared.artist_options.clone(),
        videos,
        artist_stats,
        asset_gap,
        lottery,
        ghost_income,
        weekly_pulse,
        velocity,
        timing,
    }
}
