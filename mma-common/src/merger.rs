//! Working-table selection
//!
//! | detail non-empty | history non-empty | working table            |
//! |------------------|-------------------|--------------------------|
//! | yes              | any               | detail rows              |
//! | no               | yes               | latest history snapshot  |
//! | no               | no                | `DataUnavailable`        |
//!
//! History-only fields (the time series) are not carried into the working
//! table; growth metrics read the history log directly.

use crate::models::{DetailTable, HistoryTable, VideoRecord};
use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::info;

/// Which upload became the working table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkingSource {
    Detail,
    /// Point-in-time subset of the history log at this capture date
    LatestSnapshot(NaiveDateTime),
}

/// Canonical per-video table the metrics engine runs on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkingTable {
    pub source: WorkingSource,
    pub rows: Vec<VideoRecord>,
    /// Original name of the column canonicalized to the release date
    pub release_date_column: Option<&'static str>,
    pub has_avg_daily_views: bool,
}

impl WorkingTable {
    /// Release-date dependent scenarios run only when this is true
    pub fn has_release_dates(&self) -> bool {
        self.release_date_column.is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted unique artist names
    pub fn artists(&self) -> Vec<String> {
        let mut names: Vec<_> = self.rows.iter().map(|r| r.artist.clone()).collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Decide the working-table source without touching any rows
pub fn choose_source(
    detail: Option<&DetailTable>,
    history: Option<&HistoryTable>,
) -> Option<WorkingSource> {
    let detail_rows = detail.map_or(0, DetailTable::len);
    let latest = history.and_then(HistoryTable::latest_capture);

    match (detail_rows > 0, latest) {
        (true, _) => Some(WorkingSource::Detail),
        (false, Some(date)) => Some(WorkingSource::LatestSnapshot(date)),
        (false, None) => None,
    }
}

/// Build the working table
///
/// Every row leaves with a non-empty artist: an empty label is replaced by
/// the channel name or `"Unknown"`.
pub fn merge(detail: Option<&DetailTable>, history: Option<&HistoryTable>) -> Result<WorkingTable> {
    let source = choose_source(detail, history).ok_or_else(|| {
        Error::DataUnavailable("no history log or detail table with usable rows".to_string())
    })?;

    let (rows, release_date_column, has_avg_daily_views) = match (source, detail, history) {
        (WorkingSource::Detail, Some(d), _) => {
            (d.rows.clone(), d.release_date_column, d.has_avg_daily_views)
        }
        (WorkingSource::LatestSnapshot(date), _, Some(h)) => {
            let rows: Vec<_> = h
                .rows
                .iter()
                .filter(|s| s.captured_at == date)
                .map(|s| s.video.clone())
                .collect();
            (rows, h.release_date_column, h.has_avg_daily_views)
        }
        _ => {
            return Err(Error::DataUnavailable(
                "working-table source vanished during merge".to_string(),
            ))
        }
    };

    let rows: Vec<_> = rows
        .into_iter()
        .map(|mut r| {
            if r.artist.trim().is_empty() {
                r.artist = VideoRecord::channel_fallback(r.channel.as_deref());
                r.identified = false;
            }
            r
        })
        .collect();

    info!(
        "Working table: {} rows from {:?} (release date column: {})",
        rows.len(),
        source,
        release_date_column.unwrap_or("none")
    );

    Ok(WorkingTable {
        source,
        rows,
        release_date_column,
        has_avg_daily_views,
    })
}
