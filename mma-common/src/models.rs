//! Typed records built from raw tables
//!
//! Conversion happens once per upload. Rows whose mandatory cells cannot be
//! read (view count, and capture date for the history log) are dropped and
//! counted; optional cells simply become `None`.

use crate::schema::{self, columns};
use crate::table::{RawTable, RowRef};
use crate::time::parse_timestamp;
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{info, warn};

/// Fallback artist label when neither artist nor channel is known
pub const UNKNOWN_ARTIST: &str = "Unknown";

/// One video row of a working table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoRecord {
    pub title: Option<String>,
    pub channel: Option<String>,
    pub views: u64,
    pub video_id: Option<String>,
    pub release_date: Option<NaiveDateTime>,
    pub avg_daily_views: Option<f64>,
    /// Resolved artist name, never empty
    pub artist: String,
    /// True when the artist came from an explicit title → artist mapping
    pub identified: bool,
}

impl VideoRecord {
    /// Artist label derived from the channel, used whenever no mapping applies
    pub fn channel_fallback(channel: Option<&str>) -> String {
        channel
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(UNKNOWN_ARTIST)
            .to_string()
    }

    /// Build a record from a raw row; `None` when the view count is unreadable
    fn from_row(row: &RowRef<'_>, release_column: Option<&str>) -> Option<Self> {
        let views = parse_views(row.get(columns::VIEW_COUNT)?)?;
        let channel = row.get(columns::CHANNEL_NAME).map(str::to_string);
        let own_artist = row.get(columns::CLEAN_ARTIST_NAME);

        Some(Self {
            title: row.get(columns::VIDEO_TITLE).map(str::to_string),
            artist: own_artist
                .map(str::to_string)
                .unwrap_or_else(|| Self::channel_fallback(channel.as_deref())),
            identified: own_artist.is_some(),
            channel,
            views,
            video_id: row.get(columns::VIDEO_ID).map(str::to_string),
            release_date: release_column
                .and_then(|c| row.get(c))
                .and_then(parse_timestamp),
            avg_daily_views: row.get(columns::AVG_DAILY_VIEWS).and_then(parse_number),
        })
    }
}

/// A video record tagged with its capture date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub captured_at: NaiveDateTime,
    pub video: VideoRecord,
}

/// Weekly history log: one row per (video, capture date)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryTable {
    pub rows: Vec<Snapshot>,
    /// `Video_ID` column present (preferred growth key)
    pub has_video_id: bool,
    /// The log carries its own `Clean_Artist_Name` column
    pub has_artist_column: bool,
    pub release_date_column: Option<&'static str>,
    pub has_avg_daily_views: bool,
}

impl HistoryTable {
    /// Convert a classified history table
    ///
    /// Aliased headers are canonicalized first. Rows with an unparsable
    /// capture date or view count are dropped.
    pub fn from_raw(mut raw: RawTable) -> Self {
        schema::canonicalize_history(&mut raw);
        let release_date_column = schema::release_date_column(&raw);

        let mut rows = Vec::with_capacity(raw.len());
        let mut bad_dates = 0usize;
        let mut bad_views = 0usize;

        for row in raw.iter() {
            let Some(captured_at) = row.get(columns::DATE_SCRAPED).and_then(parse_timestamp)
            else {
                bad_dates += 1;
                continue;
            };
            match VideoRecord::from_row(&row, release_date_column) {
                // A log-supplied artist is not confirmed until the resolver maps it
                Some(video) => rows.push(Snapshot {
                    captured_at,
                    video: VideoRecord {
                        identified: false,
                        ..video
                    },
                }),
                None => bad_views += 1,
            }
        }

        if bad_dates > 0 {
            warn!("{}: dropped {} rows without a valid capture date", raw.name, bad_dates);
        }
        if bad_views > 0 {
            warn!("{}: dropped {} rows without a valid view count", raw.name, bad_views);
        }

        Self {
            rows,
            has_video_id: raw.has_column(columns::VIDEO_ID),
            has_artist_column: raw.has_column(columns::CLEAN_ARTIST_NAME),
            release_date_column,
            has_avg_daily_views: raw.has_column(columns::AVG_DAILY_VIEWS),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Distinct capture dates, ascending
    pub fn capture_dates(&self) -> Vec<NaiveDateTime> {
        let mut dates: Vec<_> = self.rows.iter().map(|r| r.captured_at).collect();
        dates.sort();
        dates.dedup();
        dates
    }

    /// Most recent capture date
    pub fn latest_capture(&self) -> Option<NaiveDateTime> {
        self.rows.iter().map(|r| r.captured_at).max()
    }
}

/// Detailed analytics export: one authoritative row per video
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailTable {
    pub rows: Vec<VideoRecord>,
    /// `(title, artist)` of every row naming both, in file order
    ///
    /// Collected before the view-count check, so rows dropped from `rows`
    /// still attribute history titles.
    pub artist_titles: Vec<(String, String)>,
    pub release_date_column: Option<&'static str>,
    pub has_avg_daily_views: bool,
}

impl DetailTable {
    /// Convert a classified detail table
    ///
    /// Rows with an artist cell are marked identified; rows lacking one fall
    /// back to the channel name and stay unidentified.
    pub fn from_raw(raw: RawTable) -> Self {
        let release_date_column = schema::release_date_column(&raw);
        let mut bad_views = 0usize;

        let artist_titles: Vec<_> = raw
            .iter()
            .filter_map(|row| {
                let title = row.get(columns::VIDEO_TITLE)?;
                let artist = row.get(columns::CLEAN_ARTIST_NAME)?;
                Some((title.to_string(), artist.to_string()))
            })
            .collect();

        let rows: Vec<_> = raw
            .iter()
            .filter_map(|row| {
                let record = VideoRecord::from_row(&row, release_date_column);
                if record.is_none() {
                    bad_views += 1;
                }
                record
            })
            .collect();

        if bad_views > 0 {
            warn!("{}: dropped {} rows without a valid view count", raw.name, bad_views);
        }
        info!("{}: {} detail rows", raw.name, rows.len());

        Self {
            rows,
            artist_titles,
            release_date_column,
            has_avg_daily_views: raw.has_column(columns::AVG_DAILY_VIEWS),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Parse a numeric cell, tolerating thousands separators
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a view count (`1234`, `1234.0`, `1,234`)
pub fn parse_views(raw: &str) -> Option<u64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();
    if let Ok(v) = cleaned.parse::<u64>() {
        return Some(v);
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u64)
}
