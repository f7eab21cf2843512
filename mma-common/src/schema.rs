//! Schema classification
//!
//! Uploads carry no explicit type. A table is recognized by a single marker
//! column: `Date_Scraped` for the weekly history log, `Clean_Artist_Name` for
//! the detailed analytics export. Anything else is ignored so that unrelated
//! files in a multi-file upload do not abort the run.

use crate::table::RawTable;
use serde::Serialize;
use tracing::debug;

/// Canonical column names shared by both exports
pub mod columns {
    pub const DATE_SCRAPED: &str = "Date_Scraped";
    pub const CLEAN_ARTIST_NAME: &str = "Clean_Artist_Name";
    pub const VIDEO_TITLE: &str = "Video Title";
    pub const VIEW_COUNT: &str = "View Count";
    pub const CHANNEL_NAME: &str = "Channel Name";
    pub const VIDEO_ID: &str = "Video_ID";
    pub const AVG_DAILY_VIEWS: &str = "Avg_Daily_Views";
}

/// History-log aliases renamed to their canonical names on load
pub const HISTORY_ALIASES: &[(&str, &str)] = &[
    ("Video_Title", columns::VIDEO_TITLE),
    ("View_Count", columns::VIEW_COUNT),
    ("Channel_Name", columns::CHANNEL_NAME),
];

/// Release-date column candidates, most preferred first
pub const RELEASE_DATE_CANDIDATES: &[&str] =
    &["Published At", "publishedAt", "Release Date", "release_date"];

/// Kind of an uploaded table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TableKind {
    /// Repeated time-stamped snapshots, one row per (video, capture date)
    History,
    /// One authoritative row per video with a canonical artist label
    Detail,
    /// Unrelated file, skipped
    Ignored,
}

/// Classify a table by its column set
///
/// The capture-date marker is checked first, so a table carrying both markers
/// is treated as history.
pub fn classify(table: &RawTable) -> TableKind {
    let kind = if table.has_column(columns::DATE_SCRAPED) {
        TableKind::History
    } else if table.has_column(columns::CLEAN_ARTIST_NAME) {
        TableKind::Detail
    } else {
        TableKind::Ignored
    };
    debug!("{}: classified as {:?}", table.name, kind);
    kind
}

/// Rename history-log aliases (`Video_Title`, ...) to canonical names
pub fn canonicalize_history(table: &mut RawTable) {
    for (alias, canonical) in HISTORY_ALIASES {
        table.rename_column(alias, canonical);
    }
}

/// First release-date candidate present in `table`
pub fn release_date_column(table: &RawTable) -> Option<&'static str> {
    RELEASE_DATE_CANDIDATES
        .iter()
        .copied()
        .find(|c| table.has_column(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str]) -> RawTable {
        RawTable::new("t.csv", headers.iter().map(|h| h.to_string()).collect(), vec![])
    }

    #[test]
    fn test_classify_history() {
        let t = table(&["Date_Scraped", "Video_Title", "View_Count"]);
        assert_eq!(classify(&t), TableKind::History);
    }

    #[test]
    fn test_classify_detail() {
        let t = table(&["Video Title", "Clean_Artist_Name", "View Count"]);
        assert_eq!(classify(&t), TableKind::Detail);
    }

    #[test]
    fn test_classify_both_markers_prefers_history() {
        let t = table(&["Clean_Artist_Name", "Date_Scraped"]);
        assert_eq!(classify(&t), TableKind::History);
    }

    #[test]
    fn test_classify_unrelated_is_ignored() {
        let t = table(&["foo", "bar"]);
        assert_eq!(classify(&t), TableKind::Ignored);
    }

    #[test]
    fn test_canonicalize_history_aliases() {
        let mut t = table(&["Date_Scraped", "Video_Title", "View_Count", "Channel_Name"]);
        canonicalize_history(&mut t);
        assert_eq!(
            t.headers,
            vec!["Date_Scraped", "Video Title", "View Count", "Channel Name"]
        );
    }

    #[test]
    fn test_release_date_preference_order() {
        let t = table(&["release_date", "Release Date"]);
        assert_eq!(release_date_column(&t), Some("Release Date"));

        let t = table(&["publishedAt", "Published At"]);
        assert_eq!(release_date_column(&t), Some("Published At"));

        let t = table(&["Video Title"]);
        assert_eq!(release_date_column(&t), None);
    }
}
