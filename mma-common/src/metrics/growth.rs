//! Growth metrics from the history log
//!
//! Both views need at least two distinct capture dates. The weekly pulse
//! compares the two most recent captures video by video; velocity follows each
//! artist's summed views across every consecutive pair of captures.

use crate::assumptions::Assumptions;
use crate::metrics::split::{split_revenue, RevenueSplit};
use crate::metrics::view_delta;
use crate::models::{HistoryTable, Snapshot};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Number of videos listed as top performers
pub const TOP_VIDEOS: usize = 10;

/// Weeks per month used for the monthly projection
pub const WEEKS_PER_MONTH: f64 = 4.0;

/// Change for one video between the two latest captures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoGrowth {
    /// Video id when the log has one, otherwise the title
    pub key: String,
    pub title: Option<String>,
    pub artist: String,
    pub views_now: u64,
    pub views_prev: Option<u64>,
    /// `None` when the video was not captured the previous time
    pub views_gained: Option<i64>,
    pub week_revenue: Option<f64>,
}

/// Weekly pitch summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyPulse {
    pub previous: NaiveDateTime,
    pub latest: NaiveDateTime,
    pub views_gained: i64,
    pub weekly_revenue: f64,
    pub projected_monthly: f64,
    /// Proposed split of the weekly revenue
    pub split: RevenueSplit,
    /// Best videos by views gained
    pub top_videos: Vec<VideoGrowth>,
    pub videos: Vec<VideoGrowth>,
}

fn growth_key(snapshot: &Snapshot, by_id: bool) -> Option<&str> {
    if by_id {
        snapshot.video.video_id.as_deref()
    } else {
        snapshot.video.title.as_deref()
    }
}

/// First row per key at `date`, in log order
fn snapshot_at(history: &HistoryTable, date: NaiveDateTime) -> Vec<(&str, &Snapshot)> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for s in history.rows.iter().filter(|s| s.captured_at == date) {
        if let Some(key) = growth_key(s, history.has_video_id) {
            if seen.insert(key) {
                out.push((key, s));
            }
        }
    }
    out
}

/// Compare the two most recent captures
///
/// Videos are matched by `Video_ID` when the log has that column, by title
/// otherwise. Videos new in the latest capture have no gain and do not count
/// toward the totals.
pub fn weekly_pulse(history: &HistoryTable, assumptions: &Assumptions) -> Option<WeeklyPulse> {
    let dates = history.capture_dates();
    if dates.len() < 2 {
        return None;
    }
    let latest = dates[dates.len() - 1];
    let previous = dates[dates.len() - 2];

    let prev: HashMap<&str, u64> = snapshot_at(history, previous)
        .into_iter()
        .map(|(k, s)| (k, s.video.views))
        .collect();

    let videos: Vec<VideoGrowth> = snapshot_at(history, latest)
        .into_iter()
        .map(|(key, s)| {
            let views_prev = prev.get(key).copied();
            let views_gained = views_prev.map(|p| view_delta(s.video.views, p));
            VideoGrowth {
                key: key.to_string(),
                title: s.video.title.clone(),
                artist: s.video.artist.clone(),
                views_now: s.video.views,
                views_prev,
                views_gained,
                week_revenue: views_gained.map(|g| assumptions.revenue_for_views(g as f64)),
            }
        })
        .collect();

    let views_gained = videos
        .iter()
        .filter_map(|v| v.views_gained)
        .fold(0i64, i64::saturating_add);
    let weekly_revenue = assumptions.revenue_for_views(views_gained as f64);

    let mut top_videos = videos.clone();
    // Unknown gains sort last
    top_videos.sort_by(|a, b| match (a.views_gained, b.views_gained) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    top_videos.truncate(TOP_VIDEOS);

    Some(WeeklyPulse {
        previous,
        latest,
        views_gained,
        weekly_revenue,
        projected_monthly: weekly_revenue * WEEKS_PER_MONTH,
        split: split_revenue(weekly_revenue, assumptions),
        top_videos,
        videos,
    })
}

/// Summed views of one artist at one capture, with the change since the
/// artist's previous capture
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VelocityPoint {
    pub captured_at: NaiveDateTime,
    pub artist: String,
    pub views: u64,
    pub previous_views: Option<u64>,
    /// Undefined for an artist's first capture
    pub new_views: Option<i64>,
}

/// Per-artist period-over-period view deltas, ordered by capture then artist
pub fn velocity(history: &HistoryTable) -> Option<Vec<VelocityPoint>> {
    if history.capture_dates().len() < 2 {
        return None;
    }

    let mut totals: BTreeMap<(NaiveDateTime, &str), u64> = BTreeMap::new();
    for s in &history.rows {
        let total = totals
            .entry((s.captured_at, s.video.artist.as_str()))
            .or_default();
        *total = total.saturating_add(s.video.views);
    }

    let mut last_seen: HashMap<&str, u64> = HashMap::new();
    let points = totals
        .into_iter()
        .map(|((captured_at, artist), views)| {
            let previous_views = last_seen.insert(artist, views);
            VelocityPoint {
                captured_at,
                artist: artist.to_string(),
                views,
                previous_views,
                new_views: previous_views.map(|p| view_delta(views, p)),
            }
        })
        .collect();

    Some(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VideoRecord;
    use crate::time::parse_timestamp;

    fn snap(date: &str, title: &str, id: Option<&str>, artist: &str, views: u64) -> Snapshot {
        Snapshot {
            captured_at: parse_timestamp(date).unwrap(),
            video: VideoRecord {
                title: Some(title.to_string()),
                channel: Some("Chan".to_string()),
                views,
                video_id: id.map(str::to_string),
                release_date: None,
                avg_daily_views: None,
                artist: artist.to_string(),
                identified: true,
            },
        }
    }

    fn history(rows: Vec<Snapshot>, has_video_id: bool) -> HistoryTable {
        HistoryTable {
            rows,
            has_video_id,
            ..Default::default()
        }
    }

    #[test]
    fn test_velocity_example() {
        let h = history(
            vec![
                snap("2024-01-01", "S", None, "A", 100),
                snap("2024-01-08", "S", None, "A", 150),
                snap("2024-01-15", "S", None, "A", 225),
            ],
            false,
        );
        let points = velocity(&h).unwrap();
        let deltas: Vec<_> = points.iter().map(|p| p.new_views).collect();
        assert_eq!(deltas, vec![None, Some(50), Some(75)]);
    }

    #[test]
    fn test_extreme_view_counts_saturate() {
        let h = history(
            vec![
                snap("2024-01-01", "S1", None, "A", 0),
                snap("2024-01-01", "S2", None, "A", 0),
                snap("2024-01-08", "S1", None, "A", u64::MAX),
                snap("2024-01-08", "S2", None, "A", u64::MAX),
            ],
            false,
        );
        let points = velocity(&h).unwrap();
        assert_eq!(points[1].views, u64::MAX);
        assert_eq!(points[1].new_views, Some(i64::MAX));

        let pulse = weekly_pulse(&h, &Assumptions::default()).unwrap();
        assert_eq!(pulse.views_gained, i64::MAX);
        assert_eq!(pulse.videos[0].views_gained, Some(i64::MAX));
    }

    #[test]
    fn test_velocity_sums_per_artist_and_orders() {
        let h = history(
            vec![
                snap("2024-01-08", "S1", None, "B", 10),
                snap("2024-01-01", "S1", None, "B", 5),
                snap("2024-01-01", "S2", None, "A", 1),
                snap("2024-01-01", "S3", None, "A", 2),
                snap("2024-01-08", "S2", None, "A", 4),
                snap("2024-01-08", "S3", None, "A", 6),
            ],
            false,
        );
        let points = velocity(&h).unwrap();
        let got: Vec<_> = points
            .iter()
            .map(|p| (p.artist.as_str(), p.views, p.new_views))
            .collect();
        assert_eq!(
            got,
            vec![("A", 3, None), ("B", 5, None), ("A", 10, Some(7)), ("B", 10, Some(5))]
        );
    }

    #[test]
    fn test_growth_needs_two_dates() {
        let h = history(vec![snap("2024-01-01", "S", None, "A", 100)], false);
        assert!(velocity(&h).is_none());
        assert!(weekly_pulse(&h, &Assumptions::default()).is_none());
    }

    #[test]
    fn test_weekly_pulse_by_title() {
        let h = history(
            vec![
                snap("2024-01-01", "Old", None, "A", 999),
                snap("2024-01-08", "S1", None, "A", 1_000),
                snap("2024-01-08", "S2", None, "B", 500),
                snap("2024-01-15", "S1", None, "A", 3_500),
                snap("2024-01-15", "S1", None, "A", 9_999),
                snap("2024-01-15", "S2", None, "B", 1_000),
                snap("2024-01-15", "New", None, "C", 50_000),
            ],
            false,
        );
        let pulse = weekly_pulse(&h, &Assumptions::default()).unwrap();
        assert_eq!(pulse.latest, parse_timestamp("2024-01-15").unwrap());
        assert_eq!(pulse.previous, parse_timestamp("2024-01-08").unwrap());

        // duplicate S1 row ignored; New has no previous capture
        assert_eq!(pulse.videos.len(), 3);
        assert_eq!(pulse.views_gained, 3_000);
        assert_eq!(pulse.weekly_revenue, 12.0);
        assert_eq!(pulse.projected_monthly, 48.0);
        assert_eq!(pulse.split.gross, 1200);

        let top: Vec<_> = pulse.top_videos.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(top, vec!["S1", "S2", "New"]);
        assert_eq!(pulse.top_videos[0].week_revenue, Some(10.0));
        assert_eq!(pulse.top_videos[2].views_gained, None);
    }

    #[test]
    fn test_weekly_pulse_prefers_video_id() {
        let h = history(
            vec![
                snap("2024-01-01", "Title v1", Some("id1"), "A", 100),
                snap("2024-01-08", "Title v2", Some("id1"), "A", 400),
            ],
            true,
        );
        let pulse = weekly_pulse(&h, &Assumptions::default()).unwrap();
        assert_eq!(pulse.videos[0].key, "id1");
        assert_eq!(pulse.views_gained, 300);
    }
}
