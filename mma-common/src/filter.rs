//! Content and artist filters
//!
//! Both filters only remove rows. Retained rows keep their order and are never
//! modified, so applying a filter twice gives the same result as applying it
//! once.

use crate::models::{HistoryTable, VideoRecord};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Default keyword block-list (matched case-insensitively inside titles)
pub const DEFAULT_EXCLUDED_KEYWORDS: &[&str] = &[
    "ethiopian",
    "ethiopia",
    "amharic",
    "oromo",
    "tigray",
    "wolayta",
    "hope music",
];

/// Default channel block-list (matched exactly)
pub const DEFAULT_DROP_CHANNELS: &[&str] = &[
    "Liham Melody",
    "Hope Music Ethiopia",
    "Minew Shewa Tube",
    "Fana Television",
    "EBS TV",
    "Propictures",
    "Merih Media",
    "Cinemax Entertainment",
    "Habesha Music",
    "ADMAS MUSIC",
];

/// Block-lists applied to the history log
///
/// A list missing from the config file keeps its built-in default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentFilter {
    pub drop_channels: Vec<String>,
    pub excluded_keywords: Vec<String>,
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self {
            drop_channels: DEFAULT_DROP_CHANNELS.iter().map(|s| s.to_string()).collect(),
            excluded_keywords: DEFAULT_EXCLUDED_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ContentFilter {
    /// Keep rows whose channel is not blocked and whose title is clean
    pub fn keeps(&self, video: &VideoRecord) -> bool {
        self.channel_allowed(video.channel.as_deref()) && self.title_is_clean(video.title.as_deref())
    }

    fn channel_allowed(&self, channel: Option<&str>) -> bool {
        match channel {
            Some(c) => !self.drop_channels.iter().any(|d| d == c),
            None => true,
        }
    }

    /// A missing title never matches a keyword
    fn title_is_clean(&self, title: Option<&str>) -> bool {
        let Some(title) = title else {
            return true;
        };
        let lower = title.to_lowercase();
        !self
            .excluded_keywords
            .iter()
            .any(|k| lower.contains(&k.to_lowercase()))
    }

    /// Filter a history log
    pub fn apply(&self, mut history: HistoryTable) -> HistoryTable {
        let before = history.len();
        history.rows.retain(|s| self.keeps(&s.video));
        let removed = before - history.len();
        if removed > 0 {
            info!("Content filter removed {} of {} history rows", removed, before);
        }
        history
    }
}

/// Artist include/exclude selection and the hide-unidentified toggle
///
/// The include and exclude lists narrow both the working table and the
/// history log. Hide-unidentified only narrows the history log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// When non-empty, only these artists are kept
    #[serde(default)]
    pub include_artists: Vec<String>,
    /// Consulted only when `include_artists` is empty
    #[serde(default)]
    pub exclude_artists: Vec<String>,
    /// Drop history rows whose artist was not mapped from the detail export
    #[serde(default)]
    pub hide_unidentified: bool,
}

impl Selection {
    /// Include/exclude decision for one artist
    pub fn keeps_artist(&self, artist: &str) -> bool {
        if !self.include_artists.is_empty() {
            return self.include_artists.iter().any(|a| a == artist);
        }
        !self.exclude_artists.iter().any(|a| a == artist)
    }

    /// Decide whether a history row survives the selection
    pub fn keeps(&self, video: &VideoRecord) -> bool {
        if self.hide_unidentified && !video.identified {
            return false;
        }
        self.keeps_artist(&video.artist)
    }

    /// True when the selection cannot remove anything
    pub fn is_noop(&self) -> bool {
        !self.hide_unidentified && self.include_artists.is_empty() && self.exclude_artists.is_empty()
    }

    /// Apply the artist lists to working-table rows
    pub fn apply_videos(&self, rows: Vec<VideoRecord>) -> Vec<VideoRecord> {
        rows.into_iter().filter(|v| self.keeps_artist(&v.artist)).collect()
    }

    /// Apply to a history log
    pub fn apply_history(&self, mut history: HistoryTable) -> HistoryTable {
        history.rows.retain(|s| self.keeps(&s.video));
        history
    }
}
