//! Artist resolution
//!
//! The detail export is the only source that names the real artist behind a
//! video. Its title → artist lookup is used to back-fill the history log,
//! whose rows otherwise only know the uploading channel.
//!
//! Titles are the join key. Two different artists sharing a title collapse to
//! whichever detail row came first.

use crate::models::{DetailTable, HistoryTable, VideoRecord};
use std::collections::HashMap;
use tracing::info;

/// How a history row obtained its artist label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribution {
    /// Title found in the detail lookup
    Mapped,
    /// Lookup exists but does not know the title
    ChannelFallback,
    /// No lookup; the log's own artist column is kept
    OwnColumn,
    /// No lookup and no artist column
    ChannelOnly,
}

/// Title → canonical artist lookup built from the detail table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtistMap {
    by_title: HashMap<String, String>,
}

impl ArtistMap {
    /// Build the lookup; the first row with a given title wins
    ///
    /// Every detail row naming a title and an artist takes part, including
    /// rows whose view count could not be read.
    pub fn from_detail(detail: Option<&DetailTable>) -> Self {
        let mut by_title = HashMap::new();
        for (title, artist) in detail.into_iter().flat_map(|d| d.artist_titles.iter()) {
            by_title
                .entry(title.clone())
                .or_insert_with(|| artist.clone());
        }
        Self { by_title }
    }

    pub fn is_empty(&self) -> bool {
        self.by_title.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_title.len()
    }

    /// Look up the artist for a title
    pub fn get(&self, title: &str) -> Option<&str> {
        self.by_title.get(title).map(String::as_str)
    }

    /// Decide which fallback applies to a row
    pub fn attribution(&self, video: &VideoRecord, log_has_artist: bool) -> Attribution {
        match (self.is_empty(), log_has_artist) {
            (false, _) => {
                if video.title.as_deref().and_then(|t| self.get(t)).is_some() {
                    Attribution::Mapped
                } else {
                    Attribution::ChannelFallback
                }
            }
            (true, true) => Attribution::OwnColumn,
            (true, false) => Attribution::ChannelOnly,
        }
    }

    /// Resolve artist and identification flag for one row
    pub fn resolve(&self, video: VideoRecord, log_has_artist: bool) -> VideoRecord {
        match self.attribution(&video, log_has_artist) {
            Attribution::Mapped => {
                let artist = video
                    .title
                    .as_deref()
                    .and_then(|t| self.get(t))
                    .map(str::to_string)
                    .unwrap_or_else(|| video.artist.clone());
                VideoRecord {
                    artist,
                    identified: true,
                    ..video
                }
            }
            Attribution::ChannelFallback | Attribution::ChannelOnly => VideoRecord {
                artist: VideoRecord::channel_fallback(video.channel.as_deref()),
                identified: false,
                ..video
            },
            Attribution::OwnColumn => VideoRecord {
                identified: false,
                ..video
            },
        }
    }
}

/// Back-fill artist attribution on every history row
pub fn resolve_history(history: HistoryTable, map: &ArtistMap) -> HistoryTable {
    let log_has_artist = history.has_artist_column;
    let rows: Vec<_> = history
        .rows
        .into_iter()
        .map(|mut snapshot| {
            snapshot.video = map.resolve(snapshot.video, log_has_artist);
            snapshot
        })
        .collect();

    let identified = rows.iter().filter(|s| s.video.identified).count();
    info!(
        "Artist resolver: {} of {} history rows identified ({} titles mapped)",
        identified,
        rows.len(),
        map.len()
    );

    HistoryTable { rows, ..history }
}
