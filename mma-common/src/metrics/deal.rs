//! Deal simulator
//!
//! Compares a lump-sum offer against what the artist could expect from
//! releasing independently, using the median performance of the videos the
//! user picked as a stand-in for the next release.

use crate::assumptions::Assumptions;
use crate::merger::WorkingTable;
use crate::metrics::median;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Dollar band around zero within which the verdict is a toss-up
pub const DEAL_DEADBAND: f64 = 1000.0;

/// Terms of the proposed buyout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DealTerms {
    /// Lump sum offered for the rights ($)
    pub offer: f64,
    /// Cost of producing the video independently ($)
    pub cost: f64,
}

impl Default for DealTerms {
    fn default() -> Self {
        Self {
            offer: 5000.0,
            cost: 2500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DealVerdict {
    /// Independent release beats the offer by more than the deadband
    Reject,
    /// Offer beats independent release by more than the deadband
    Accept,
    Tossup,
}

impl DealVerdict {
    fn from_difference(difference: f64) -> Self {
        if difference > DEAL_DEADBAND {
            DealVerdict::Reject
        } else if difference < -DEAL_DEADBAND {
            DealVerdict::Accept
        } else {
            DealVerdict::Tossup
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DealVerdict::Reject => "REJECT",
            DealVerdict::Accept => "ACCEPT",
            DealVerdict::Tossup => "TOSS-UP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealOutcome {
    pub artist: String,
    pub videos_considered: usize,
    pub median_views: f64,
    pub projected_revenue: f64,
    pub independent_profit: f64,
    pub offer: f64,
    /// Independent profit minus the offer
    pub difference: f64,
    pub verdict: DealVerdict,
}

/// Run the simulator for one artist
///
/// `titles` narrows the artist's videos to the ones picked by the user; `None`
/// uses every video. An empty pick (or an artist with no videos) is an
/// `EmptySelection` error.
pub fn simulate_deal(
    table: &WorkingTable,
    artist: &str,
    titles: Option<&[String]>,
    terms: &DealTerms,
    assumptions: &Assumptions,
) -> Result<DealOutcome> {
    let views: Vec<u64> = table
        .rows
        .iter()
        .filter(|v| v.artist == artist)
        .filter(|v| match titles {
            Some(picked) => v
                .title
                .as_ref()
                .is_some_and(|t| picked.iter().any(|p| p == t)),
            None => true,
        })
        .map(|v| v.views)
        .collect();

    let median_views = median(&views).ok_or_else(|| {
        Error::EmptySelection(format!("no videos selected for artist '{}'", artist))
    })?;

    let projected_revenue = assumptions.revenue_for_views(median_views);
    let independent_profit = projected_revenue - terms.cost;
    let difference = independent_profit - terms.offer;

    Ok(DealOutcome {
        artist: artist.to_string(),
        videos_considered: views.len(),
        median_views,
        projected_revenue,
        independent_profit,
        offer: terms.offer,
        difference,
        verdict: DealVerdict::from_difference(difference),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merger::WorkingSource;
    use crate::models::VideoRecord;

    fn video(title: &str, artist: &str, views: u64) -> VideoRecord {
        VideoRecord {
            title: Some(title.to_string()),
            channel: None,
            views,
            video_id: None,
            release_date: None,
            avg_daily_views: None,
            artist: artist.to_string(),
            identified: true,
        }
    }

    fn table() -> WorkingTable {
        WorkingTable {
            source: WorkingSource::Detail,
            rows: vec![
                video("a", "Star", 1_000_000),
                video("b", "Star", 3_000_000),
                video("c", "Star", 2_000_000),
                video("d", "Other", 9_000_000),
            ],
            release_date_column: None,
            has_avg_daily_views: false,
        }
    }

    #[test]
    fn test_reject_example() {
        // median 2M -> 8,000 revenue - 2,500 cost = 5,500; 5,500 - 3,000 = 2,500
        let terms = DealTerms {
            offer: 3000.0,
            cost: 2500.0,
        };
        let out = simulate_deal(&table(), "Star", None, &terms, &Assumptions::default()).unwrap();
        assert_eq!(out.videos_considered, 3);
        assert_eq!(out.median_views, 2_000_000.0);
        assert_eq!(out.projected_revenue, 8000.0);
        assert_eq!(out.independent_profit, 5500.0);
        assert_eq!(out.difference, 2500.0);
        assert_eq!(out.verdict, DealVerdict::Reject);
    }

    #[test]
    fn test_selected_titles_and_verdict_bands() {
        let a = Assumptions::default();
        let picked = vec!["a".to_string()];
        // 1M -> 4,000 - 2,500 = 1,500 profit
        let accept = DealTerms {
            offer: 2600.0,
            cost: 2500.0,
        };
        let out = simulate_deal(&table(), "Star", Some(picked.as_slice()), &accept, &a).unwrap();
        assert_eq!(out.videos_considered, 1);
        assert_eq!(out.difference, -1100.0);
        assert_eq!(out.verdict, DealVerdict::Accept);

        let even = DealTerms {
            offer: 500.0,
            cost: 2500.0,
        };
        let out = simulate_deal(&table(), "Star", Some(picked.as_slice()), &even, &a).unwrap();
        assert_eq!(out.difference, 1000.0);
        assert_eq!(out.verdict, DealVerdict::Tossup);
    }

    #[test]
    fn test_empty_selection_is_error() {
        let a = Assumptions::default();
        let terms = DealTerms::default();
        assert!(matches!(
            simulate_deal(&table(), "Star", Some(&[][..]), &terms, &a),
            Err(Error::EmptySelection(_))
        ));
        assert!(matches!(
            simulate_deal(&table(), "Nobody", None, &terms, &a),
            Err(Error::EmptySelection(_))
        ));
    }
}
