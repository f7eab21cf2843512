//! End-to-end pipeline over CSV files on disk

use chrono::NaiveDate;
use mma_common::filter::{ContentFilter, Selection};
use mma_common::merger::WorkingSource;
use mma_common::metrics::{simulate_deal, DealTerms, DealVerdict, GapVerdict};
use mma_common::pipeline::{compute, ingest, load_files, prepare};
use mma_common::{Assumptions, Error};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const HISTORY_CSV: &str = "\
Date_Scraped,Video_ID,Video_Title,View_Count,Channel_Name,Published At
2024-01-01,v1,Hit Song,1000000,Label One,2020-03-02
2024-01-01,v2,Quiet Song,5000,Label One,2023-11-05
2024-01-01,v3,Ethiopian Mix,900000,Label Two,2021-01-01
2024-01-01,v4,Blocked,800000,EBS TV,2021-01-01
2024-01-08,v1,Hit Song,1200000,Label One,2020-03-02
2024-01-08,v2,Quiet Song,6000,Label One,2023-11-05
2024-01-08,v5,Unmapped,20000,Label Two,2022-06-15
2024-01-08,v6,No Channel,15000,,2022-06-15
";

const DETAIL_CSV: &str = "\
Clean_Artist_Name,Video Title,View Count,Channel Name,Published At,Avg_Daily_Views
Star,Hit Song,1200000,Label One,2020-03-02,900
Star,Quiet Song,6000,Label One,2023-11-05,50
Newcomer,Fresh Track,40000,Label Two,2023-12-01,400
";

const UNRELATED_CSV: &str = "notes\nsomething unrelated\n";

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_history_only_upload() {
    let dir = TempDir::new().unwrap();
    let history = write(&dir, "history.csv", HISTORY_CSV);

    let tables = load_files(&[history]).unwrap();
    let dataset = ingest(tables, &ContentFilter::default());

    // keyword and channel block-lists applied
    let h = dataset.history.as_ref().unwrap();
    assert_eq!(h.len(), 6);
    assert!(h.rows.iter().all(|s| !s.video.identified));

    let prepared = prepare(dataset, &Selection::default()).unwrap();
    let latest = NaiveDate::from_ymd_opt(2024, 1, 8)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(prepared.working.source, WorkingSource::LatestSnapshot(latest));
    assert_eq!(prepared.working.len(), 4);

    let report = compute(&prepared, &Assumptions::default(), as_of());
    let artists: Vec<_> = report.artist_stats.iter().map(|s| s.artist.as_str()).collect();
    assert_eq!(artists, vec!["Label One", "Label Two", "Unknown"]);
    assert!(report.ghost_income.is_none());
    assert!(report.lottery.is_some());

    let pulse = report.weekly_pulse.unwrap();
    // v1 +200,000 and v2 +1,000; v5 and v6 are new
    assert_eq!(pulse.views_gained, 201_000);
    assert_eq!(pulse.weekly_revenue, 804.0);
}

#[test]
fn test_detail_and_history_upload() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write(&dir, "notes.csv", UNRELATED_CSV),
        write(&dir, "history.csv", HISTORY_CSV),
        write(&dir, "detail.csv", DETAIL_CSV),
    ];

    let dataset = ingest(load_files(&paths).unwrap(), &ContentFilter::default());
    let h = dataset.history.as_ref().unwrap();
    let hit = h
        .rows
        .iter()
        .find(|s| s.video.title.as_deref() == Some("Hit Song"))
        .unwrap();
    assert_eq!(hit.video.artist, "Star");
    assert!(hit.video.identified);
    let unmapped = h
        .rows
        .iter()
        .find(|s| s.video.title.as_deref() == Some("Unmapped"))
        .unwrap();
    assert_eq!(unmapped.video.artist, "Label Two");
    assert!(!unmapped.video.identified);

    let prepared = prepare(dataset, &Selection::default()).unwrap();
    assert_eq!(prepared.working.source, WorkingSource::Detail);
    assert_eq!(prepared.artist_options, vec!["Newcomer", "Star"]);

    let report = compute(&prepared, &Assumptions::default(), as_of());
    let star = report
        .artist_stats
        .iter()
        .find(|s| s.artist == "Star")
        .unwrap();
    assert_eq!(star.views, 1_206_000);
    assert_eq!(star.video_count, 2);

    // Hit Song: 2020-03-02 is over two years old and still earns 900 a day
    let ghost = report.ghost_income.unwrap();
    assert_eq!(ghost.rows.len(), 1);
    assert_eq!(ghost.rows[0].title.as_deref(), Some("Hit Song"));

    let heatmap = report.timing.unwrap();
    assert_eq!(heatmap[0].month, "March");
    assert!(matches!(report.asset_gap.verdict, GapVerdict::ValueSaved(_)));

    let deal = simulate_deal(
        &prepared.working,
        "Star",
        None,
        &DealTerms::default(),
        &Assumptions::default(),
    )
    .unwrap();
    // median 603,000 views -> 2,412 revenue; profit -88; diff -5,088
    assert_eq!(deal.verdict, DealVerdict::Accept);
}

#[test]
fn test_hide_unidentified_applies_to_history() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write(&dir, "history.csv", HISTORY_CSV),
        write(&dir, "detail.csv", DETAIL_CSV),
    ];
    let dataset = ingest(load_files(&paths).unwrap(), &ContentFilter::default());
    let selection = Selection {
        hide_unidentified: true,
        ..Default::default()
    };
    let prepared = prepare(dataset, &selection).unwrap();
    let history = prepared.history.unwrap();
    assert!(history.rows.iter().all(|s| s.video.identified));
    assert!(history.rows.iter().all(|s| s.video.artist == "Star"));
}

#[test]
fn test_hide_unidentified_spares_working_table() {
    let dir = TempDir::new().unwrap();
    let history = write(&dir, "history.csv", HISTORY_CSV);
    let dataset = ingest(load_files(&[history]).unwrap(), &ContentFilter::default());
    let selection = Selection {
        hide_unidentified: true,
        ..Default::default()
    };
    let prepared = prepare(dataset, &selection).unwrap();
    assert_eq!(prepared.working.len(), 4);
    assert!(prepared.ensure_rows().is_ok());
    assert!(prepared.history.unwrap().is_empty());
}

#[test]
fn test_detail_without_view_counts_still_attributes_history() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write(&dir, "history.csv", HISTORY_CSV),
        write(
            &dir,
            "detail.csv",
            "Clean_Artist_Name,Video Title,View Count\nStar,Hit Song,\n",
        ),
    ];
    let dataset = ingest(load_files(&paths).unwrap(), &ContentFilter::default());
    assert!(dataset.detail.as_ref().unwrap().is_empty());

    let h = dataset.history.as_ref().unwrap();
    let hit: Vec<_> = h
        .rows
        .iter()
        .filter(|s| s.video.title.as_deref() == Some("Hit Song"))
        .collect();
    assert_eq!(hit.len(), 2);
    assert!(hit.iter().all(|s| s.video.artist == "Star" && s.video.identified));

    // no readable detail rows, so the working table is the latest snapshot
    let prepared = prepare(dataset, &Selection::default()).unwrap();
    assert!(matches!(prepared.working.source, WorkingSource::LatestSnapshot(_)));
    assert!(prepared.artist_options.contains(&"Star".to_string()));
}

#[test]
fn test_include_wins_over_exclude() {
    let dir = TempDir::new().unwrap();
    let detail = write(&dir, "detail.csv", DETAIL_CSV);
    let dataset = ingest(load_files(&[detail]).unwrap(), &ContentFilter::default());
    let selection = Selection {
        include_artists: vec!["Star".to_string()],
        exclude_artists: vec!["Star".to_string()],
        hide_unidentified: false,
    };
    let prepared = prepare(dataset, &selection).unwrap();
    assert_eq!(prepared.working.artists(), vec!["Star"]);
}

#[test]
fn test_aggregate_artist_never_empty() {
    let dir = TempDir::new().unwrap();
    let history = write(&dir, "history.csv", HISTORY_CSV);
    let dataset = ingest(load_files(&[history]).unwrap(), &ContentFilter::default());
    let prepared = prepare(dataset, &Selection::default()).unwrap();
    let report = compute(&prepared, &Assumptions::default(), as_of());
    assert!(report.artist_stats.iter().all(|s| !s.artist.trim().is_empty()));
}

#[test]
fn test_content_filter_idempotent() {
    let dir = TempDir::new().unwrap();
    let history = write(&dir, "history.csv", HISTORY_CSV);
    let filter = ContentFilter::default();
    let once = ingest(load_files(&[&history]).unwrap(), &filter).history.unwrap();
    let twice = filter.apply(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn test_pipeline_deterministic() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write(&dir, "history.csv", HISTORY_CSV),
        write(&dir, "detail.csv", DETAIL_CSV),
    ];
    let run = || {
        let dataset = ingest(load_files(&paths).unwrap(), &ContentFilter::default());
        let prepared = prepare(dataset, &Selection::default()).unwrap();
        compute(&prepared, &Assumptions::default(), as_of())
    };
    assert_eq!(run(), run());
}

#[test]
fn test_no_usable_tables_is_data_unavailable() {
    let dir = TempDir::new().unwrap();
    let notes = write(&dir, "notes.csv", UNRELATED_CSV);
    let dataset = ingest(load_files(&[notes]).unwrap(), &ContentFilter::default());
    assert!(matches!(
        prepare(dataset, &Selection::default()),
        Err(Error::DataUnavailable(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.csv");
    assert!(matches!(load_files(&[missing]), Err(Error::Io(_))));
}
