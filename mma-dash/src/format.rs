//! Plain-text rendering of reports for the terminal

use mma_common::merger::WorkingSource;
use mma_common::metrics::{to_dollars, DealOutcome, GapVerdict, SalaryReport};
use mma_common::pipeline::Report;
use mma_common::Assumptions;
use std::fmt::Write;

fn money(v: f64) -> String {
    let rounded = v.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let whole = rounded.abs() as u64;
    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{}${}", sign, grouped)
}

/// Multi-section summary of a full report
pub fn summary(report: &Report) -> String {
    let mut out = String::new();
    let a = &report.assumptions;

    let source = match report.source {
        WorkingSource::Detail => "detail export".to_string(),
        WorkingSource::LatestSnapshot(at) => format!("history snapshot of {}", at.date()),
    };
    let _ = writeln!(out, "MUSIC MONEY ANALYTICS (as of {})", report.as_of);
    let _ = writeln!(
        out,
        "Source: {}, {} videos, {} artists",
        source,
        report.videos.len(),
        report.artist_stats.len()
    );
    let _ = writeln!(
        out,
        "RPM ${:.2} | flat fee {} | production {} | platform cut {}%",
        a.rpm,
        money(a.flat_fee),
        money(a.prod_cost),
        a.platform_cut_pct
    );

    let _ = writeln!(out, "\nASSET GAP (top {} by revenue)", report.asset_gap.top_artists.len());
    for s in &report.asset_gap.top_artists {
        let _ = writeln!(
            out,
            "  {:<30} {:>12} revenue {:>12} gap",
            s.artist,
            money(s.revenue),
            money(s.wealth_gap)
        );
    }
    match report.asset_gap.verdict {
        GapVerdict::OpportunityCost(v) => {
            let _ = writeln!(out, "  Opportunity cost of selling rights: {}", money(v));
        }
        GapVerdict::ValueSaved(v) => {
            let _ = writeln!(out, "  Value saved by selling rights: {}", money(v));
        }
    }

    if let Some(lottery) = &report.lottery {
        let hits = lottery
            .points
            .iter()
            .filter(|p| p.revenue > lottery.flat_fee)
            .count();
        let _ = writeln!(
            out,
            "\nLOTTERY TICKET: {} of {} charted videos out-earned the {} fee",
            hits,
            lottery.points.len(),
            money(lottery.flat_fee)
        );
    }

    match &report.ghost_income {
        Some(ghost) => {
            let _ = writeln!(
                out,
                "\nGHOST INCOME: {} old videos earn {} a year",
                ghost.rows.len(),
                money(ghost.total_annual_passive)
            );
            for r in ghost.rows.iter().take(5) {
                let _ = writeln!(
                    out,
                    "  {:<40} {:>10}/yr ({} days old)",
                    r.title.as_deref().unwrap_or("?"),
                    money(r.est_annual_passive),
                    r.days_since_release
                );
            }
        }
        None => {
            let _ = writeln!(out, "\nGHOST INCOME: needs release dates and average daily views");
        }
    }

    match &report.weekly_pulse {
        Some(p) => {
            let _ = writeln!(
                out,
                "\nWEEKLY PULSE ({} -> {}): +{} views, {} this week, {} projected monthly",
                p.previous.date(),
                p.latest.date(),
                p.views_gained,
                money(p.weekly_revenue),
                money(p.projected_monthly)
            );
            let _ = writeln!(
                out,
                "  Split: artist {} ({}%), platform {} ({}%)",
                money(to_dollars(p.split.artist_share)),
                p.split.artist_pct,
                money(to_dollars(p.split.platform_share)),
                p.split.platform_pct
            );
            for v in &p.top_videos {
                let gained = v
                    .views_gained
                    .map_or_else(|| "new".to_string(), |g| format!("+{}", g));
                let _ = writeln!(
                    out,
                    "  {:<40} {:>10} {}",
                    v.title.as_deref().unwrap_or(&v.key),
                    gained,
                    v.artist
                );
            }
        }
        None => {
            let _ = writeln!(out, "\nWEEKLY PULSE: needs at least two capture dates");
        }
    }

    if let Some(cells) = &report.timing {
        if let Some(best) = cells
            .iter()
            .max_by(|x, y| x.median_views.total_cmp(&y.median_views))
        {
            let _ = writeln!(
                out,
                "\nBEST RELEASE SLOT: {} on a {} ({:.0} median views)",
                best.month,
                best.weekday,
                best.median_views
            );
        }
    }

    out
}

pub fn deal(outcome: &DealOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "DEAL SIMULATOR: {} ({} videos, median {:.0} views)",
        outcome.artist,
        outcome.videos_considered,
        outcome.median_views
    );
    let _ = writeln!(out, "  Projected revenue:  {}", money(outcome.projected_revenue));
    let _ = writeln!(out, "  Independent profit: {}", money(outcome.independent_profit));
    let _ = writeln!(out, "  Offer:              {}", money(outcome.offer));
    let _ = writeln!(out, "  Difference:         {}", money(outcome.difference));
    let _ = writeln!(out, "  Verdict:            {}", outcome.verdict.as_str());
    out
}

pub fn salary(report: &SalaryReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "MONTHLY SALARY: {} at {}% share",
        report.artist, report.artist_cut_pct
    );
    for r in &report.rows {
        let _ = writeln!(
            out,
            "  {:<40} {:>10}",
            r.title.as_deref().unwrap_or("?"),
            r.net_monthly_pay.map_or_else(|| "-".to_string(), money)
        );
    }
    let _ = writeln!(out, "  Total monthly:   {}", money(report.total_monthly));
    let _ = writeln!(out, "  Annual run-rate: {}", money(report.annual_run_rate));
    out
}

/// Table of tunable assumptions with their current values
pub fn params(current: &Assumptions) -> String {
    let mut out = String::new();
    for meta in Assumptions::metadata() {
        let _ = writeln!(
            out,
            "{:<18} {:<18} {:>8} (default {}, range {})  {}",
            meta.key,
            meta.env_var,
            current.get(meta.key).unwrap_or(f64::NAN),
            meta.default_value,
            meta.validation_range,
            meta.description
        );
    }
    out
}
