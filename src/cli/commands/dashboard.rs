//! Usage dashboard.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use super::Context;
use crate::cli::helpers::{print_json, truncate};
use narelle_admin::models::Series;

const BAR_WIDTH: u64 = 30;

pub async fn cmd_dashboard(ctx: &Context) -> anyhow::Result<()> {
    let user = ctx.principal()?.username().to_string();

    let pb = if ctx.json {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb
    };
    pb.set_message("Loading dashboard...");
    let summary = ctx.api.dashboard_summary(&user).await;
    pb.finish_and_clear();
    let summary = summary?;

    if ctx.json {
        return print_json(&summary);
    }

    println!("\n{}", style("Dashboard").bold());
    println!("{}", "-".repeat(50));
    println!("{:<20} {}", "Total users", summary.total_users);
    println!("{:<20} {}", "Total queries", summary.total_queries);

    print_series("Queries by month", &summary.queries_by_month);
    print_series("Queries by course", &summary.queries_by_course);
    print_series("Sentiments", &summary.sentiments);
    print_series("Emotions", &summary.emotions);
    Ok(())
}

fn print_series(title: &str, series: &Series) {
    println!("\n{}", style(title).bold());
    if series.is_empty() {
        println!("  {}", style("no data").dim());
        return;
    }

    let max = series.pairs().map(|(_, n)| n).max().unwrap_or(0);
    for (label, count) in series.pairs() {
        let width = bar_width(count, max);
        println!(
            "  {:<16} {:<30} {}",
            truncate(label, 16),
            style("█".repeat(width)).cyan(),
            count
        );
    }
}

/// Bar length for `count` scaled against the largest count `max`.
fn bar_width(count: u64, max: u64) -> usize {
    let max = u128::from(max.max(1));
    (u128::from(count) * u128::from(BAR_WIDTH) / max).min(u128::from(BAR_WIDTH)) as usize
}
