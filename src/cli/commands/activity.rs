//! Activity log command.

use chrono::NaiveDate;
use console::style;

use super::Context;
use crate::cli::helpers::{print_json, truncate};
use crate::cli::icons::{info, warn};
use narelle_admin::filter::{ActivityFilter, Choice, DateRange, RecordFilter, TextFilter};
use narelle_admin::models::ActivityAction;
use narelle_admin::refresh::RefreshKey;

pub fn activity_filter(
    user: Option<String>,
    course: Option<String>,
    domain: Option<String>,
    file: Option<String>,
    action: Choice<ActivityAction>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> ActivityFilter {
    ActivityFilter {
        user: TextFilter::from(user),
        course: TextFilter::from(course),
        domain: TextFilter::from(domain),
        file: TextFilter::from(file),
        action,
        dates: DateRange::new(from, to),
    }
}

/// Show activity on the courses the signed-in user owns.
pub async fn cmd_activity(ctx: &Context, filter: &ActivityFilter) -> anyhow::Result<()> {
    let user = ctx.principal()?.username().to_string();
    let activities = ctx
        .cache
        .get_or_fetch(RefreshKey::Activities, || ctx.api.list_activities(&user))
        .await?;
    let visible = filter.apply(&activities);

    if ctx.json {
        return print_json(&visible);
    }

    if visible.is_empty() {
        println!("{} No matching activity", warn());
        return Ok(());
    }

    println!("\n{}", style("Activity Log").bold());
    println!("{}", "-".repeat(110));
    println!(
        "{:<20} {:<24} {:<10} {:<12} {:<22} Action",
        "Date", "User", "Course", "Domain", "File"
    );
    println!("{}", "-".repeat(110));
    for activity in &visible {
        println!(
            "{:<20} {:<24} {:<10} {:<12} {:<22} {}",
            format!("{} {}", activity.date_str, activity.time_str),
            truncate(&activity.user, 23),
            truncate(&activity.course_name, 9),
            truncate(&activity.domain, 11),
            truncate(activity.file_name().unwrap_or("-"), 21),
            activity.action
        );
    }
    println!(
        "\n{} {} of {} entries shown",
        info(),
        visible.len(),
        activities.len()
    );
    Ok(())
}
