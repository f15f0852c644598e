//! Course commands.

use console::style;

use super::Context;
use crate::cli::helpers::{print_json, truncate};
use crate::cli::icons::{info, warn};
use narelle_admin::actions::PendingAction;
use narelle_admin::filter::{CourseFilter, RecordFilter, TextFilter};
use narelle_admin::models::Course;
use narelle_admin::refresh::RefreshKey;

async fn fetch_courses(ctx: &Context) -> anyhow::Result<std::sync::Arc<Vec<Course>>> {
    let user = ctx.principal()?.username().to_string();
    let courses = ctx
        .cache
        .get_or_fetch(RefreshKey::Courses, || ctx.api.list_courses(&user))
        .await?;
    Ok(courses)
}

/// List courses visible to the signed-in user.
pub async fn cmd_course_list(
    ctx: &Context,
    counts: bool,
    filter: Option<String>,
) -> anyhow::Result<()> {
    let courses = fetch_courses(ctx).await?;
    let filter = CourseFilter {
        name: TextFilter::from(filter),
    };
    let visible = filter.apply(&courses);

    let mut file_counts = Vec::with_capacity(visible.len());
    if counts {
        for course in &visible {
            file_counts.push(Some(ctx.api.course_file_count(&course.course_name).await?));
        }
    } else {
        file_counts.resize(visible.len(), None);
    }

    if ctx.json {
        let rows: Vec<_> = visible
            .iter()
            .zip(&file_counts)
            .map(|(course, files)| {
                serde_json::json!({
                    "course_name": course.course_name,
                    "user_type": course.user_type,
                    "files": files,
                })
            })
            .collect();
        return print_json(&rows);
    }

    if visible.is_empty() {
        println!("{} No courses found. Create one with 'narelle course create <code>'.", warn());
        return Ok(());
    }

    println!("\n{}", style("Courses").bold());
    println!("{}", "-".repeat(50));
    println!("{:<30} {:<10} {:>8}", "Course", "Access", "Files");
    println!("{}", "-".repeat(50));
    for (course, files) in visible.iter().zip(&file_counts) {
        println!(
            "{:<30} {:<10} {:>8}",
            truncate(&course.course_name, 29),
            course.user_type.as_str(),
            files.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())
        );
    }
    Ok(())
}

pub async fn cmd_course_create(
    ctx: &Context,
    code: String,
    description: Option<String>,
) -> anyhow::Result<()> {
    let action = PendingAction::CreateCourse { code, description };
    if ctx.run_action(action, true).await?.is_some() && !ctx.json {
        cmd_course_list(ctx, false, None).await?;
    }
    Ok(())
}

pub async fn cmd_course_delete(ctx: &Context, course: String, yes: bool) -> anyhow::Result<()> {
    let action = PendingAction::DeleteCourse {
        course: course.clone(),
    };
    if ctx.run_action(action, yes).await?.is_some() {
        ctx.cache.invalidate_course(&course);
        if !ctx.json {
            println!("{} Removed {} and its contents", info(), course);
        }
    }
    Ok(())
}
