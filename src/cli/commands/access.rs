//! Course sharing commands.

use console::style;

use super::Context;
use crate::cli::helpers::print_json;
use crate::cli::icons::{bullet, warn};
use narelle_admin::actions::PendingAction;
use narelle_admin::refresh::RefreshKey;

pub async fn cmd_access_list(ctx: &Context, course: &str) -> anyhow::Result<()> {
    ctx.principal()?;
    let users = ctx
        .cache
        .get_or_fetch(RefreshKey::access(course), || {
            ctx.api.list_course_users(course)
        })
        .await?;

    if ctx.json {
        return print_json(users.as_slice());
    }

    if users.is_empty() {
        println!("{} {} is not shared with anyone", warn(), course);
        return Ok(());
    }

    println!("\n{} {}", style("Shared access to").bold(), style(course).cyan());
    for user in users.iter() {
        println!("  {} {}", bullet(), user);
    }
    Ok(())
}

pub async fn cmd_access_share(ctx: &Context, course: String, email: String) -> anyhow::Result<()> {
    let action = PendingAction::ShareCourse {
        course: course.clone(),
        email,
    };
    if ctx.run_action(action, true).await?.is_some() && !ctx.json {
        cmd_access_list(ctx, &course).await?;
    }
    Ok(())
}

pub async fn cmd_access_revoke(
    ctx: &Context,
    course: String,
    user: String,
    yes: bool,
) -> anyhow::Result<()> {
    let action = PendingAction::RevokeAccess {
        course: course.clone(),
        user,
    };
    if ctx.run_action(action, yes).await?.is_some() && !ctx.json {
        cmd_access_list(ctx, &course).await?;
    }
    Ok(())
}
