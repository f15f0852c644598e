//! Domain commands.

use std::sync::Arc;

use console::style;

use super::Context;
use crate::cli::helpers::{print_json, truncate};
use crate::cli::icons::warn;
use narelle_admin::actions::PendingAction;
use narelle_admin::models::Domain;
use narelle_admin::refresh::RefreshKey;

async fn fetch_domains(ctx: &Context, course: &str) -> anyhow::Result<Arc<Vec<Domain>>> {
    let user = ctx.principal()?.username().to_string();
    let domains = ctx
        .cache
        .get_or_fetch(RefreshKey::domains(course), || {
            ctx.api.list_domains(&user, course)
        })
        .await?;
    Ok(domains)
}

/// List the domains of a course.
pub async fn cmd_domain_list(ctx: &Context, course: &str, counts: bool) -> anyhow::Result<()> {
    let domains = fetch_domains(ctx, course).await?;

    let mut file_counts = Vec::with_capacity(domains.len());
    for domain in domains.iter() {
        file_counts.push(if counts {
            Some(ctx.api.domain_file_count(course, &domain.domain).await?)
        } else {
            None
        });
    }

    if ctx.json {
        let rows: Vec<_> = domains
            .iter()
            .zip(&file_counts)
            .map(|(domain, files)| serde_json::json!({ "domain": domain.domain, "files": files }))
            .collect();
        return print_json(&rows);
    }

    if domains.is_empty() {
        println!(
            "{} No domains in {}. Create one with 'narelle domain create {} <domain>'.",
            warn(),
            course,
            course
        );
        return Ok(());
    }

    println!("\n{} {}", style("Domains in").bold(), style(course).cyan());
    println!("{}", "-".repeat(40));
    for (domain, files) in domains.iter().zip(&file_counts) {
        match files {
            Some(n) => println!("{:<30} {:>8}", truncate(&domain.domain, 29), n),
            None => println!("{}", domain.domain),
        }
    }
    Ok(())
}

pub async fn cmd_domain_create(ctx: &Context, course: String, domain: String) -> anyhow::Result<()> {
    let action = PendingAction::CreateDomain {
        course: course.clone(),
        domain,
    };
    if ctx.run_action(action, true).await?.is_some() && !ctx.json {
        cmd_domain_list(ctx, &course, false).await?;
    }
    Ok(())
}

pub async fn cmd_domain_delete(
    ctx: &Context,
    course: String,
    domain: String,
    yes: bool,
) -> anyhow::Result<()> {
    let action = PendingAction::DeleteDomain {
        course: course.clone(),
        domain,
    };
    if ctx.run_action(action, yes).await?.is_some() && !ctx.json {
        cmd_domain_list(ctx, &course, false).await?;
    }
    Ok(())
}
