//! Shared helpers for CLI commands.

use std::io::{self, Write};

use chrono::NaiveDate;
use console::style;
use serde::Serialize;

use super::icons::{dim_arrow, error, warn};
use narelle_admin::actions::ActionError;
use narelle_admin::error::ApiError;
use narelle_admin::ingest::IngestError;
use narelle_admin::models::parse_day;

/// Truncate to `max` characters, ending with "..." when shortened.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Ask a yes/no question; anything but `y` is a no.
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("\n{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Clap parser for `YYYY-MM-DD` dates.
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_day(s).ok_or_else(|| format!("expected a date like 2024-03-01 (got '{}')", s))
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// The backend error behind a command failure, if there is one.
fn api_error(err: &anyhow::Error) -> Option<&ApiError> {
    if let Some(e) = err.downcast_ref::<ApiError>() {
        return Some(e);
    }
    match err.downcast_ref::<ActionError>() {
        Some(ActionError::Api(e)) => return Some(e),
        Some(_) => return None,
        None => {}
    }
    match err.downcast_ref::<IngestError>() {
        Some(IngestError::Stage { source, .. }) => Some(source),
        _ => None,
    }
}

/// Print a command failure. 403 and 404 get their own views.
pub fn report_error(err: &anyhow::Error) {
    tracing::error!("{:#}", err);

    match api_error(err) {
        Some(e) if e.is_forbidden() => {
            eprintln!("\n{} {}", style("403").red().bold(), style("Forbidden").bold());
            eprintln!("  You do not have permission to access this page.");
        }
        Some(e) if e.is_not_found() => {
            eprintln!("\n{} {}", style("404").red().bold(), style("Page Not Found").bold());
            eprintln!("  The page you are looking for does not exist.");
        }
        _ => {
            let message = if let Some(e) = err.downcast_ref::<IngestError>() {
                match e.stage() {
                    Some(stage) => format!("{} failed: {}", stage, e.user_message()),
                    None => e.user_message(),
                }
            } else if let Some(e) = err.downcast_ref::<ActionError>() {
                e.user_message()
            } else if let Some(e) = err.downcast_ref::<ApiError>() {
                e.user_message()
            } else {
                err.to_string()
            };
            eprintln!("{} {}", error(), message);
        }
    }
}

pub fn print_cancelled() {
    println!("{} Cancelled", warn());
}

pub fn print_detail(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}: {}", dim_arrow(), label, value);
}
