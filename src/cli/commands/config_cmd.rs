//! Configuration management commands.

use console::style;

use super::Context;
use crate::cli::helpers::{print_detail, print_json};
use crate::cli::icons::warn;

/// Show the effective settings and where they came from.
pub fn cmd_config_show(ctx: &Context) -> anyhow::Result<()> {
    if ctx.json {
        return print_json(&serde_json::json!({
            "source": ctx.config.source_path,
            "settings": ctx.settings,
        }));
    }

    println!("\n{}", style("Configuration").bold());
    match ctx.config.source_path {
        Some(ref path) => print_detail("Config file", path.display()),
        None => print_detail("Config file", "none (defaults and environment)"),
    }
    print_detail("Backend", ctx.api.api_url());
    print_detail("Video service", ctx.api.video_api_url());
    print_detail(
        "User",
        ctx.settings.username.as_deref().unwrap_or("not signed in"),
    );
    print_detail("Request timeout", format!("{}s", ctx.settings.request_timeout));
    print_detail("Upload timeout", format!("{}s", ctx.settings.upload_timeout));
    print_detail("Chunk size", ctx.settings.chunking.chunk_size);
    print_detail("Overlap", ctx.settings.chunking.overlap);

    if !ctx.session.is_signed_in() {
        println!(
            "\n{} Set NARELLE_USER, add 'username' to the config file, or pass --user",
            warn()
        );
    }
    Ok(())
}
