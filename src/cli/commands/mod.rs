//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod access;
mod activity;
mod config_cmd;
mod course;
mod dashboard;
mod domain;
mod file;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use console::style;

use super::helpers::{confirm, parse_date_arg, print_cancelled, print_json, report_error};
use super::icons::{info, success, warn};
use narelle_admin::actions::{ActionOutcome, PendingAction};
use narelle_admin::api::ApiClient;
use narelle_admin::config::{load_settings_with_options, Config, LoadOptions, Settings};
use narelle_admin::filter::Choice;
use narelle_admin::models::ActivityAction;
use narelle_admin::refresh::ListCache;
use narelle_admin::session::{Principal, Session};

#[derive(Parser)]
#[command(name = "narelle")]
#[command(about = "Administer AskNarelle courses, knowledge-base files and access")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true, env = "NARELLE_API_URL")]
    api_url: Option<String>,

    /// Video service base URL (defaults to the backend URL)
    #[arg(long, global = true, env = "NARELLE_VIDEO_API_URL")]
    video_api_url: Option<String>,

    /// Signed-in user, as issued by the identity provider
    #[arg(short, long, global = true, env = "NARELLE_USER")]
    user: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Manage courses
    Course {
        #[command(subcommand)]
        command: CourseCommands,
    },

    /// Manage domains (folders) inside a course
    Domain {
        #[command(subcommand)]
        command: DomainCommands,
    },

    /// Manage files inside a domain
    File {
        #[command(subcommand)]
        command: FileCommands,
    },

    /// Show the activity log
    Activity {
        /// Filter by user (substring)
        #[arg(long = "by")]
        by: Option<String>,
        /// Filter by course (substring)
        #[arg(long)]
        course: Option<String>,
        /// Filter by domain (substring)
        #[arg(long)]
        domain: Option<String>,
        /// Filter by file name (substring)
        #[arg(long)]
        file: Option<String>,
        /// Filter by action (e.g. upload, "File Deletion", all)
        #[arg(long, default_value = "all")]
        action: Choice<ActivityAction>,
        /// Earliest date, inclusive (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        from: Option<NaiveDate>,
        /// Latest date, inclusive (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        to: Option<NaiveDate>,
    },

    /// Manage who can administer a course
    Access {
        #[command(subcommand)]
        command: AccessCommands,
    },

    /// Show usage statistics
    Dashboard,

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum CourseCommands {
    /// List courses you own or that were shared with you
    List {
        /// Include file counts
        #[arg(long)]
        counts: bool,
        /// Filter by course name (substring)
        #[arg(long)]
        filter: Option<String>,
    },
    /// Create a course
    Create {
        /// Course code (lowercase letters, digits and hyphens)
        code: String,
        /// Description registered with the video service
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a course and everything in it
    Delete {
        course: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum DomainCommands {
    /// List domains in a course
    List {
        course: String,
        /// Include file counts
        #[arg(long)]
        counts: bool,
    },
    /// Create a domain
    Create { course: String, domain: String },
    /// Delete a domain and everything in it
    Delete {
        course: String,
        domain: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum FileCommands {
    /// List files in a domain
    List {
        course: String,
        domain: String,
        /// Filter by file name (substring)
        #[arg(long)]
        name: Option<String>,
        /// In vector store: yes, no or all
        #[arg(long, default_value = "all")]
        vector: Choice<bool>,
        /// Root version: yes, no or all
        #[arg(long, default_value = "all")]
        root: Choice<bool>,
        /// Earliest upload date, inclusive (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        from: Option<NaiveDate>,
        /// Latest upload date, inclusive (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        to: Option<NaiveDate>,
    },
    /// Upload documents and videos
    Upload {
        course: String,
        domain: String,
        /// Files to upload (.pdf, .docx, .pptx, .txt, .mp4, .mov, .mkv, .webm, .avi)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Chunk size for the vector store (500-2000)
        #[arg(long)]
        chunk_size: Option<u32>,
        /// Chunk overlap for the vector store (0-500)
        #[arg(long)]
        overlap: Option<u32>,
        /// Description attached to every uploaded video
        #[arg(long)]
        video_description: Option<String>,
    },
    /// Delete a file
    Delete {
        course: String,
        domain: String,
        /// File record ID
        file_id: String,
        /// Only remove the stored blob (for files never moved to the vector store)
        #[arg(long)]
        blob_only: bool,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Move a stored file into the vector store
    Move {
        course: String,
        domain: String,
        /// File record ID
        file_id: String,
        /// Chunk size for the vector store (500-2000)
        #[arg(long)]
        chunk_size: Option<u32>,
        /// Chunk overlap for the vector store (0-500)
        #[arg(long)]
        overlap: Option<u32>,
    },
}

#[derive(Subcommand)]
enum AccessCommands {
    /// List users a course is shared with
    List { course: String },
    /// Invite someone to administer a course
    Share { course: String, email: String },
    /// Remove a user's access to a course
    Revoke {
        course: String,
        /// Username to remove
        username: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
}

/// Everything a command needs.
pub struct Context {
    pub settings: Settings,
    pub config: Config,
    pub api: ApiClient,
    pub session: Session,
    pub cache: ListCache,
    pub json: bool,
}

impl Context {
    pub fn principal(&self) -> anyhow::Result<&Principal> {
        Ok(self.session.require()?)
    }

    /// Confirm, run and report an action, then invalidate what it touched.
    ///
    /// Returns `None` when the user declines.
    pub async fn run_action(
        &self,
        action: PendingAction,
        yes: bool,
    ) -> anyhow::Result<Option<ActionOutcome>> {
        let principal = self.principal()?;
        action.validate()?;

        if action.is_destructive() && !yes {
            println!("\n{} {}", info(), action.describe());
            if let Some(warning) = action.warning() {
                println!("  {} {}", warn(), style(warning).yellow());
            }
            if !confirm("Proceed?")? {
                print_cancelled();
                return Ok(None);
            }
        }

        let outcome = action.execute(&self.api, principal).await?;
        self.cache.invalidate_all(&outcome.refresh);

        if self.json {
            print_json(&serde_json::json!({ "message": outcome.message }))?;
        } else {
            println!("{} {}", success(), outcome.message);
        }
        Ok(Some(outcome))
    }
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        api_url: cli.api_url,
        video_api_url: cli.video_api_url,
        username: cli.user,
    };
    let (settings, config) = load_settings_with_options(options).await;

    let ctx = Context {
        api: ApiClient::new(&settings)?,
        session: Session::from_settings(&settings),
        cache: ListCache::new(),
        json: cli.json,
        settings,
        config,
    };

    let result = dispatch(&ctx, cli.command).await;
    if let Err(ref e) = result {
        report_error(e);
        std::process::exit(1);
    }
    result
}

async fn dispatch(ctx: &Context, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Course { command } => match command {
            CourseCommands::List { counts, filter } => {
                course::cmd_course_list(ctx, counts, filter).await
            }
            CourseCommands::Create { code, description } => {
                course::cmd_course_create(ctx, code, description).await
            }
            CourseCommands::Delete { course, yes } => {
                course::cmd_course_delete(ctx, course, yes).await
            }
        },
        Commands::Domain { command } => match command {
            DomainCommands::List { course, counts } => {
                domain::cmd_domain_list(ctx, &course, counts).await
            }
            DomainCommands::Create { course, domain } => {
                domain::cmd_domain_create(ctx, course, domain).await
            }
            DomainCommands::Delete {
                course,
                domain,
                yes,
            } => domain::cmd_domain_delete(ctx, course, domain, yes).await,
        },
        Commands::File { command } => match command {
            FileCommands::List {
                course,
                domain,
                name,
                vector,
                root,
                from,
                to,
            } => {
                let filter = file::file_filter(name, vector, root, from, to);
                file::cmd_file_list(ctx, &course, &domain, &filter).await
            }
            FileCommands::Upload {
                course,
                domain,
                paths,
                chunk_size,
                overlap,
                video_description,
            } => {
                let chunking = file::chunking(ctx, chunk_size, overlap);
                file::cmd_file_upload(ctx, course, domain, &paths, chunking, video_description)
                    .await
            }
            FileCommands::Delete {
                course,
                domain,
                file_id,
                blob_only,
                yes,
            } => file::cmd_file_delete(ctx, course, domain, &file_id, blob_only, yes).await,
            FileCommands::Move {
                course,
                domain,
                file_id,
                chunk_size,
                overlap,
            } => {
                let chunking = file::chunking(ctx, chunk_size, overlap);
                file::cmd_file_move(ctx, course, domain, &file_id, chunking).await
            }
        },
        Commands::Activity {
            by,
            course,
            domain,
            file,
            action,
            from,
            to,
        } => {
            let filter = activity::activity_filter(by, course, domain, file, action, from, to);
            activity::cmd_activity(ctx, &filter).await
        }
        Commands::Access { command } => match command {
            AccessCommands::List { course } => access::cmd_access_list(ctx, &course).await,
            AccessCommands::Share { course, email } => {
                access::cmd_access_share(ctx, course, email).await
            }
            AccessCommands::Revoke {
                course,
                username,
                yes,
            } => access::cmd_access_revoke(ctx, course, username, yes).await,
        },
        Commands::Dashboard => dashboard::cmd_dashboard(ctx).await,
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_cmd::cmd_config_show(ctx),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_file_list_filters() {
        let cli = Cli::try_parse_from([
            "narelle", "file", "list", "cs1003", "week1", "--vector", "no", "--from",
            "2024-03-01",
        ])
        .unwrap();
        match cli.command {
            Commands::File {
                command: FileCommands::List { vector, from, .. },
            } => {
                assert_eq!(vector, Choice::Only(false));
                assert_eq!(from, NaiveDate::from_ymd_opt(2024, 3, 1));
            }
            _ => panic!("expected file list"),
        }
    }

    #[test]
    fn test_upload_requires_paths() {
        assert!(Cli::try_parse_from(["narelle", "file", "upload", "cs1003", "week1"]).is_err());
    }

    #[test]
    fn test_rejects_bad_date() {
        assert!(Cli::try_parse_from(["narelle", "activity", "--from", "yesterday"]).is_err());
    }
}
