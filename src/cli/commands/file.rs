//! File commands: listing, upload, deletion and vector store moves.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use console::style;

use super::Context;
use crate::cli::helpers::{print_detail, print_json, truncate, yes_no};
use crate::cli::icons::{info, warn};
use crate::cli::progress::StageSpinner;
use narelle_admin::actions::PendingAction;
use narelle_admin::api::ApiClient;
use narelle_admin::filter::{Choice, DateRange, FileFilter, RecordFilter, TextFilter};
use narelle_admin::ingest::{ChunkingParams, IngestTarget, IngestionBatch, IngestionWorkflow};
use narelle_admin::models::Document;
use narelle_admin::refresh::RefreshKey;

pub fn file_filter(
    name: Option<String>,
    vector: Choice<bool>,
    root: Choice<bool>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> FileFilter {
    FileFilter {
        name: TextFilter::from(name),
        in_vector_store: vector,
        root_blob: root,
        dates: DateRange::new(from, to),
    }
}

/// Chunking from flags, falling back to configured defaults.
pub fn chunking(ctx: &Context, chunk_size: Option<u32>, overlap: Option<u32>) -> ChunkingParams {
    ChunkingParams {
        chunk_size: chunk_size.unwrap_or(ctx.settings.chunking.chunk_size),
        overlap: overlap.unwrap_or(ctx.settings.chunking.overlap),
    }
}

async fn fetch_documents(
    ctx: &Context,
    course: &str,
    domain: &str,
) -> anyhow::Result<Arc<Vec<Document>>> {
    let user = ctx.principal()?.username().to_string();
    let documents = ctx
        .cache
        .get_or_fetch(RefreshKey::files(course, domain), || {
            ctx.api.list_documents(&user, course, domain)
        })
        .await?;
    Ok(documents)
}

async fn find_document(
    ctx: &Context,
    course: &str,
    domain: &str,
    file_id: &str,
) -> anyhow::Result<Document> {
    let documents = fetch_documents(ctx, course, domain).await?;
    documents
        .iter()
        .find(|d| d.id == file_id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("File '{}' not found in {}/{}", file_id, course, domain))
}

/// List files in a domain.
pub async fn cmd_file_list(
    ctx: &Context,
    course: &str,
    domain: &str,
    filter: &FileFilter,
) -> anyhow::Result<()> {
    let documents = fetch_documents(ctx, course, domain).await?;
    let visible = filter.apply(&documents);

    if ctx.json {
        return print_json(&visible);
    }

    if visible.is_empty() {
        println!("{} No files found in {}/{}", warn(), course, domain);
        return Ok(());
    }

    println!(
        "\n{} {}/{}",
        style("Files in").bold(),
        style(course).cyan(),
        style(domain).cyan()
    );
    println!("{}", "-".repeat(96));
    println!(
        "{:<26} {:<32} {:<11} {:<7} {:<5} Actions",
        "ID", "Name", "Uploaded", "Vector", "Root"
    );
    println!("{}", "-".repeat(96));
    for doc in &visible {
        let actions: Vec<_> = doc.actions().iter().map(|a| a.as_str()).collect();
        println!(
            "{:<26} {:<32} {:<11} {:<7} {:<5} {}",
            truncate(&doc.id, 25),
            truncate(&doc.name, 31),
            doc.date_str,
            yes_no(doc.in_vector_store),
            yes_no(doc.is_root_blob),
            actions.join(", ")
        );
    }
    println!(
        "\n{} {} of {} file(s) shown",
        info(),
        visible.len(),
        documents.len()
    );
    Ok(())
}

/// Upload files, then move documents into the vector store.
pub async fn cmd_file_upload(
    ctx: &Context,
    course: String,
    domain: String,
    paths: &[PathBuf],
    chunking: ChunkingParams,
    video_description: Option<String>,
) -> anyhow::Result<()> {
    let user = ctx.principal()?.username().to_string();
    chunking.validate()?;
    let batch = IngestionBatch::from_paths(paths).await?;

    if !ctx.json {
        println!(
            "{} Uploading {} document(s) and {} video(s) to {}/{}",
            info(),
            batch.documents().len(),
            batch.videos().len(),
            course,
            domain
        );
        if batch.has_documents() {
            print_detail("Chunk size", chunking.chunk_size);
            print_detail("Overlap", chunking.overlap);
        }
    }

    let mut workflow = IngestionWorkflow::new(&ctx.api).with_chunking(chunking);
    if let Some(description) = video_description {
        workflow = workflow.with_video_description(description);
    }

    let target = IngestTarget {
        course,
        domain,
        user,
    };
    let report = if ctx.json {
        workflow
            .run(&target, &batch, &mut StageSpinner::hidden())
            .await?
    } else {
        let mut spinner = StageSpinner::new(IngestionWorkflow::<ApiClient>::plan(&batch).len())?;
        workflow.run(&target, &batch, &mut spinner).await?
    };

    ctx.cache.invalidate_all(&[
        RefreshKey::files(&target.course, &target.domain),
        RefreshKey::Activities,
    ]);

    if ctx.json {
        let stages: Vec<_> = report
            .stages
            .iter()
            .map(|s| serde_json::json!({ "stage": s.stage.label(), "message": s.message }))
            .collect();
        return print_json(&serde_json::json!({
            "documents": report.documents,
            "videos": report.videos,
            "stages": stages,
        }));
    }

    if batch.has_documents() {
        cmd_file_list(ctx, &target.course, &target.domain, &FileFilter::default()).await?;
    }
    Ok(())
}

pub async fn cmd_file_delete(
    ctx: &Context,
    course: String,
    domain: String,
    file_id: &str,
    blob_only: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let file = find_document(ctx, &course, &domain, file_id).await?;
    let action = if blob_only {
        PendingAction::DeleteBlob {
            course: course.clone(),
            domain: domain.clone(),
            file,
        }
    } else {
        PendingAction::DeleteFile {
            course: course.clone(),
            domain: domain.clone(),
            file,
        }
    };

    if ctx.run_action(action, yes).await?.is_some() && !ctx.json {
        cmd_file_list(ctx, &course, &domain, &FileFilter::default()).await?;
    }
    Ok(())
}

pub async fn cmd_file_move(
    ctx: &Context,
    course: String,
    domain: String,
    file_id: &str,
    chunking: ChunkingParams,
) -> anyhow::Result<()> {
    let file = find_document(ctx, &course, &domain, file_id).await?;
    let action = PendingAction::MoveToVectorStore {
        course: course.clone(),
        domain: domain.clone(),
        file,
        chunking,
    };

    if ctx.run_action(action, true).await?.is_some() && !ctx.json {
        cmd_file_list(ctx, &course, &domain, &FileFilter::default()).await?;
    }
    Ok(())
}
