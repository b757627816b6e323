mod helpers;

use captioning::{
    CaptioningError, build_batch_input, collect_results, read_caption_table, run_batch,
};
use color_eyre::Result;
use helpers::{FakeService, OUTPUT_FILE_ID, Workspace, svg};
use language_model::{BatchJob, BatchRequestLine, BatchStatus};
use rasterize::Rasterizer;
use std::fs;
use std::sync::atomic::Ordering;

fn rasterizer(workspace: &Workspace) -> Rasterizer {
    Rasterizer::new(workspace.settings.ingest.raster_folder.clone())
}

#[tokio::test]
async fn builds_one_request_line_per_renderable_image() -> Result<()> {
    // ARRANGE
    let workspace = Workspace::new()?;
    workspace.add_image("apple.svg", &svg(48, 32, "#00aa00"))?;
    workspace.add_image("broken.svg", "<svg this is not")?;
    workspace.add_image("pear.svg", &svg(32, 48, "#99cc33"))?;

    // ACT
    let input = build_batch_input(&workspace.settings, &rasterizer(&workspace)).await?;

    // ASSERT
    assert_eq!(input.failed_items, vec!["broken.svg"]);
    assert_eq!(input.requests.len(), 2);
    assert!(input.requests[0].custom_id.starts_with("apple-"));
    assert!(input.requests[1].custom_id.starts_with("pear-"));
    assert_ne!(input.requests[0].custom_id, input.requests[1].custom_id);

    let written = fs::read_to_string(&workspace.settings.batch.input_file)?;
    let preview = fs::read_to_string(&workspace.settings.batch.debug_preview_file)?;
    assert_eq!(written, preview);

    let lines: Vec<BatchRequestLine> = written
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].custom_id, input.requests[0].custom_id);
    assert_eq!(lines[0].url, "/v1/chat/completions");
    assert_eq!(lines[0].body.model, "gpt-4o");
    assert_eq!(lines[0].body.max_tokens, Some(50));

    assert_eq!(workspace.leftover_rasters()?, 0);
    Ok(())
}

#[tokio::test]
async fn tiny_rasters_are_left_out() -> Result<()> {
    // ARRANGE
    let mut workspace = Workspace::new()?;
    workspace.settings.ingest.min_raster_bytes = 1_000_000;
    workspace.add_image("dot.svg", &svg(4, 4, "#000000"))?;
    let service = FakeService::new();

    // ACT
    let result = run_batch(&service, &workspace.settings, &rasterizer(&workspace)).await;

    // ASSERT
    assert!(matches!(result, Err(CaptioningError::NothingToSubmit)));
    assert_eq!(service.uploaded(), None);
    assert_eq!(workspace.leftover_rasters()?, 0);
    Ok(())
}

#[tokio::test]
async fn completed_batch_becomes_a_table() -> Result<()> {
    // ARRANGE
    let workspace = Workspace::new()?;
    workspace.add_image("apple.svg", &svg(48, 32, "#00aa00"))?;
    workspace.add_image("pear.svg", &svg(32, 48, "#99cc33"))?;
    let service = FakeService::new().with_statuses(&[
        BatchStatus::InProgress,
        BatchStatus::Finalizing,
        BatchStatus::Completed,
    ]);

    // ACT
    let report = run_batch(&service, &workspace.settings, &rasterizer(&workspace)).await?;

    // ASSERT
    assert_eq!(report.batch_id, "batch_test");
    assert!(report.failed_items.is_empty());
    assert_eq!(service.status_calls.load(Ordering::SeqCst), 3);

    let uploaded = service.uploaded().unwrap_or_default();
    assert_eq!(uploaded.lines().count(), 2);

    assert_eq!(report.rows.len(), 2);
    assert!(report.rows[0].image_name.starts_with("apple-"));
    assert_eq!(
        report.rows[0].caption,
        format!("Imagen de {}", report.rows[0].image_name)
    );

    let table_bytes = fs::read(&workspace.settings.batch.output_table)?;
    assert!(table_bytes.starts_with(b"\xEF\xBB\xBF"));
    assert_eq!(
        read_caption_table(&workspace.settings.batch.output_table)?,
        report.rows
    );
    Ok(())
}

#[tokio::test]
async fn failed_batch_keeps_the_error_file() -> Result<()> {
    // ARRANGE
    let workspace = Workspace::new()?;
    workspace.add_image("apple.svg", &svg(48, 32, "#00aa00"))?;
    let errors = r#"{"custom_id": "apple-1a2b3c4d", "error": {"message": "invalid image"}}"#;
    let service = FakeService::new()
        .with_statuses(&[BatchStatus::InProgress, BatchStatus::Failed])
        .with_error_file(errors);

    // ACT
    let result = run_batch(&service, &workspace.settings, &rasterizer(&workspace)).await;

    // ASSERT
    assert!(matches!(
        result,
        Err(CaptioningError::BatchFailed {
            status: BatchStatus::Failed,
            ..
        })
    ));
    assert_eq!(fs::read_to_string(&workspace.settings.batch.error_file)?, errors);
    assert!(!workspace.settings.batch.output_table.exists());
    Ok(())
}

#[tokio::test]
async fn expired_batch_without_error_file() -> Result<()> {
    // ARRANGE
    let workspace = Workspace::new()?;
    let service = FakeService::new();
    let job = BatchJob {
        id: "batch_old".to_string(),
        status: BatchStatus::Expired,
        output_file_id: None,
        error_file_id: None,
        request_counts: None,
    };

    // ACT
    let result = collect_results(&service, &job, &workspace.settings.batch).await;

    // ASSERT
    assert!(matches!(result, Err(CaptioningError::BatchFailed { .. })));
    assert!(!workspace.settings.batch.error_file.exists());
    assert!(!workspace.settings.batch.output_table.exists());
    Ok(())
}

#[tokio::test]
async fn collected_captions_are_repaired_and_marked() -> Result<()> {
    // ARRANGE
    let workspace = Workspace::new()?;
    let output = [
        r#"{"custom_id": "nino-1a2b3c4d", "response": {"status_code": 200, "body": {"choices": [{"message": {"content": "Ni√±o con cami√≥n"}}]}}}"#,
        r#"{"custom_id": "star-5e6f7a8b", "response": {"status_code": 200, "body": {"choices": [{"message": {"content": "No puedo ver la imagen"}}]}}}"#,
    ]
    .join("\n");
    let service = FakeService::new().with_output(&output);
    let job = BatchJob {
        id: "batch_done".to_string(),
        status: BatchStatus::Completed,
        output_file_id: Some(OUTPUT_FILE_ID.to_string()),
        error_file_id: None,
        request_counts: None,
    };

    // ACT
    let rows = collect_results(&service, &job, &workspace.settings.batch).await?;

    // ASSERT
    assert_eq!(rows[0].image_name, "nino-1a2b3c4d");
    assert_eq!(rows[0].caption, "Niño con camión");
    assert_eq!(rows[1].caption, "[FALLBACK] No puedo ver la imagen");
    assert_eq!(
        read_caption_table(&workspace.settings.batch.output_table)?,
        rows
    );
    Ok(())
}

#[tokio::test]
async fn completed_batch_without_output_is_an_error() -> Result<()> {
    // ARRANGE
    let workspace = Workspace::new()?;
    let service = FakeService::new();
    let job = BatchJob {
        id: "batch_empty".to_string(),
        status: BatchStatus::Completed,
        output_file_id: None,
        error_file_id: None,
        request_counts: None,
    };

    // ACT
    let result = collect_results(&service, &job, &workspace.settings.batch).await;

    // ASSERT
    assert!(matches!(
        result,
        Err(CaptioningError::MissingOutputFile { .. })
    ));
    Ok(())
}
