use crate::{CaptionRow, CaptioningError, CaptioningResult, write_caption_table};
use app_state::BatchSettings;
use caption_filter::{Language, fix_mojibake, mark_fallback};
use language_model::{BatchJob, BatchResultLine, CaptionService};
use tokio::fs;
use tracing::{info, warn};

/// Turn the text of a batch output file into caption rows.
///
/// Captions are repaired for mojibake, then marked if they are fallback answers.
/// Lines that are blank or not valid JSON are skipped.
#[must_use]
pub fn parse_batch_output(text: &str, language: Language) -> Vec<CaptionRow> {
    let mut rows = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let result: BatchResultLine = match serde_json::from_str(line) {
            Ok(result) => result,
            Err(e) => {
                warn!("Skipping unparseable output line {}: {e}", index + 1);
                continue;
            }
        };
        let caption = fix_mojibake(result.caption().unwrap_or_default());
        rows.push(CaptionRow {
            image_name: result.custom_id.unwrap_or_default(),
            caption: mark_fallback(caption, language),
        });
    }
    rows
}

/// Fetch the outcome of a settled job.
///
/// On success the output file becomes the caption table. Otherwise the error
/// file, if the service produced one, is saved next to it and the job's status
/// is returned as an error.
pub async fn collect_results<S: CaptionService + ?Sized>(
    service: &S,
    job: &BatchJob,
    batch: &BatchSettings,
) -> CaptioningResult<Vec<CaptionRow>> {
    if !job.status.is_success() {
        warn!("Batch {} did not complete: {}", job.id, job.status);
        match &job.error_file_id {
            Some(error_file_id) => match service.download_file(error_file_id).await {
                Ok(errors) => {
                    fs::write(&batch.error_file, errors).await?;
                    warn!("Errors saved to {}", batch.error_file.display());
                }
                Err(e) => warn!("Could not download error file {error_file_id}: {e}"),
            },
            None => warn!("No error file returned."),
        }
        return Err(CaptioningError::BatchFailed {
            batch_id: job.id.clone(),
            status: job.status,
        });
    }

    let output_file_id =
        job.output_file_id
            .as_deref()
            .ok_or_else(|| CaptioningError::MissingOutputFile {
                batch_id: job.id.clone(),
            })?;
    let output = service.download_file(output_file_id).await?;
    let rows = parse_batch_output(&output, batch.language);

    write_caption_table(&batch.output_table, &rows, batch.write_bom)?;
    info!("✅ Results saved to {}", batch.output_table.display());
    Ok(rows)
}
