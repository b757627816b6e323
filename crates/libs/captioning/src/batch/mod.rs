mod build;
mod collect;
mod submit;

pub use build::*;
pub use collect::*;
pub use submit::*;

use crate::{CaptionRow, CaptioningError, CaptioningResult};
use app_state::AppSettings;
use language_model::CaptionService;
use rasterize::Rasterizer;
use tracing::info;

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub batch_id: String,
    pub rows: Vec<CaptionRow>,
    /// Source images that could not be turned into a request.
    pub failed_items: Vec<String>,
}

/// Build the batch input, submit it, wait for the job to settle and collect the table.
pub async fn run_batch<S: CaptionService + ?Sized>(
    service: &S,
    settings: &AppSettings,
    rasterizer: &Rasterizer,
) -> CaptioningResult<BatchReport> {
    let input = build_batch_input(settings, rasterizer).await?;
    if input.requests.is_empty() {
        return Err(CaptioningError::NothingToSubmit);
    }

    let job = submit_batch(service, &settings.batch).await?;
    let job = wait_for_completion(service, &job.id, settings.batch.poll_interval()).await?;
    let rows = collect_results(service, &job, &settings.batch).await?;
    info!("Batch {} produced {} captions", job.id, rows.len());

    Ok(BatchReport {
        batch_id: job.id,
        rows,
        failed_items: input.failed_items,
    })
}
