use crate::CaptioningResult;
use app_state::BatchSettings;
use language_model::{BatchJob, CaptionService, CreateBatchRequest};
use std::time::Duration;
use tracing::info;

/// Upload the batch input file and start a job over it.
pub async fn submit_batch<S: CaptionService + ?Sized>(
    service: &S,
    batch: &BatchSettings,
) -> CaptioningResult<BatchJob> {
    let file = service.upload_batch_input(&batch.input_file).await?;
    info!("Uploaded batch input as {}", file.id);

    let job = service
        .start_batch(&CreateBatchRequest {
            input_file_id: file.id,
            endpoint: batch.endpoint.clone(),
            completion_window: batch.completion_window.clone(),
        })
        .await?;
    info!("📦 Created batch {} ({})", job.id, job.status);
    Ok(job)
}

/// Poll the job until it reaches a terminal status.
///
/// There is no upper bound: a batch may legitimately run for its whole completion window.
pub async fn wait_for_completion<S: CaptionService + ?Sized>(
    service: &S,
    batch_id: &str,
    poll_interval: Duration,
) -> CaptioningResult<BatchJob> {
    loop {
        let job = service.batch_status(batch_id).await?;
        info!("Status: {}", job.status);
        if job.status.is_terminal() {
            return Ok(job);
        }
        tokio::time::sleep(poll_interval).await;
    }
}
