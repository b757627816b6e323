use crate::{
    CaptionPipeline, CaptionRow, CaptioningResult, PipelineOptions, find_source_images,
    write_caption_table,
};
use app_state::AppSettings;
use futures_util::{StreamExt, future, stream};
use language_model::CaptionService;
use rasterize::Rasterizer;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Clone)]
pub struct SyncReport {
    /// One row per image that could be rendered, in input order.
    pub rows: Vec<CaptionRow>,
    pub discovered: usize,
    pub elapsed: Duration,
}

impl SyncReport {
    #[must_use]
    pub fn average_per_image(&self) -> Duration {
        if self.rows.is_empty() {
            return Duration::ZERO;
        }
        self.elapsed.div_f64(self.rows.len() as f64)
    }
}

/// Caption every source image with one request each, at most `sync.workers` in flight.
///
/// Images that fail to render are skipped. The table is written even if no row survived.
pub async fn run_sync<S: CaptionService + ?Sized>(
    service: &S,
    settings: &AppSettings,
    rasterizer: Rasterizer,
) -> CaptioningResult<SyncReport> {
    let items = find_source_images(&settings.ingest)?;
    info!(
        "🚀 Captioning {} images with {} workers",
        items.len(),
        settings.sync.workers
    );

    let start = Instant::now();
    let pipeline = CaptionPipeline::new(service, rasterizer, PipelineOptions::from(settings));
    let rows: Vec<CaptionRow> = stream::iter(&items)
        .map(|item| pipeline.process_image(item))
        .buffered(settings.sync.workers.max(1))
        .filter_map(future::ready)
        .collect()
        .await;

    let report = SyncReport {
        rows,
        discovered: items.len(),
        elapsed: start.elapsed(),
    };
    info!(
        "Captioned {}/{} images in {:.2}s ({:.2}s per image)",
        report.rows.len(),
        report.discovered,
        report.elapsed.as_secs_f64(),
        report.average_per_image().as_secs_f64()
    );

    write_caption_table(&settings.sync.output_table, &report.rows, false)?;
    info!("✅ Results saved to {}", settings.sync.output_table.display());
    Ok(report)
}
