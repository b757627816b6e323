use app_state::{load_app_settings_from, require_api_key};
use captioner::{Args, build_client, init_tracing};
use captioning::run_batch;
use clap::Parser;
use color_eyre::Result;
use rasterize::Rasterizer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let settings = load_app_settings_from(&args.config)?;
    init_tracing(&settings.logging.level);

    let api_key = require_api_key()?;
    let client = build_client(&settings, api_key, None);
    let rasterizer = Rasterizer::new(settings.ingest.raster_folder.clone());

    let report = run_batch(&client, &settings, &rasterizer).await?;
    info!(
        "Batch {} done: {} captions, {} images skipped",
        report.batch_id,
        report.rows.len(),
        report.failed_items.len()
    );

    Ok(())
}
