use app_state::{load_app_settings_from, require_api_key};
use captioner::{Args, build_client, init_tracing};
use captioning::run_sync;
use clap::Parser;
use color_eyre::Result;
use rasterize::Rasterizer;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let settings = load_app_settings_from(&args.config)?;
    init_tracing(&settings.logging.level);

    let api_key = require_api_key()?;
    let client = build_client(&settings, api_key, settings.sync.image_detail);
    let rasterizer = Rasterizer::new(settings.ingest.raster_folder.clone());

    run_sync(&client, &settings, rasterizer).await?;

    Ok(())
}
