#![allow(clippy::missing_errors_doc)]

use color_eyre::eyre::{Result, eyre};
use language_model::{ImageDetail, OpenAiClient};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Caption one PNG: `cargo run --example caption_file -- path/to/image.png`
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    color_eyre::install()?;

    let image = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| eyre!("usage: caption_file <image.png>"))?;
    let api_key = std::env::var("OPENAI_API_KEY")?;

    let client = OpenAiClient::with_base_url("https://api.openai.com")
        .api_key(api_key)
        .max_tokens(50)
        .image_detail(ImageDetail::Low)
        .build();

    let now = Instant::now();
    let caption = client
        .chat("Describe the image in at most six words.")
        .images(&[image.as_path()])
        .call()
        .await?;
    info!("{}: {caption} ({:?})", image.display(), now.elapsed());

    Ok(())
}
