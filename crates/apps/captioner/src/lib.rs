use app_state::{AppSettings, DEFAULT_CONFIG_PATH};
use clap::Parser;
use language_model::{ImageDetail, OpenAiClient};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Settings file, overridden by `APP__SECTION__KEY` environment variables.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

/// `RUST_LOG` wins over the configured level.
pub fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{level},hyper=warn,reqwest=warn").into()),
        )
        .with(fmt::layer().with_target(false))
        .init();
}

#[must_use]
pub fn build_client(
    settings: &AppSettings,
    api_key: String,
    image_detail: Option<ImageDetail>,
) -> OpenAiClient {
    OpenAiClient::with_base_url(&settings.captioning.api_base_url)
        .api_key(api_key)
        .model(settings.captioning.model.clone())
        .max_tokens(settings.captioning.max_tokens)
        .maybe_image_detail(image_detail)
        .build()
}
