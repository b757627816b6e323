use crate::{CaptioningError, CaptioningResult, ImageItem, find_source_images, rasterize_checked};
use app_state::AppSettings;
use language_model::{
    BatchRequestLine, ChatRequest, ImageUrl, encode_data_url, user_message,
};
use rasterize::Rasterizer;
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

/// A request line ready to go into the batch input file.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub custom_id: String,
    pub line: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchInput {
    pub requests: Vec<PreparedRequest>,
    pub failed_items: Vec<String>,
}

/// Per-request identifier: the image stem plus a short random suffix, so two
/// runs over the same folder never share ids.
#[must_use]
pub fn correlation_id(stem: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{stem}-{}", &suffix[..8])
}

/// Serialize a request line and make sure it parses back to the same request.
pub fn serialize_checked(request: &BatchRequestLine) -> CaptioningResult<String> {
    let line = serde_json::to_string(request)?;
    let parsed: BatchRequestLine = serde_json::from_str(&line)?;
    if &parsed != request {
        return Err(CaptioningError::MalformedRequest {
            custom_id: request.custom_id.clone(),
        });
    }
    Ok(line)
}

async fn prepare_request(
    item: &ImageItem,
    settings: &AppSettings,
    rasterizer: &Rasterizer,
) -> CaptioningResult<PreparedRequest> {
    let raster = rasterize_checked(
        rasterizer,
        &item.path,
        Some(settings.ingest.min_raster_bytes),
    )
    .await?;
    let bytes = fs::read(raster.path()).await;
    if let Err(e) = raster.close() {
        warn!("Could not remove raster for {}: {e}", item.name);
    }
    let bytes = bytes?;

    let body = ChatRequest {
        model: settings.captioning.model.clone(),
        messages: vec![user_message(
            &settings.captioning.prompt,
            vec![ImageUrl {
                url: encode_data_url(&bytes),
                detail: None,
            }],
        )],
        max_tokens: Some(settings.captioning.max_tokens),
    };
    let custom_id = correlation_id(&item.stem());
    let request = BatchRequestLine::post(custom_id.clone(), &settings.batch.endpoint, body);
    let line = serialize_checked(&request)?;

    Ok(PreparedRequest {
        custom_id,
        line,
    })
}

/// Turn every source image into one request line of the batch input file.
///
/// Images that fail to render, or render suspiciously small, are left out and
/// reported in [`BatchInput::failed_items`]. The input file and its debug copy
/// are written even when no request survived.
pub async fn build_batch_input(
    settings: &AppSettings,
    rasterizer: &Rasterizer,
) -> CaptioningResult<BatchInput> {
    let items = find_source_images(&settings.ingest)?;
    info!("🚀 Preparing batch requests for {} images", items.len());

    let mut input = BatchInput::default();
    for item in &items {
        match prepare_request(item, settings, rasterizer).await {
            Ok(request) => input.requests.push(request),
            Err(e) => {
                warn!("Skipping {}: {e}", item.name);
                input.failed_items.push(item.name.clone());
            }
        }
    }

    let mut contents = String::new();
    for request in &input.requests {
        contents.push_str(&request.line);
        contents.push('\n');
    }
    fs::write(&settings.batch.input_file, &contents).await?;
    fs::write(&settings.batch.debug_preview_file, &contents).await?;

    info!(
        "Wrote {} requests to {}",
        input.requests.len(),
        settings.batch.input_file.display()
    );
    if !input.failed_items.is_empty() {
        warn!(
            "Skipped {} images, check them manually: {}",
            input.failed_items.len(),
            input.failed_items.join(", ")
        );
    }
    Ok(input)
}
