use crate::{CaptionRow, CaptioningResult, ImageItem};
use app_state::AppSettings;
use caption_filter::{Language, is_fallback_caption};
use language_model::CaptionService;
use rasterize::{Rasterizer, TransientRaster, validate_png};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Caption used when every attempt returned an error or a fallback answer.
pub const RETRY_SENTINEL: &str = "Model failed to describe this image after retries.";

/// Render an SVG to a transient PNG off the async runtime and check it is a usable PNG.
///
/// With `min_bytes`, rasters below that size are rejected as corrupt renders.
/// On any error the raster is already gone from disk.
pub async fn rasterize_checked(
    rasterizer: &Rasterizer,
    svg_path: &Path,
    min_bytes: Option<u64>,
) -> CaptioningResult<TransientRaster> {
    let rasterizer = rasterizer.clone();
    let svg_path: PathBuf = svg_path.to_path_buf();
    let raster = tokio::task::spawn_blocking(move || {
        let raster = rasterizer.rasterize(&svg_path)?;
        validate_png(raster.path())?;
        if let Some(min_bytes) = min_bytes {
            raster.ensure_min_size(min_bytes)?;
        }
        Ok::<_, rasterize::RasterizeError>(raster)
    })
    .await??;
    Ok(raster)
}

/// What the per-image pipeline needs to know, pulled out of [`AppSettings`].
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub prompt: String,
    pub language: Language,
    pub retries: u32,
    pub retry_delay: Duration,
}

impl From<&AppSettings> for PipelineOptions {
    fn from(settings: &AppSettings) -> Self {
        Self {
            prompt: settings.captioning.prompt.clone(),
            language: settings.sync.language,
            retries: settings.sync.retries,
            retry_delay: settings.sync.retry_delay(),
        }
    }
}

/// Convert one image, request one caption, clean up the raster.
pub struct CaptionPipeline<'a, S: CaptionService + ?Sized> {
    service: &'a S,
    rasterizer: Rasterizer,
    options: PipelineOptions,
}

impl<'a, S: CaptionService + ?Sized> CaptionPipeline<'a, S> {
    pub const fn new(service: &'a S, rasterizer: Rasterizer, options: PipelineOptions) -> Self {
        Self {
            service,
            rasterizer,
            options,
        }
    }

    /// Handle the full process for a single image.
    ///
    /// Returns `None` when the image cannot be rendered to a valid PNG. Request
    /// failures never drop the row; they end in [`RETRY_SENTINEL`].
    pub async fn process_image(&self, item: &ImageItem) -> Option<CaptionRow> {
        let raster = match rasterize_checked(&self.rasterizer, &item.path, None).await {
            Ok(raster) => raster,
            Err(e) => {
                warn!("Error converting {}: {e}", item.name);
                return None;
            }
        };

        let caption = self.request_caption(raster.path()).await;

        if let Err(e) = raster.close() {
            warn!("Could not remove raster for {}: {e}", item.name);
        }
        debug!("{}: {caption}", item.name);

        Some(CaptionRow {
            image_name: item.name.clone(),
            caption,
        })
    }

    /// Request a caption, retrying errors and fallback answers with a fixed delay.
    pub async fn request_caption(&self, image: &Path) -> String {
        let attempts = self.options.retries + 1;
        for attempt in 1..=attempts {
            match self.service.caption_image(&self.options.prompt, image).await {
                Ok(caption) => {
                    let caption = caption.trim();
                    if !is_fallback_caption(caption, self.options.language) {
                        return caption.to_string();
                    }
                    warn!("Fallback response (attempt {attempt}): {caption}");
                }
                Err(e) => warn!("Error on attempt {attempt}: {e}"),
            }
            if attempt < attempts {
                sleep(self.options.retry_delay).await;
            }
        }
        RETRY_SENTINEL.to_string()
    }
}
