use language_model::{BatchStatus, LanguageModelError};
use rasterize::RasterizeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptioningError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to list source images: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Api(#[from] LanguageModelError),
    #[error(transparent)]
    Raster(#[from] RasterizeError),
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("Request {custom_id} does not survive a JSON round trip")]
    MalformedRequest { custom_id: String },
    #[error("No valid requests to submit")]
    NothingToSubmit,
    #[error("Batch {batch_id} completed without an output file")]
    MissingOutputFile { batch_id: String },
    #[error("Batch {batch_id} ended with status {status}")]
    BatchFailed {
        batch_id: String,
        status: BatchStatus,
    },
}

pub type CaptioningResult<T> = Result<T, CaptioningError>;
