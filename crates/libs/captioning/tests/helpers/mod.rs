#![allow(dead_code)]

use app_state::AppSettings;
use async_trait::async_trait;
use language_model::{
    BatchJob, BatchRequestLine, BatchStatus, CaptionService, CreateBatchRequest, FileObject,
    LanguageModelError, LanguageModelResult,
};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

pub const OUTPUT_FILE_ID: &str = "file-output";
pub const ERROR_FILE_ID: &str = "file-errors";

pub fn svg(width: u32, height: u32, fill: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}">
            <rect width="{width}" height="{height}" fill="{fill}"/>
            <circle cx="{}" cy="{}" r="{}" fill="white"/>
        </svg>"#,
        width / 2,
        height / 2,
        width.min(height) / 3
    )
}

/// A scratch workspace: image folder, raster folder and output paths under one tempdir.
pub struct Workspace {
    pub dir: TempDir,
    pub settings: AppSettings,
}

impl Workspace {
    pub fn new() -> color_eyre::Result<Self> {
        let dir = tempfile::tempdir()?;
        let images = dir.path().join("images");
        let rasters = dir.path().join("rasters");
        fs::create_dir_all(&images)?;
        fs::create_dir_all(&rasters)?;

        let mut settings = AppSettings::default();
        settings.ingest.image_folder = images;
        settings.ingest.raster_folder = Some(rasters);
        settings.ingest.min_raster_bytes = 1;
        settings.sync.retry_delay_ms = 0;
        settings.sync.workers = 2;
        settings.sync.output_table = dir.path().join("sync.csv");
        settings.batch.input_file = dir.path().join("batchinput.jsonl");
        settings.batch.debug_preview_file = dir.path().join("debug_batch_preview.jsonl");
        settings.batch.error_file = dir.path().join("batch_errors.jsonl");
        settings.batch.output_table = dir.path().join("batch.csv");
        settings.batch.poll_interval_secs = 0;
        Ok(Self { dir, settings })
    }

    pub fn add_image(&self, name: &str, contents: &str) -> color_eyre::Result<PathBuf> {
        let path = self.settings.ingest.image_folder.join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn raster_folder(&self) -> &Path {
        self.settings
            .ingest
            .raster_folder
            .as_deref()
            .unwrap_or_else(|| self.dir.path())
    }

    pub fn leftover_rasters(&self) -> color_eyre::Result<usize> {
        Ok(fs::read_dir(self.raster_folder())?.count())
    }
}

/// A [`CaptionService`] that answers from scripts instead of the network.
///
/// Captions are popped from `captions` while it has entries, after that every
/// image is described as `A picture of {stem}`. Batch statuses are popped one per
/// poll; the last one sticks.
#[derive(Default)]
pub struct FakeService {
    captions: Mutex<VecDeque<LanguageModelResult<String>>>,
    statuses: Mutex<VecDeque<BatchStatus>>,
    output: Mutex<Option<String>>,
    error_file: Option<String>,
    uploaded: Mutex<Option<String>>,
    pub caption_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub missing_rasters: AtomicUsize,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_captions(self, captions: Vec<LanguageModelResult<String>>) -> Self {
        *self.captions.lock().expect("lock") = captions.into();
        self
    }

    pub fn with_statuses(self, statuses: &[BatchStatus]) -> Self {
        *self.statuses.lock().expect("lock") = statuses.iter().copied().collect();
        self
    }

    pub fn with_output(self, output: &str) -> Self {
        *self.output.lock().expect("lock") = Some(output.to_string());
        self
    }

    pub fn with_error_file(mut self, contents: &str) -> Self {
        self.error_file = Some(contents.to_string());
        self
    }

    pub fn uploaded(&self) -> Option<String> {
        self.uploaded.lock().expect("lock").clone()
    }

    pub fn calls(&self) -> usize {
        self.caption_calls.load(Ordering::SeqCst)
    }

    fn job(&self, status: BatchStatus) -> BatchJob {
        BatchJob {
            id: "batch_test".to_string(),
            status,
            output_file_id: status.is_success().then(|| OUTPUT_FILE_ID.to_string()),
            error_file_id: self
                .error_file
                .as_ref()
                .filter(|_| status.is_terminal() && !status.is_success())
                .map(|_| ERROR_FILE_ID.to_string()),
            request_counts: None,
        }
    }

    /// Output file that answers every uploaded request with `Imagen de {custom_id}`.
    fn echo_output(&self) -> String {
        let uploaded = self.uploaded().unwrap_or_default();
        uploaded
            .lines()
            .filter_map(|line| serde_json::from_str::<BatchRequestLine>(line).ok())
            .map(|request| {
                serde_json::json!({
                    "custom_id": request.custom_id,
                    "response": {
                        "status_code": 200,
                        "body": {"choices": [{"message": {"content": format!("Imagen de {}", request.custom_id)}}]}
                    },
                    "error": null
                })
                .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn stem_of_raster(image: &Path) -> String {
    let name = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.rsplit_once('-')
        .map_or(name.clone(), |(stem, _)| stem.to_string())
}

#[async_trait]
impl CaptionService for FakeService {
    async fn caption_image(&self, _prompt: &str, image: &Path) -> LanguageModelResult<String> {
        self.caption_calls.fetch_add(1, Ordering::SeqCst);
        if !image.exists() {
            self.missing_rasters.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(scripted) = self.captions.lock().expect("lock").pop_front() {
            return scripted;
        }
        Ok(format!("A picture of {}", stem_of_raster(image)))
    }

    async fn upload_batch_input(&self, path: &Path) -> LanguageModelResult<FileObject> {
        let contents = tokio::fs::read_to_string(path).await?;
        *self.uploaded.lock().expect("lock") = Some(contents);
        Ok(FileObject {
            id: "file-input".to_string(),
            bytes: None,
            filename: None,
            purpose: Some("batch".to_string()),
        })
    }

    async fn start_batch(&self, request: &CreateBatchRequest) -> LanguageModelResult<BatchJob> {
        assert_eq!(request.input_file_id, "file-input");
        Ok(self.job(BatchStatus::Validating))
    }

    async fn batch_status(&self, _batch_id: &str) -> LanguageModelResult<BatchJob> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let mut statuses = self.statuses.lock().expect("lock");
        let status = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().copied()
        }
        .unwrap_or(BatchStatus::Completed);
        drop(statuses);
        Ok(self.job(status))
    }

    async fn download_file(&self, file_id: &str) -> LanguageModelResult<String> {
        match file_id {
            OUTPUT_FILE_ID => {
                let scripted = self.output.lock().expect("lock").clone();
                Ok(scripted.unwrap_or_else(|| self.echo_output()))
            }
            ERROR_FILE_ID => Ok(self.error_file.clone().unwrap_or_default()),
            other => Err(LanguageModelError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such file {other}"),
            ))),
        }
    }
}
