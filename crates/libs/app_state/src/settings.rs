use caption_filter::Language;
use language_model::{CHAT_COMPLETIONS_PATH, DEFAULT_BASE_URL, ImageDetail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PROMPT: &str = "Describe the image in the context of a kid website for \
accessibility giving one word or max 6 words saying what the object is including numbers. \
Don't say emojis.";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppSettings {
    pub ingest: IngestSettings,
    pub captioning: CaptioningSettings,
    pub sync: SyncSettings,
    pub batch: BatchSettings,
    pub logging: LoggingSettings,
}

/// Where the source images come from and where transient rasters go.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IngestSettings {
    /// Folder with the source SVG files. Not searched recursively.
    pub image_folder: PathBuf,
    /// Extension of eligible source files, without the dot.
    pub extension: String,
    /// Scratch folder for transient PNGs. System temp dir if unset.
    pub raster_folder: Option<PathBuf>,
    /// PNGs smaller than this are treated as corrupt renders (bulk mode).
    pub min_raster_bytes: u64,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            image_folder: PathBuf::from("files/test_set/"),
            extension: "svg".to_string(),
            raster_folder: None,
            min_raster_bytes: 1000,
        }
    }
}

impl IngestSettings {
    #[must_use]
    pub fn is_source_file(&self, file: &Path) -> bool {
        let Some(extension) = file.extension().map(|e| e.to_string_lossy().to_lowercase()) else {
            return false;
        };
        extension == self.extension.to_lowercase()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CaptioningSettings {
    pub api_base_url: String,
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
}

impl Default for CaptioningSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            model: "gpt-4o".to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            max_tokens: 50,
        }
    }
}

/// One request per image, fanned out over a bounded number of workers.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SyncSettings {
    pub language: Language,
    pub workers: usize,
    /// Extra attempts after the first one.
    pub retries: u32,
    pub retry_delay_ms: u64,
    pub image_detail: Option<ImageDetail>,
    pub output_table: PathBuf,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            language: Language::English,
            workers: 5,
            retries: 2,
            retry_delay_ms: 1000,
            image_detail: Some(ImageDetail::Low),
            output_table: PathBuf::from("ai_caption_results.csv"),
        }
    }
}

impl SyncSettings {
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// All images in one uploaded batch job.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BatchSettings {
    pub language: Language,
    pub input_file: PathBuf,
    /// Copy of the input file kept for inspection.
    pub debug_preview_file: PathBuf,
    /// Where the service's error file is saved when a job does not complete.
    pub error_file: PathBuf,
    pub output_table: PathBuf,
    pub endpoint: String,
    pub completion_window: String,
    pub poll_interval_secs: u64,
    /// Start the output table with a UTF-8 byte order mark, for spreadsheet apps.
    pub write_bom: bool,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            language: Language::Spanish,
            input_file: PathBuf::from("batchinput.jsonl"),
            debug_preview_file: PathBuf::from("debug_batch_preview.jsonl"),
            error_file: PathBuf::from("batch_errors.jsonl"),
            output_table: PathBuf::from("ai_caption_results_batch.csv"),
            endpoint: CHAT_COMPLETIONS_PATH.to_string(),
            completion_window: "24h".to_string(),
            poll_interval_secs: 30,
            write_bom: true,
        }
    }
}

impl BatchSettings {
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
