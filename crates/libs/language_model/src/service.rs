use crate::api::{LanguageModelResult, OpenAiClient};
use crate::batch::{BatchJob, CreateBatchRequest, FileObject};
use async_trait::async_trait;
use std::path::Path;

/// The remote capabilities the captioning pipelines need.
///
/// Implemented by [`OpenAiClient`]; tests substitute scripted fakes.
#[async_trait]
pub trait CaptionService: Send + Sync {
    /// Ask for a caption of a single local image.
    async fn caption_image(&self, prompt: &str, image: &Path) -> LanguageModelResult<String>;

    /// Upload a JSONL batch input file.
    async fn upload_batch_input(&self, path: &Path) -> LanguageModelResult<FileObject>;

    async fn start_batch(&self, request: &CreateBatchRequest) -> LanguageModelResult<BatchJob>;

    async fn batch_status(&self, batch_id: &str) -> LanguageModelResult<BatchJob>;

    /// Text content of a remote file (batch output or error file).
    async fn download_file(&self, file_id: &str) -> LanguageModelResult<String>;
}

#[async_trait]
impl CaptionService for OpenAiClient {
    async fn caption_image(&self, prompt: &str, image: &Path) -> LanguageModelResult<String> {
        self.chat(prompt).images(&[image]).call().await
    }

    async fn upload_batch_input(&self, path: &Path) -> LanguageModelResult<FileObject> {
        self.upload_file(path, "batch").await
    }

    async fn start_batch(&self, request: &CreateBatchRequest) -> LanguageModelResult<BatchJob> {
        self.create_batch(request).await
    }

    async fn batch_status(&self, batch_id: &str) -> LanguageModelResult<BatchJob> {
        self.retrieve_batch(batch_id).await
    }

    async fn download_file(&self, file_id: &str) -> LanguageModelResult<String> {
        self.file_content(file_id).await
    }
}
