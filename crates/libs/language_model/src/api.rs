use base64::{Engine as _, engine::general_purpose};
use bon::bon;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

use crate::batch::{BatchJob, CreateBatchRequest, FileObject};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

#[derive(Error, Debug)]
pub enum LanguageModelError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("API error (status {status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

pub type LanguageModelResult<T> = Result<T, LanguageModelError>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: MessageContent,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<MessagePart>),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum MessagePart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImageUrl {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ImageDetail>,
}

/// Resolution the vision model looks at the image with.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Low,
    High,
    Auto,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ChatFullResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<FullChoice>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FullChoice {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: FullMessage,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct FullMessage {
    pub content: Option<String>,
}

impl ChatFullResponse {
    /// Content of the first choice, if the model returned any.
    #[must_use]
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

/// Treat an explicit `null` like a missing field. Failed batch lines use both.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Encode raw image bytes as a `data:` URL, sniffing the mime type from the bytes.
#[must_use]
pub fn encode_data_url(bytes: &[u8]) -> String {
    let mime_type = infer::get(bytes).map_or("image/png", |kind| kind.mime_type());
    let b64 = general_purpose::STANDARD.encode(bytes);
    format!("data:{mime_type};base64,{b64}")
}

/// A single user message with a text prompt followed by the given images.
#[must_use]
pub fn user_message(prompt: &str, images: Vec<ImageUrl>) -> Message {
    let mut parts = vec![MessagePart::Text {
        text: prompt.to_string(),
    }];
    parts.extend(
        images
            .into_iter()
            .map(|image_url| MessagePart::ImageUrl { image_url }),
    );
    Message {
        role: "user".to_string(),
        content: MessageContent::Parts(parts),
    }
}

#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    pub max_tokens: Option<u32>,
    pub image_detail: Option<ImageDetail>,
}

/// Client for an OpenAI compatible API: chat completions, files and batches.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    config: OpenAiConfig,
}

#[bon]
impl OpenAiClient {
    #[builder(start_fn = with_base_url)]
    #[must_use]
    pub fn new(
        #[builder(start_fn)] base_url: &str,
        api_key: String,
        model: Option<String>,
        max_tokens: Option<u32>,
        image_detail: Option<ImageDetail>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.unwrap_or_else(|| "gpt-4o".to_string()),
            config: OpenAiConfig {
                max_tokens,
                image_detail,
            },
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn prepare_messages(&self, prompt: &str, images: &[&Path]) -> LanguageModelResult<Message> {
        let mut image_urls = Vec::with_capacity(images.len());
        for path in images {
            let bytes = fs::read(path).await?;
            image_urls.push(ImageUrl {
                url: encode_data_url(&bytes),
                detail: self.config.image_detail,
            });
        }
        Ok(user_message(prompt, image_urls))
    }

    #[builder]
    pub async fn chat(
        &self,
        #[builder(start_fn)] prompt: &str,
        images: Option<&[&Path]>,
    ) -> LanguageModelResult<String> {
        let msg = self
            .prepare_messages(prompt, images.unwrap_or_default())
            .await?;
        self.call(vec![msg]).await
    }

    pub async fn call(&self, messages: Vec<Message>) -> LanguageModelResult<String> {
        let req_body = self.build_request(messages);
        let response = self
            .http
            .post(self.url(CHAT_COMPLETIONS_PATH))
            .bearer_auth(&self.api_key)
            .json(&req_body)
            .send()
            .await?;
        let response = check_status(response).await?;
        let full: ChatFullResponse = response.json().await?;
        Ok(full.first_content().unwrap_or_default().to_string())
    }

    #[must_use]
    pub fn build_request(&self, messages: Vec<Message>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
        }
    }

    /// Upload a file, e.g. a JSONL batch input with purpose `batch`.
    pub async fn upload_file(&self, path: &Path, purpose: &str) -> LanguageModelResult<FileObject> {
        let bytes = fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload.jsonl".to_string(), |n| n.to_string_lossy().into_owned());
        debug!("Uploading {} ({} bytes)", file_name, bytes.len());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/jsonl")?;
        let form = Form::new()
            .text("purpose", purpose.to_string())
            .part("file", part);
        let response = self
            .http
            .post(self.url("/v1/files"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    pub async fn create_batch(&self, request: &CreateBatchRequest) -> LanguageModelResult<BatchJob> {
        let response = self
            .http
            .post(self.url("/v1/batches"))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    pub async fn retrieve_batch(&self, batch_id: &str) -> LanguageModelResult<BatchJob> {
        let response = self
            .http
            .get(self.url(&format!("/v1/batches/{batch_id}")))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Raw text content of an uploaded or generated file.
    pub async fn file_content(&self, file_id: &str) -> LanguageModelResult<String> {
        let response = self
            .http
            .get(self.url(&format!("/v1/files/{file_id}/content")))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.text().await?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn check_status(response: reqwest::Response) -> LanguageModelResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    Err(LanguageModelError::Api {
        status: response.status(),
        body: response.text().await.unwrap_or_default(),
    })
}
