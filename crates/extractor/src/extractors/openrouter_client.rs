use crate::error::GatewayError;
use crate::extractors::preprocessor::Preprocessor;
use crate::traits::ModelGateway;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

type Result<T> = std::result::Result<T, GatewayError>;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-r1:free";

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RemoteModel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub context_length: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RemoteModelsResponse {
    pub data: Vec<RemoteModel>,
}

/// Client for the OpenRouter chat completions API
pub struct OpenRouterClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenRouterClient {
    /// Create a new OpenRouter client
    ///
    /// # Arguments
    /// * `base_url` - API root (e.g., "https://openrouter.ai/api/v1")
    /// * `api_key` - Bearer token sent with every request
    /// * `model` - Model name (e.g., "deepseek/deepseek-r1:free")
    pub fn new(base_url: String, api_key: String, model: String) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    pub fn with_defaults(api_key: String) -> Result<Self> {
        Self::new(
            DEFAULT_BASE_URL.to_string(),
            api_key,
            DEFAULT_MODEL.to_string(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(
        &self,
        image_base64: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> ChatCompletionRequest {
        let data_url = format!(
            "data:{};base64,{}",
            Preprocessor::mime_from_base64(image_base64),
            image_base64
        );

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(system_prompt.to_string()),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::Text {
                            text: user_prompt.to_string(),
                        },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl { url: data_url },
                        },
                    ]),
                },
            ],
            temperature: Some(0.0),
        }
    }

    /// List models available to this API key
    pub async fn list_models(&self) -> Result<Vec<RemoteModel>> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status { status, body });
        }

        let models: RemoteModelsResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Format(format!("Failed to parse models response: {}", e)))?;

        Ok(models.data)
    }
}

#[async_trait::async_trait]
impl ModelGateway for OpenRouterClient {
    async fn send_image_for_ocr(
        &self,
        image_base64: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String> {
        let request = self.build_request(image_base64, system_prompt, user_prompt);

        tracing::info!(
            "Sending OCR request (model: {}, image: {} base64 chars)",
            self.model,
            image_base64.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Model API returned status {}", status);
            return Err(GatewayError::Status { status, body });
        }

        let body = response.text().await?;
        let content = parse_completion(&body)?;

        tracing::info!("Model answered with {} chars", content.len());
        Ok(content)
    }
}

/// Pulls `choices[0].message.content` out of a chat completion body.
fn parse_completion(body: &str) -> Result<String> {
    let completion: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::Format(format!("Invalid JSON from model API: {}", e)))?;

    if let Some(usage) = &completion.usage {
        tracing::debug!(
            "Token usage: prompt={:?}, completion={:?}",
            usage.prompt_tokens,
            usage.completion_tokens
        );
    }

    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GatewayError::Format("missing choices[0].message.content".to_string()))
}
