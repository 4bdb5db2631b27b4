use crate::error::{OcrError, Result};
use crate::extractors::{
    preprocessor::Preprocessor, prompts::PromptSet, response_extractor::ResponseExtractor,
};
use crate::models::ExtractionResult;
use crate::traits::ModelGateway;
use std::path::Path;
use std::sync::Arc;

/// Image in, normalized fragments out: encodes the image, asks the model,
/// then runs the response through the [`ResponseExtractor`].
#[derive(Clone)]
pub struct ImageExtractor {
    gateway: Arc<dyn ModelGateway>,
    extractor: ResponseExtractor,
    prompts: Arc<PromptSet>,
}

impl ImageExtractor {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        extractor: ResponseExtractor,
        prompts: PromptSet,
    ) -> Self {
        Self {
            gateway,
            extractor,
            prompts: Arc::new(prompts),
        }
    }

    pub async fn extract_from_file(&self, path: impl AsRef<Path>) -> Result<ExtractionResult> {
        let image_base64 = Preprocessor::read_image_as_base64(path).await?;
        self.extract_from_base64(&image_base64).await
    }

    pub async fn extract_from_bytes(&self, bytes: &[u8]) -> Result<ExtractionResult> {
        if bytes.is_empty() {
            return Err(OcrError::EmptyImage);
        }
        let image_base64 = Preprocessor::encode_base64(bytes);
        self.extract_from_base64(&image_base64).await
    }

    async fn extract_from_base64(&self, image_base64: &str) -> Result<ExtractionResult> {
        if image_base64.is_empty() {
            return Err(OcrError::EmptyImage);
        }

        tracing::info!("Starting image extraction");

        let response = self
            .gateway
            .send_image_for_ocr(image_base64, &self.prompts.system, &self.prompts.user)
            .await?;

        let result = self.extractor.extract_from_response(&response)?;

        tracing::info!(
            "Extraction complete: {} fragments, {} chars of raw text",
            result.numbers.len(),
            result.raw_text.len()
        );
        Ok(result)
    }
}
