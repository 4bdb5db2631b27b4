use crate::error::GatewayError;

/// Access to a remote multimodal model that can read text out of images.
#[async_trait::async_trait]
pub trait ModelGateway: Send + Sync {
    /// Sends a base64-encoded image with both prompts and returns the model's
    /// answer as plain text. No retries are performed.
    async fn send_image_for_ocr(
        &self,
        image_base64: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, GatewayError>;
}
