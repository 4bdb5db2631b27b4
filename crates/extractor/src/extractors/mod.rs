pub mod image_extractor;
pub mod openrouter_client;
pub mod preprocessor;
pub mod prompts;
pub mod response_extractor;

pub use image_extractor::ImageExtractor;
pub use openrouter_client::OpenRouterClient;
pub use preprocessor::Preprocessor;
pub use prompts::PromptSet;
pub use response_extractor::ResponseExtractor;
