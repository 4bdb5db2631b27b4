pub mod config;
pub mod error;
pub mod extractors;
pub mod models;
pub mod normalizer;
pub mod traits;

pub use config::NormalizationConfig;
pub use error::{ConfigError, ExtractionError, GatewayError, OcrError, Result};
pub use extractors::{ImageExtractor, OpenRouterClient, PromptSet, ResponseExtractor};
pub use models::{ExtractedNumber, ExtractionResult};
pub use normalizer::normalize;
pub use traits::ModelGateway;
