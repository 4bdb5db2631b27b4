use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One text fragment detected by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExtractedNumber {
    /// Fragment exactly as the model returned it
    pub raw: String,
    /// Fragment after the normalization rules and uppercasing
    pub normalized: String,
}

/// Structured result of a single OCR request. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct ExtractionResult {
    /// Free-form text echoed from the model response
    pub raw_text: String,
    /// Fragments in the order the model listed them
    pub numbers: Vec<ExtractedNumber>,
}
