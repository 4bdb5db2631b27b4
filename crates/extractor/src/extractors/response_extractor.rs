use crate::config::NormalizationConfig;
use crate::error::{ExtractionError, snippet};
use crate::models::{ExtractedNumber, ExtractionResult};
use crate::normalizer::normalize;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::Arc;

type Result<T> = std::result::Result<T, ExtractionError>;

/// Expected shape of the model answer. Every field is optional.
#[derive(Debug, Deserialize)]
struct ModelPayload {
    /// Any non-string value is treated as absent.
    #[serde(default, deserialize_with = "string_or_empty")]
    raw_text: String,
    /// `null` is treated as absent; any other non-array value is rejected.
    #[serde(default)]
    numbers: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ModelItem {
    #[serde(default)]
    raw: Option<String>,
}

fn string_or_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// Turns raw model answers into normalized [`ExtractionResult`]s.
#[derive(Debug, Clone)]
pub struct ResponseExtractor {
    config: Arc<NormalizationConfig>,
}

impl ResponseExtractor {
    pub fn new(config: Arc<NormalizationConfig>) -> Self {
        Self { config }
    }

    /// Parses a model answer and normalizes every listed fragment.
    ///
    /// The answer may wrap its JSON object in prose; in that case the text
    /// between the first `{` and the last `}` is used. A `numbers` entry that
    /// is not an object, or whose `raw` is not a string, fails the whole call.
    pub fn extract_from_response(&self, response_text: &str) -> Result<ExtractionResult> {
        let value = parse_json_payload(response_text)?;
        if !value.is_object() {
            return Err(ExtractionError::MalformedPayload {
                reason: format!("expected a JSON object, found {}", json_kind(&value)),
            });
        }

        let payload: ModelPayload =
            serde_json::from_value(value).map_err(|e| ExtractionError::MalformedPayload {
                reason: e.to_string(),
            })?;

        let numbers = payload
            .numbers
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                if !item.is_object() {
                    return Err(ExtractionError::MalformedItem {
                        index,
                        reason: format!("expected an object, found {}", json_kind(&item)),
                    });
                }
                let item: ModelItem =
                    serde_json::from_value(item).map_err(|e| ExtractionError::MalformedItem {
                        index,
                        reason: e.to_string(),
                    })?;
                let raw = item.raw.unwrap_or_default();
                let normalized = normalize(&raw, &self.config);
                Ok(ExtractedNumber { raw, normalized })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Extracted {} fragments from model response", numbers.len());

        Ok(ExtractionResult {
            raw_text: payload.raw_text,
            numbers,
        })
    }
}

fn parse_json_payload(response_text: &str) -> Result<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(response_text) {
        return Ok(value);
    }

    let candidate = outermost_braces(response_text).ok_or_else(|| ExtractionError::NoJson {
        snippet: snippet(response_text),
    })?;

    tracing::debug!(
        "Model response is not bare JSON, retrying with {} byte brace span",
        candidate.len()
    );

    serde_json::from_str::<Value>(candidate).map_err(|_| ExtractionError::NoJson {
        snippet: snippet(response_text),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Span from the first `{` to the last `}` that follows it.
fn outermost_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(literal: &[(&str, &str)]) -> ResponseExtractor {
        let rules = literal
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let config = NormalizationConfig::new(rules, Vec::new()).unwrap();
        ResponseExtractor::new(Arc::new(config))
    }

    #[test]
    fn test_bare_json() {
        let result = extractor(&[])
            .extract_from_response(r#"{"raw_text": "a b", "numbers": [{"raw": "ab"}, {"raw": "c1"}]}"#)
            .unwrap();

        assert_eq!(result.raw_text, "a b");
        assert_eq!(
            result.numbers,
            vec![
                ExtractedNumber {
                    raw: "ab".to_string(),
                    normalized: "AB".to_string()
                },
                ExtractedNumber {
                    raw: "c1".to_string(),
                    normalized: "C1".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_json_surrounded_by_prose() {
        let response =
            "Here is the result: {\"raw_text\":\"x\",\"numbers\":[{\"raw\":\"5O\"}]} Thanks!";
        let result = extractor(&[("O", "0")])
            .extract_from_response(response)
            .unwrap();

        assert_eq!(result.raw_text, "x");
        assert_eq!(result.numbers.len(), 1);
        assert_eq!(result.numbers[0].raw, "5O");
        assert_eq!(result.numbers[0].normalized, "50");
    }

    #[test]
    fn test_json_in_markdown_fence() {
        let response = "```json\n{\n  \"raw_text\": \"A1\",\n  \"numbers\": [{\"raw\": \"a1\"}]\n}\n```";
        let result = extractor(&[]).extract_from_response(response).unwrap();
        assert_eq!(result.numbers[0].normalized, "A1");
    }

    #[test]
    fn test_no_json_present() {
        let err = extractor(&[])
            .extract_from_response("no data here")
            .unwrap_err();
        match err {
            ExtractionError::NoJson { snippet } => assert_eq!(snippet, "no data here"),
            other => panic!("expected NoJson, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_brace_span() {
        let err = extractor(&[])
            .extract_from_response("first { broken } then }")
            .unwrap_err();
        assert!(matches!(err, ExtractionError::NoJson { .. }));
    }

    #[test]
    fn test_closing_brace_before_opening() {
        let err = extractor(&[]).extract_from_response("} nothing {").unwrap_err();
        assert!(matches!(err, ExtractionError::NoJson { .. }));
    }

    #[test]
    fn test_missing_numbers_field() {
        let result = extractor(&[])
            .extract_from_response(r#"{"raw_text":"hello"}"#)
            .unwrap();
        assert_eq!(result.raw_text, "hello");
        assert!(result.numbers.is_empty());
    }

    #[test]
    fn test_null_numbers_field() {
        let result = extractor(&[])
            .extract_from_response(r#"{"numbers": null}"#)
            .unwrap();
        assert!(result.numbers.is_empty());
    }

    #[test]
    fn test_non_string_raw_text_defaults_to_empty() {
        let result = extractor(&[])
            .extract_from_response(r#"{"raw_text": 42, "numbers": []}"#)
            .unwrap();
        assert_eq!(result.raw_text, "");
    }

    #[test]
    fn test_item_without_raw() {
        let result = extractor(&[])
            .extract_from_response(r#"{"numbers": [{"confidence": 0.9}]}"#)
            .unwrap();
        assert_eq!(result.numbers[0].raw, "");
        assert_eq!(result.numbers[0].normalized, "");
    }

    #[test]
    fn test_non_object_item_fails_whole_call() {
        let err = extractor(&[])
            .extract_from_response(r#"{"numbers": [{"raw": "1"}, "2"]}"#)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedItem { index: 1, .. }));
    }

    #[test]
    fn test_array_item_fails_whole_call() {
        let err = extractor(&[])
            .extract_from_response(r#"{"numbers": [["1"]]}"#)
            .unwrap_err();
        match err {
            ExtractionError::MalformedItem { index, reason } => {
                assert_eq!(index, 0);
                assert!(reason.contains("an array"));
            }
            other => panic!("expected MalformedItem, got {:?}", other),
        }
    }

    #[test]
    fn test_non_string_raw_fails_whole_call() {
        let err = extractor(&[])
            .extract_from_response(r#"{"numbers": [{"raw": 12}]}"#)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedItem { index: 0, .. }));
    }

    #[test]
    fn test_numbers_not_an_array() {
        let err = extractor(&[])
            .extract_from_response(r#"{"numbers": "12"}"#)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedPayload { .. }));
    }

    #[test]
    fn test_top_level_array_is_rejected() {
        let err = extractor(&[])
            .extract_from_response(r#"[{"raw": "1"}]"#)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedPayload { .. }));
    }

    #[test]
    fn test_outermost_braces_is_greedy() {
        assert_eq!(outermost_braces("a {1} b {2} c"), Some("{1} b {2}"));
        assert_eq!(outermost_braces("no braces"), None);
    }
}
