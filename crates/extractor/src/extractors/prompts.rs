use crate::error::ConfigError;
use std::path::Path;

pub const SYSTEM_PROMPT_FILE: &str = "system_prompt.txt";
pub const USER_PROMPT_FILE: &str = "user_prompt.txt";

/// The two prompt strings sent along with every image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    pub system: String,
    pub user: String,
}

impl PromptSet {
    /// Reads `system_prompt.txt` and `user_prompt.txt` from `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })
        };

        let prompts = Self {
            system: read(SYSTEM_PROMPT_FILE)?,
            user: read(USER_PROMPT_FILE)?,
        };
        tracing::info!("Loaded prompts from {}", dir.display());
        Ok(prompts)
    }

    /// Like [`PromptSet::from_dir`], but falls back to the built-in prompts
    /// when the directory does not exist.
    pub fn from_dir_or_default(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        if dir.is_dir() {
            Self::from_dir(dir)
        } else {
            tracing::warn!(
                "Prompt directory {} not found, using built-in prompts",
                dir.display()
            );
            Ok(Self::default())
        }
    }
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            system: r#"You are an OCR assistant. Read every number or code visible in the image and output ONLY valid JSON.

Schema:
{
  "raw_text": "all text visible in the image, in reading order",
  "numbers": [
    { "raw": "one number or code exactly as written" }
  ]
}

Rules:
1. Copy characters exactly as they appear; do not correct or reformat them.
2. List numbers in reading order, top to bottom, left to right.
3. Use an empty list when no numbers are visible.
4. Return ONLY the JSON object, no explanations."#
                .to_string(),
            user: "Extract all numbers and codes from this image.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompt_describes_schema() {
        let prompts = PromptSet::default();
        assert!(prompts.system.contains("\"raw_text\""));
        assert!(prompts.system.contains("\"numbers\""));
        assert!(!prompts.user.is_empty());
    }

    #[test]
    fn test_missing_dir_falls_back_to_default() {
        let prompts = PromptSet::from_dir_or_default("/nonexistent/prompts").unwrap();
        assert_eq!(prompts, PromptSet::default());
    }

    #[test]
    fn test_from_dir_reads_both_files() {
        let dir = std::env::temp_dir().join(format!("ocr-prompts-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(SYSTEM_PROMPT_FILE), "sys").unwrap();
        std::fs::write(dir.join(USER_PROMPT_FILE), "usr").unwrap();

        let prompts = PromptSet::from_dir(&dir).unwrap();
        assert_eq!(prompts.system, "sys");
        assert_eq!(prompts.user, "usr");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_from_dir_missing_file() {
        let dir = std::env::temp_dir().join(format!("ocr-prompts-partial-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(SYSTEM_PROMPT_FILE), "sys").unwrap();

        let err = PromptSet::from_dir(&dir).unwrap_err();
        assert!(err.to_string().contains(USER_PROMPT_FILE));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
