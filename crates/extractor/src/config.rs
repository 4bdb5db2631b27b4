use crate::error::ConfigError;
use regex::Regex;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

type Result<T> = std::result::Result<T, ConfigError>;

/// A literal substring rewrite, applied to every occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralRule {
    pub from: String,
    pub to: String,
}

/// A regular expression rewrite. The replacement is stored with braced
/// `${1}` / `${name}` references, each checked against the pattern.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub pattern: Regex,
    pub replacement: String,
}

/// Text normalization rules, applied in the order they were declared.
///
/// Loaded once at startup and shared read-only afterwards, usually behind an
/// `Arc`. Every pattern has already been compiled, so normalizing text can
/// never fail.
#[derive(Debug, Clone, Default)]
pub struct NormalizationConfig {
    replace_rules: Vec<LiteralRule>,
    specific_replacements: Vec<PatternRule>,
}

impl NormalizationConfig {
    /// Builds a configuration from ordered `(key, value)` pairs.
    ///
    /// Keys must be unique within each list, every `specific_replacements`
    /// key must compile as a regular expression and every group its
    /// replacement references must exist in that expression.
    pub fn new(
        replace_rules: Vec<(String, String)>,
        specific_replacements: Vec<(String, String)>,
    ) -> Result<Self> {
        ensure_unique_keys("replace_rules", &replace_rules)?;
        ensure_unique_keys("specific_replacements", &specific_replacements)?;

        let replace_rules = replace_rules
            .into_iter()
            .map(|(from, to)| LiteralRule { from, to })
            .collect();

        let specific_replacements = specific_replacements
            .into_iter()
            .map(|(pattern, replacement)| {
                let compiled = Regex::new(&pattern)
                    .map_err(|source| ConfigError::InvalidPattern { pattern, source })?;
                let replacement = compile_template(&compiled, &replacement)?;
                Ok(PatternRule {
                    pattern: compiled,
                    replacement,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            replace_rules,
            specific_replacements,
        })
    }

    /// Parses a JSON document of the form
    /// `{"replace_rules": {...}, "specific_replacements": {...}}`.
    /// Both sections are optional.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: ConfigDocument = serde_json::from_str(json)?;
        let config = Self::new(document.replace_rules.0, document.specific_replacements.0)?;

        tracing::debug!(
            "Parsed normalization config: {} literal rules, {} pattern rules",
            config.replace_rules.len(),
            config.specific_replacements.len()
        );
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_json_str(&json)?;
        tracing::info!(
            "Loaded normalization config from {} ({} literal rules, {} pattern rules)",
            path.display(),
            config.replace_rules.len(),
            config.specific_replacements.len()
        );
        Ok(config)
    }

    pub fn replace_rules(&self) -> &[LiteralRule] {
        &self.replace_rules
    }

    pub fn specific_replacements(&self) -> &[PatternRule] {
        &self.specific_replacements
    }

    pub fn is_empty(&self) -> bool {
        self.replace_rules.is_empty() && self.specific_replacements.is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    replace_rules: OrderedRules,
    #[serde(default)]
    specific_replacements: OrderedRules,
}

/// A JSON object of string values, kept in document order and with
/// duplicate keys preserved so they can be reported.
#[derive(Debug, Default)]
struct OrderedRules(Vec<(String, String)>);

impl<'de> Deserialize<'de> for OrderedRules {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedRulesVisitor;

        impl<'de> Visitor<'de> for OrderedRulesVisitor {
            type Value = OrderedRules;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping strings to strings")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut rules = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, String>()? {
                    rules.push(entry);
                }
                Ok(OrderedRules(rules))
            }
        }

        deserializer.deserialize_map(OrderedRulesVisitor)
    }
}

fn ensure_unique_keys(section: &'static str, rules: &[(String, String)]) -> Result<()> {
    let mut seen = HashSet::with_capacity(rules.len());
    for (key, _) in rules {
        if !seen.insert(key.as_str()) {
            return Err(ConfigError::DuplicateKey {
                section,
                key: key.clone(),
            });
        }
    }
    Ok(())
}

/// Rewrites a replacement template into braced `${group}` references and
/// checks that every referenced group exists in `pattern`.
///
/// Accepted references are `$1`, `$name`, `${1}`, `${name}`, `\1` and
/// `\g<name>`. A bare `$1` only takes the digits, so `$1_$2` means group 1,
/// `_`, group 2. `$$` and `\\` are a literal `$` and `\`; a `$` that starts no
/// reference is literal too. Other backslash sequences are kept as written.
fn compile_template(pattern: &Regex, template: &str) -> Result<String> {
    let invalid = |reason: &str| ConfigError::InvalidTemplate {
        template: template.to_string(),
        reason: reason.to_string(),
    };

    let mut out = String::with_capacity(template.len() + 8);
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        let group = match (c, chars.peek().copied()) {
            ('$', Some('$')) => {
                chars.next();
                out.push_str("$$");
                continue;
            }
            ('$', Some('{')) => {
                chars.next();
                read_until(&mut chars, '}')
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| invalid("unterminated or empty `${` reference"))?
            }
            ('$', Some(d)) if d.is_ascii_digit() => {
                take_matching(&mut chars, |c| c.is_ascii_digit())
            }
            ('$', Some(w)) if w.is_ascii_alphabetic() || w == '_' => {
                take_matching(&mut chars, |c| c.is_ascii_alphanumeric() || c == '_')
            }
            ('$', _) => {
                out.push_str("$$");
                continue;
            }
            ('\\', Some(d)) if d.is_ascii_digit() => {
                take_matching(&mut chars, |c| c.is_ascii_digit())
            }
            ('\\', Some('g')) => {
                chars.next();
                if chars.next_if_eq(&'<').is_none() {
                    return Err(invalid("expected `<` after `\\g`"));
                }
                read_until(&mut chars, '>')
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| invalid("unterminated or empty `\\g<` reference"))?
            }
            ('\\', Some('\\')) => {
                chars.next();
                out.push('\\');
                continue;
            }
            (c, _) => {
                out.push(c);
                continue;
            }
        };

        ensure_group_exists(pattern, &group)?;
        out.push_str(&format!("${{{}}}", group));
    }

    Ok(out)
}

fn take_matching(chars: &mut Peekable<Chars<'_>>, matches: impl Fn(char) -> bool) -> String {
    let mut taken = String::new();
    while let Some(c) = chars.next_if(|c| matches(*c)) {
        taken.push(c);
    }
    taken
}

/// Consumes up to and including `close`; `None` if it never appears.
fn read_until(chars: &mut Peekable<Chars<'_>>, close: char) -> Option<String> {
    let mut taken = String::new();
    for c in chars.by_ref() {
        if c == close {
            return Some(taken);
        }
        taken.push(c);
    }
    None
}

fn ensure_group_exists(pattern: &Regex, group: &str) -> Result<()> {
    let exists = match group.parse::<usize>() {
        Ok(index) => index < pattern.captures_len(),
        Err(_) => pattern.capture_names().flatten().any(|name| name == group),
    };

    if exists {
        Ok(())
    } else {
        Err(ConfigError::UnknownGroup {
            pattern: pattern.as_str().to_string(),
            group: group.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_default_to_empty() {
        let config = NormalizationConfig::from_json_str("{}").unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_rules_keep_document_order() {
        let config = NormalizationConfig::from_json_str(
            r#"{"replace_rules": {"z": "1", "a": "2", "m": "3"}}"#,
        )
        .unwrap();

        let keys: Vec<&str> = config
            .replace_rules()
            .iter()
            .map(|r| r.from.as_str())
            .collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_empty_replacement_is_allowed() {
        let config =
            NormalizationConfig::from_json_str(r#"{"replace_rules": {"-": ""}}"#).unwrap();
        assert_eq!(config.replace_rules()[0].to, "");
    }

    #[test]
    fn test_invalid_pattern_fails_at_load() {
        let err = NormalizationConfig::from_json_str(r#"{"specific_replacements": {"(": ""}}"#)
            .unwrap_err();

        match err {
            ConfigError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "("),
            other => panic!("expected InvalidPattern, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let err = NormalizationConfig::from_json_str(r#"{"replace_rules": {"O": "0", "O": "Q"}}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicateKey { section: "replace_rules", ref key } if key == "O"
        ));
    }

    #[test]
    fn test_non_string_value_is_parse_error() {
        let err =
            NormalizationConfig::from_json_str(r#"{"replace_rules": {"O": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = NormalizationConfig::from_path("/nonexistent/config.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/config.json"));
    }

    #[test]
    fn test_bundled_config_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config.json");
        let config = NormalizationConfig::from_path(path).unwrap();

        assert_eq!(config.replace_rules().len(), 5);
        assert_eq!(config.specific_replacements().len(), 2);
        assert_eq!(crate::normalize(" 1.2OO ", &config), "1200");
    }

    fn template(pattern: &str, template: &str) -> Result<String> {
        compile_template(&Regex::new(pattern).unwrap(), template)
    }

    #[test]
    fn test_template_references_are_braced() {
        let pattern = r"(\d)(\d)(?P<year>\d)";
        assert_eq!(template(pattern, r"\1\2").unwrap(), "${1}${2}");
        assert_eq!(template(pattern, r"\g<year>-x").unwrap(), "${year}-x");
        assert_eq!(template(pattern, "$1$2").unwrap(), "${1}${2}");
        assert_eq!(template(pattern, "$year!").unwrap(), "${year}!");
        assert_eq!(template(pattern, "${2}x").unwrap(), "${2}x");
        assert_eq!(template(pattern, "$$5").unwrap(), "$$5");
        assert_eq!(template(pattern, "5 $").unwrap(), "5 $$");
        assert_eq!(template(pattern, r"a\\b").unwrap(), r"a\b");
        assert_eq!(template(pattern, r"\s").unwrap(), r"\s");
    }

    #[test]
    fn test_bare_group_followed_by_word_char() {
        assert_eq!(template(r"(\d)-(\d)", "$1_$2").unwrap(), "${1}_${2}");

        let config = NormalizationConfig::new(
            Vec::new(),
            vec![(r"(\d)-(\d)".to_string(), "$1_$2".to_string())],
        )
        .unwrap();
        assert_eq!(crate::normalize("1-2", &config), "1_2");
    }

    #[test]
    fn test_unknown_numbered_group_fails_at_load() {
        let err = NormalizationConfig::from_json_str(
            r#"{"specific_replacements": {"(\\d)": "$2"}}"#,
        )
        .unwrap_err();

        match err {
            ConfigError::UnknownGroup { pattern, group } => {
                assert_eq!(pattern, r"(\d)");
                assert_eq!(group, "2");
            }
            other => panic!("expected UnknownGroup, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_named_group_fails_at_load() {
        assert!(matches!(
            template(r"(?P<a>\d)", "${b}"),
            Err(ConfigError::UnknownGroup { ref group, .. }) if group == "b"
        ));
        assert!(matches!(
            template(r"(?P<a>\d)", r"\g<b>"),
            Err(ConfigError::UnknownGroup { ref group, .. }) if group == "b"
        ));
        assert!(template(r"(?P<a>\d)", "$a").is_ok());
    }

    #[test]
    fn test_unterminated_reference_fails_at_load() {
        for bad in [r"\g<year", r"\g<>", r"\gyear", "${1"] {
            let err = NormalizationConfig::new(
                Vec::new(),
                vec![(r"(?P<year>\d+)".to_string(), bad.to_string())],
            )
            .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidTemplate { ref template, .. } if template == bad),
                "{} loaded as {:?}",
                bad,
                err
            );
        }
    }
}
