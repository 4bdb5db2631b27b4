use crate::config::NormalizationConfig;

/// Rewrites one OCR fragment into its canonical form.
///
/// Literal rules run first, then pattern rules, each in declaration order and
/// each seeing the output of the previous one. The result is uppercased.
pub fn normalize(text: &str, config: &NormalizationConfig) -> String {
    let mut normalized = text.to_string();

    for rule in config.replace_rules() {
        normalized = normalized.replace(&rule.from, &rule.to);
    }

    for rule in config.specific_replacements() {
        normalized = rule
            .pattern
            .replace_all(&normalized, rule.replacement.as_str())
            .into_owned();
    }

    normalized.to_uppercase()
}
