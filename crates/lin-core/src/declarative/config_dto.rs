//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde. The loader validates them and turns
//! them into rules.

use serde::{Deserialize, Serialize};

/// A document holding only `[[patterns]]` tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternsDto {
    /// Declared patterns.
    #[serde(default)]
    pub patterns: Vec<PatternDto>,
}

/// One `[[patterns]]` entry: a complete rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternDto {
    /// Rule code (default: the upper-cased name).
    #[serde(default)]
    pub code: Option<String>,
    /// Rule name (e.g., "no-log-calls").
    pub name: String,
    /// Violation message.
    pub message: String,
    /// Longer description shown as help.
    #[serde(default)]
    pub description: Option<String>,
    /// Severity (default: "error").
    #[serde(default = "default_severity_str")]
    pub severity: String,
    /// Root rule node.
    pub root: RuleNodeDto,
}

/// A rule node and its nested children.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleNodeDto {
    /// Kebab-case category name (e.g., "call-expression").
    pub category: String,
    /// Quantifier (default: "any").
    #[serde(default)]
    pub quantifier: Option<QuantifierDto>,
    /// Exact node name.
    #[serde(default)]
    pub name: Option<String>,
    /// Regex searched in the node name.
    #[serde(default)]
    pub name_matches: Option<String>,
    /// Regex searched in the node text.
    #[serde(default)]
    pub text_matches: Option<String>,
    /// Required visibility.
    #[serde(default)]
    pub visibility: Option<String>,
    /// Rejected visibility.
    #[serde(default)]
    pub not_visibility: Option<String>,
    /// Fully qualified type the node's type must be or extend.
    #[serde(default)]
    pub subtype_of: Option<String>,
    /// Required modifier keyword.
    #[serde(default)]
    pub modifier: Option<String>,
    /// Value extracted from the node text for later nodes.
    #[serde(default)]
    pub capture: Option<CaptureDto>,
    /// Comparison of the node text against an extracted value.
    #[serde(default)]
    pub compare: Option<CompareDto>,
    /// Nested rule nodes.
    #[serde(default)]
    pub children: Vec<RuleNodeDto>,
}

/// Either a keyword (`"all"`, `"any"`) or a counted table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuantifierDto {
    /// `"all"` or `"any"`.
    Keyword(String),
    /// `{ times = 2 }`, `{ more_than = 1 }`, ...
    Count(CountDto),
}

/// Counted quantifier table; exactly one key must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CountDto {
    /// Exactly `n`.
    #[serde(default)]
    pub times: Option<i64>,
    /// At least `n`.
    #[serde(default)]
    pub at_least: Option<i64>,
    /// At most `n`.
    #[serde(default)]
    pub at_most: Option<i64>,
    /// More than `n`.
    #[serde(default)]
    pub more_than: Option<i64>,
    /// Less than `n`.
    #[serde(default)]
    pub less_than: Option<i64>,
}

/// `capture = { key = "...", pattern = "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureDto {
    /// Binding name.
    pub key: String,
    /// Regex; the first group (or the whole match) becomes the value.
    pub pattern: String,
}

/// `compare = { key = "...", pattern = "...", op = "differs" }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareDto {
    /// Binding name to compare against.
    pub key: String,
    /// Regex; the first group (or the whole match) is compared.
    pub pattern: String,
    /// `"equals"` (default) or `"differs"`.
    #[serde(default = "default_op_str")]
    pub op: String,
}

fn default_severity_str() -> String {
    "error".to_string()
}

fn default_op_str() -> String {
    "equals".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_empty() {
        let dto: PatternsDto = toml::from_str("").unwrap();
        assert!(dto.patterns.is_empty());
    }

    #[test]
    fn deserialize_nested_pattern() {
        let toml_str = r#"
[[patterns]]
name = "no-log-calls"
message = "Use Timber instead of Log"

[patterns.root]
category = "file"

[[patterns.root.children]]
category = "call-expression"
quantifier = { more_than = 2 }
name = "d"

[[patterns.root.children]]
category = "import"
quantifier = "all"
capture = { key = "pkg", pattern = "^(\\w+)" }
"#;
        let dto: PatternsDto = toml::from_str(toml_str).unwrap();
        let pattern = &dto.patterns[0];
        assert_eq!(pattern.severity, "error");
        assert!(pattern.code.is_none());
        assert_eq!(pattern.root.children.len(), 2);

        let call = &pattern.root.children[0];
        assert!(matches!(
            call.quantifier,
            Some(QuantifierDto::Count(CountDto { more_than: Some(2), .. }))
        ));
        let import = &pattern.root.children[1];
        assert!(matches!(&import.quantifier, Some(QuantifierDto::Keyword(k)) if k == "all"));
        assert_eq!(import.capture.as_ref().unwrap().key, "pkg");
    }

    #[test]
    fn compare_defaults_to_equals() {
        let dto: CompareDto = toml::from_str("key = \"k\"\npattern = \"x\"").unwrap();
        assert_eq!(dto.op, "equals");
    }
}
