//! Configuration types for lin.

use crate::declarative::config_dto::PatternDto;
use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level configuration, usually read from `lin.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use (e.g., "recommended", "strict", "minimal", "all").
    #[serde(default)]
    pub preset: Option<String>,

    /// Severity threshold for a failing run (default: "error").
    #[serde(default)]
    pub fail_on: Option<String>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Per-rule configurations, keyed by rule name.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,

    /// Extra type facts handed to the front end.
    #[serde(default)]
    pub types: TypesConfig,

    /// Declarative rule patterns.
    #[serde(default)]
    pub patterns: Vec<PatternDto>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled. Rules are enabled unless configured otherwise.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }

    /// Parses `fail_on`, defaulting to [`Severity::Error`].
    ///
    /// # Errors
    ///
    /// Returns an error if `fail_on` names an unknown severity.
    pub fn fail_on_severity(&self) -> Result<Severity, ConfigError> {
        self.fail_on
            .as_deref()
            .map_or(Ok(Severity::Error), |s| {
                s.parse().map_err(|message| ConfigError::Parse { message })
            })
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Whether to skip test sources (`src/test`, `*Test.kt`, ...).
    #[serde(default)]
    pub skip_tests: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: vec!["**/build/**".to_string(), "**/.gradle/**".to_string()],
            respect_gitignore: true,
            skip_tests: false,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,
}

/// Type facts the parser cannot infer from a single file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypesConfig {
    /// Direct supertypes per fully qualified type name.
    #[serde(default)]
    pub supertypes: HashMap<String, Vec<String>>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A declarative pattern could not be turned into a rule.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] crate::declarative::LoadError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analyzer.respect_gitignore);
        assert!(!config.analyzer.skip_tests);
        assert!(config.rules.is_empty());
        assert!(config.patterns.is_empty());
        assert_eq!(config.fail_on_severity().unwrap(), Severity::Error);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
preset = "strict"
fail_on = "warning"

[analyzer]
root = "./app"
exclude = ["**/generated/**"]
skip_tests = true

[rules.no-find-view-by-id-calls]
enabled = false

[rules.no-public-view-properties]
severity = "warning"

[types.supertypes]
"com.example.BaseActivity" = ["android.app.Activity"]
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.preset.as_deref(), Some("strict"));
        assert_eq!(config.analyzer.root, PathBuf::from("./app"));
        assert!(config.analyzer.skip_tests);
        assert!(!config.is_rule_enabled("no-find-view-by-id-calls"));
        assert!(config.is_rule_enabled("no-print-stack-trace-calls"));
        assert_eq!(
            config.rule_severity("no-public-view-properties"),
            Some(Severity::Warning)
        );
        assert_eq!(config.fail_on_severity().unwrap(), Severity::Warning);
        assert_eq!(
            config.types.supertypes["com.example.BaseActivity"],
            vec!["android.app.Activity".to_string()]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Config::parse("preset = ["),
            Err(ConfigError::Parse { .. })
        ));

        let config = Config::parse("fail_on = \"fatal\"").unwrap();
        assert!(config.fail_on_severity().is_err());
    }
}
