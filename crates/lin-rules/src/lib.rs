//! # lin-rules
//!
//! Built-in Android/Kotlin rules for lin.
//!
//! Every rule is a plain [`Rule`] value over [`KotlinNode`]s, built from one
//! or more rule trees. Nothing is registered globally: callers pick a preset
//! or individual rules and hand them to the analyzer.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | LIN001 | `no-public-view-properties` | View properties should be private |
//! | LIN002 | `no-more-than-one-gson-instance` | `Gson` should be created once |
//! | LIN003 | `no-more-than-one-date-instance` | `Date` should be created once |
//! | LIN004 | `wrong-synthetic-view-reference` | Synthetic imports must match the inflated layout |
//! | LIN005 | `no-print-stack-trace-calls` | Forbids `printStackTrace()` on throwables |
//! | LIN006 | `no-set-on-click-listener-calls` | Forbids `setOnClickListener` on views |
//! | LIN007 | `no-find-view-by-id-calls` | Forbids `findViewById` |
//! | LIN008 | `no-data-frameworks-from-android-class` | Keeps data frameworks out of Android classes |
//! | LIN009 | `only-constants-in-type` | Flags types that only hold constants |
//! | LIN010 | `no-else-in-switch-with-enum-or-sealed` | Forbids `else` in `when` over enums/sealed classes |
//!
//! ## Usage
//!
//! ```ignore
//! use lin_core::Analyzer;
//! use lin_kotlin::KotlinFrontend;
//!
//! let analyzer = Analyzer::builder(KotlinFrontend::new())
//!     .root("./app")
//!     .rules(lin_rules::recommended_rules()?)
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod no_data_frameworks_from_android_class;
mod no_else_in_switch_with_enum_or_sealed;
mod no_find_view_by_id_calls;
mod no_more_than_one_date_instance;
mod no_more_than_one_gson_instance;
mod no_print_stack_trace_calls;
mod no_public_view_properties;
mod no_set_on_click_listener_calls;
mod only_constants_in_type;
mod presets;
mod wrong_synthetic_view_reference;

pub use presets::{
    all_rules, minimal_rules, recommended_rules, rule_by_name, strict_rules, Preset, BUILTINS,
};

/// Re-export core types for convenience.
pub use lin_core::{Rule, RuleError, RuleMeta, Severity, Violation};
pub use lin_kotlin::KotlinNode;

/// A rule over Kotlin sources.
pub type KotlinRule = Rule<KotlinNode>;

/// Rule trees of one rule, in the order they are tried.
pub type Patterns = Vec<lin_core::RuleNode<KotlinNode>>;

/// A built-in rule: its metadata and how to build its rule trees.
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    /// Rule code.
    pub code: &'static str,
    /// Rule name.
    pub name: &'static str,
    /// Default metadata.
    pub meta: fn() -> RuleMeta,
    /// Rule trees.
    pub patterns: fn() -> Result<Patterns, RuleError>,
}

impl Builtin {
    /// Builds the rule with its default metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if a rule tree is malformed.
    pub fn build(&self) -> Result<KotlinRule, RuleError> {
        self.build_with((self.meta)())
    }

    /// Builds the rule with the given metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if a rule tree is malformed.
    pub fn build_with(&self, meta: RuleMeta) -> Result<KotlinRule, RuleError> {
        Rule::any_of(meta, (self.patterns)()?)
    }
}

/// Compiles a regex for use inside a rule tree.
pub(crate) fn regex(pattern: &str) -> Result<regex::Regex, RuleError> {
    regex::Regex::new(pattern).map_err(|e| RuleError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Joins a wrapped explanation into one paragraph.
pub(crate) fn paragraph(lines: &[&str]) -> String {
    lines.join(" ")
}

#[cfg(test)]
pub(crate) mod testing {
    use lin_core::{Analyzer, LintResult, SourceFile};
    use lin_kotlin::KotlinFrontend;

    /// Runs one rule over in-memory Kotlin sources.
    pub fn check(rule: &crate::Builtin, files: &[(&str, &str)]) -> LintResult {
        let sources = files
            .iter()
            .map(|(path, content)| SourceFile::new(*path, *content))
            .collect();
        Analyzer::builder(KotlinFrontend::new())
            .rule(rule.build().unwrap())
            .build()
            .unwrap()
            .analyze_sources(sources)
            .unwrap()
    }
}
