//! Rule presets for common configurations.

use crate::{
    no_data_frameworks_from_android_class as data_frameworks,
    no_else_in_switch_with_enum_or_sealed as else_in_switch,
    no_find_view_by_id_calls as find_view_by_id, no_more_than_one_date_instance as date,
    no_more_than_one_gson_instance as gson, no_print_stack_trace_calls as print_stack_trace,
    no_public_view_properties as public_views, no_set_on_click_listener_calls as click_listener,
    only_constants_in_type as only_constants, wrong_synthetic_view_reference as synthetic,
    Builtin, KotlinRule, RuleError, Severity,
};
use std::str::FromStr;

/// Every built-in rule, in code order.
pub const BUILTINS: &[Builtin] = &[
    public_views::RULE,
    gson::RULE,
    date::RULE,
    synthetic::RULE,
    print_stack_trace::RULE,
    click_listener::RULE,
    find_view_by_id::RULE,
    data_frameworks::RULE,
    only_constants::RULE,
    else_in_switch::RULE,
];

/// Preset configurations for lin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Recommended rules with their default severities.
    Recommended,
    /// Every rule, all reported as errors.
    Strict,
    /// Correctness rules only, for gradual adoption.
    Minimal,
    /// Every rule with its default severity.
    All,
}

impl Preset {
    /// Returns the rules for this preset.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in rule tree is malformed.
    pub fn rules(self) -> Result<Vec<KotlinRule>, RuleError> {
        match self {
            Self::Recommended => recommended_rules(),
            Self::Strict => strict_rules(),
            Self::Minimal => minimal_rules(),
            Self::All => all_rules(),
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recommended" => Ok(Self::Recommended),
            "strict" => Ok(Self::Strict),
            "minimal" => Ok(Self::Minimal),
            "all" => Ok(Self::All),
            other => Err(format!(
                "unknown preset `{other}`, expected: recommended, strict, minimal, all"
            )),
        }
    }
}

fn build(rules: &[Builtin]) -> Result<Vec<KotlinRule>, RuleError> {
    rules.iter().map(Builtin::build).collect()
}

/// Returns the recommended set of rules.
///
/// Includes:
/// - `no-public-view-properties` (LIN001)
/// - `wrong-synthetic-view-reference` (LIN004)
/// - `no-print-stack-trace-calls` (LIN005)
/// - `no-find-view-by-id-calls` (LIN007)
/// - `no-data-frameworks-from-android-class` (LIN008)
/// - `no-else-in-switch-with-enum-or-sealed` (LIN010)
///
/// # Errors
///
/// Returns an error if a built-in rule tree is malformed.
pub fn recommended_rules() -> Result<Vec<KotlinRule>, RuleError> {
    build(&[
        public_views::RULE,
        synthetic::RULE,
        print_stack_trace::RULE,
        find_view_by_id::RULE,
        data_frameworks::RULE,
        else_in_switch::RULE,
    ])
}

/// Returns every rule with its severity raised to [`Severity::Error`].
///
/// # Errors
///
/// Returns an error if a built-in rule tree is malformed.
pub fn strict_rules() -> Result<Vec<KotlinRule>, RuleError> {
    BUILTINS
        .iter()
        .map(|b| b.build_with((b.meta)().severity(Severity::Error)))
        .collect()
}

/// Returns the minimal set of rules.
///
/// For gradual adoption, only includes:
/// - `wrong-synthetic-view-reference` (LIN004)
/// - `no-print-stack-trace-calls` (LIN005)
///
/// # Errors
///
/// Returns an error if a built-in rule tree is malformed.
pub fn minimal_rules() -> Result<Vec<KotlinRule>, RuleError> {
    build(&[synthetic::RULE, print_stack_trace::RULE])
}

/// Returns all available rules.
///
/// # Errors
///
/// Returns an error if a built-in rule tree is malformed.
pub fn all_rules() -> Result<Vec<KotlinRule>, RuleError> {
    build(BUILTINS)
}

/// Looks up a built-in rule by name (`no-find-view-by-id-calls`) or code
/// (`LIN007`, case-insensitive).
#[must_use]
pub fn rule_by_name(name_or_code: &str) -> Option<&'static Builtin> {
    BUILTINS
        .iter()
        .find(|b| b.name == name_or_code || b.code.eq_ignore_ascii_case(name_or_code))
}
