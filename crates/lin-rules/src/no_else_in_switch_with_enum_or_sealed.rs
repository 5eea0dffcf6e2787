//! Rule to forbid `else` branches in `when` over enums and sealed classes.
//!
//! An `else` branch hides missing cases when the enum or sealed hierarchy
//! grows.

use crate::{paragraph, Builtin, Patterns};
use lin_core::{RuleError, RuleMeta, RuleNode, Severity};
use lin_kotlin::KotlinNode;

/// Rule code for no-else-in-switch-with-enum-or-sealed.
pub const CODE: &str = "LIN010";

/// Rule name for no-else-in-switch-with-enum-or-sealed.
pub const NAME: &str = "no-else-in-switch-with-enum-or-sealed";

pub(crate) const RULE: Builtin = Builtin {
    code: CODE,
    name: NAME,
    meta,
    patterns,
};

fn meta() -> RuleMeta {
    RuleMeta::new(
        CODE,
        NAME,
        "There should not be else/default branches on a switch statement checking for enum/sealed class values",
    )
    .explanation(paragraph(&[
        "Adding an else/default branch breaks extensibility because it won't let you know if there is a missing",
        "implementation when adding new types to the enum/sealed class",
    ]))
    .severity(Severity::Warning)
}

fn patterns() -> Result<Patterns, RuleError> {
    Ok(vec![RuleNode::file().child(
        RuleNode::switch_expression().such_that(|when: &KotlinNode| {
            when.subject_is_enum_or_sealed() && when.has_else_branch()
        }),
    )])
}
