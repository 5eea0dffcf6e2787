//! Rule to flag types that only hold constants.
//!
//! # Rationale
//!
//! Classes holding only constant values are often a code smell. Constants
//! belong to the class that uses them.
//!
//! # Detected Patterns
//!
//! A top-level class or object with at least one property, where every
//! property is `const` and no function other than constructors is declared.
//! Nested types, companion objects included, are not considered.
//!
//! # Suppression
//!
//! - `// lin: allow(only-constants-in-type)` comment

use crate::{paragraph, Builtin, Patterns};
use lin_core::{HostNode, Quantifier, RuleError, RuleMeta, RuleNode, Severity};
use lin_kotlin::KotlinNode;

/// Rule code for only-constants-in-type.
pub const CODE: &str = "LIN009";

/// Rule name for only-constants-in-type.
pub const NAME: &str = "only-constants-in-type";

pub(crate) const RULE: Builtin = Builtin {
    code: CODE,
    name: NAME,
    meta,
    patterns,
};

fn meta() -> RuleMeta {
    RuleMeta::new(CODE, NAME, "Using a class to store only constants is bad practice")
        .explanation(paragraph(&[
            "Classes holding only constant values are often a code smell. Constant values should be placed on the class",
            "they are being used instead and, if there is more than one place where the constant is used, move them",
            "to wherever they make more sense.",
        ]))
        .severity(Severity::Info)
}

fn patterns() -> Result<Patterns, RuleError> {
    Ok(vec![RuleNode::file().child(
        RuleNode::type_().children([
            RuleNode::field().quantifier(Quantifier::AtLeast(1)),
            RuleNode::field()
                .quantifier(Quantifier::All)
                .such_that(|field: &KotlinNode| field.has_modifier("const")),
            RuleNode::method()
                .quantifier(Quantifier::Times(0))
                .such_that(|method: &KotlinNode| method.kind() != "secondary_constructor"),
        ]),
    )])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check;

    #[test]
    fn flags_constants_object() {
        let src = r#"object Keys {
    const val USER = "user"
    const val TOKEN = "token"
}
"#;
        let result = check(&RULE, &[("Keys.kt", src)]);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].severity, Severity::Info);
    }

    #[test]
    fn types_with_behaviour_or_state_pass() {
        let src = r#"object Keys {
    const val USER = "user"
    fun all() = listOf(USER)
}

object Config {
    const val HOST = "example.com"
    val port = 80
}

object Empty
"#;
        let result = check(&RULE, &[("Keys.kt", src)]);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn companion_objects_pass() {
        let src = r#"class Screen {
    companion object {
        const val TAG = "Screen"
    }
}
"#;
        let result = check(&RULE, &[("Screen.kt", src)]);
        assert!(result.violations.is_empty());
    }
}
