//! Rule to create `java.util.Date` in one place only.
//!
//! # Rationale
//!
//! Scattered `Date()` calls mean time is not injected, which makes
//! date-dependent code hard to test. Centralizing their creation lets tests
//! replace the clock.
//!
//! # Suppression
//!
//! - `// lin: allow(no-more-than-one-date-instance)` comment

use crate::{paragraph, Builtin, Patterns};
use lin_core::{HostNode, Quantifier, RuleError, RuleMeta, RuleNode, Severity};
use lin_kotlin::KotlinNode;

/// Rule code for no-more-than-one-date-instance.
pub const CODE: &str = "LIN003";

/// Rule name for no-more-than-one-date-instance.
pub const NAME: &str = "no-more-than-one-date-instance";

pub(crate) const RULE: Builtin = Builtin {
    code: CODE,
    name: NAME,
    meta,
    patterns,
};

fn meta() -> RuleMeta {
    RuleMeta::new(CODE, NAME, "Date should only be initialized only once")
        .explanation(paragraph(&[
            "Creating multiple instances of Date is an indicator of not injecting your time on your code. That's a",
            "classic issue when testing date/time related code. Centralize the creation of date objects on a single",
            "class to be able to replace it in testing time.",
        ]))
        .severity(Severity::Warning)
}

fn patterns() -> Result<Patterns, RuleError> {
    Ok(constructed_more_than_once("java.util.Date"))
}

/// Two or more constructor calls of `fqn`, across files or within one.
pub(crate) fn constructed_more_than_once(fqn: &'static str) -> Patterns {
    let constructs = move |call: &KotlinNode| call.is_constructor_call() && call.is_subtype_of(fqn);
    vec![
        RuleNode::file()
            .quantifier(Quantifier::more_than(1))
            .child(RuleNode::call_expression().such_that(constructs)),
        RuleNode::file().child(
            RuleNode::call_expression()
                .quantifier(Quantifier::more_than(1))
                .such_that(constructs),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check;

    #[test]
    fn two_dates_in_one_file() {
        let src = "import java.util.Date\n\nfun now() = Date()\nfun later() = Date()\n";
        let result = check(&RULE, &[("Clock.kt", src)]);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].location.line, 3);
    }

    #[test]
    fn fully_qualified_constructor_counts() {
        let src = "fun now() = java.util.Date()\n";
        let result = check(&RULE, &[("A.kt", src), ("B.kt", src)]);
        assert_eq!(result.violations.len(), 1);
    }

    #[test]
    fn other_date_types_are_ignored() {
        let src = "import java.sql.Date\n\nval a = Date(0)\nval b = Date(1)\n";
        let result = check(&RULE, &[("Sql.kt", src)]);
        assert!(result.violations.is_empty());
    }
}
