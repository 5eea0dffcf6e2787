//! Rule to forbid `printStackTrace()` on throwables.
//!
//! Errors should go through a configured logger or be reported to a backend,
//! not be dumped to standard error.

use crate::{Builtin, Patterns};
use lin_core::{HostNode, RuleError, RuleMeta, RuleNode, Severity};
use lin_kotlin::KotlinNode;

/// Rule code for no-print-stack-trace-calls.
pub const CODE: &str = "LIN005";

/// Rule name for no-print-stack-trace-calls.
pub const NAME: &str = "no-print-stack-trace-calls";

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
        "There should not be calls to the printStackTrace method in Throwable instances",
    )
    .explanation("Errors should be logged with a configured logger or sent to the backend for faster response")
    .severity(Severity::Warning)
}

fn patterns() -> Result<Patterns, RuleError> {
    Ok(vec![RuleNode::file().child(
        RuleNode::call_expression().such_that(|call: &KotlinNode| {
            call.name() == Some("printStackTrace") && call.receiver_is_a("java.lang.Throwable")
        }),
    )])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check;

    #[test]
    fn flags_print_stack_trace_in_catch() {
        let src = r"fun load() {
    try {
        read()
    } catch (e: IOException) {
        e.printStackTrace()
    }
}
";
        let src = format!("import java.io.IOException\n\n{src}");
        let result = check(&RULE, &[("Loader.kt", &src)]);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].location.line, 7);
    }

    #[test]
    fn other_receivers_pass() {
        let src = r"class Printer {
    fun printStackTrace() {}
}

fun use(printer: Printer) {
    printer.printStackTrace()
}
";
        let result = check(&RULE, &[("Printer.kt", src)]);
        assert!(result.violations.is_empty());
    }
}
