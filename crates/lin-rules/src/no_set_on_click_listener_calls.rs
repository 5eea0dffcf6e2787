//! Rule to forbid `setOnClickListener` on views.
//!
//! # Rationale
//!
//! Click handlers wired by hand are better declared through data binding or
//! a binding library.
//!
//! # Suppression
//!
//! - `// lin: allow(no-set-on-click-listener-calls)` comment

use crate::{paragraph, Builtin, Patterns};
use lin_core::{HostNode, RuleError, RuleMeta, RuleNode, Severity};
use lin_kotlin::KotlinNode;

/// Rule code for no-set-on-click-listener-calls.
pub const CODE: &str = "LIN006";

/// Rule name for no-set-on-click-listener-calls.
pub const NAME: &str = "no-set-on-click-listener-calls";

pub(crate) const RULE: Builtin = Builtin {
    code: CODE,
    name: NAME,
    meta,
    patterns,
};

fn meta() -> RuleMeta {
    RuleMeta::new(CODE, NAME, "There should not be calls to setOnClickListener")
        .explanation(paragraph(&[
            "Nowadays there are better ways to synthetize these calls into a more concise declaration with tools",
            "like ButterKnife or Data Binding. See https://github.com/JakeWharton/butterknife or",
            "https://developer.android.com/topic/libraries/data-binding/",
        ]))
        .severity(Severity::Warning)
}

fn patterns() -> Result<Patterns, RuleError> {
    Ok(vec![RuleNode::file().child(
        RuleNode::call_expression().such_that(|call: &KotlinNode| {
            call.name() == Some("setOnClickListener") && call.receiver_is_a("android.view.View")
        }),
    )])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check;

    #[test]
    fn flags_listener_on_view_property() {
        let src = r"import android.widget.Button

class Screen {
    private lateinit var save: Button

    fun bind() {
        save.setOnClickListener { submit() }
    }
}
";
        let result = check(&RULE, &[("Screen.kt", src)]);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].location.line, 7);
    }

    #[test]
    fn suppressed_by_comment() {
        let src = r#"import android.view.View

fun bind(view: View) {
    // lin: allow(no-set-on-click-listener-calls) reason="legacy screen"
    view.setOnClickListener(null)
}
"#;
        let result = check(&RULE, &[("Legacy.kt", src)]);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn non_view_receivers_pass() {
        let src = "fun bind(chip: Chip) {\n    chip.setOnClickListener(null)\n}\n";
        let result = check(&RULE, &[("Chip.kt", src)]);
        assert!(result.violations.is_empty());
    }
}
