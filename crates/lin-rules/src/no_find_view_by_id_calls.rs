//! Rule to forbid `findViewById`.
//!
//! Applies to calls on activities and views, including the implicit receiver
//! inside an `Activity` or `View` subclass.

use crate::{paragraph, Builtin, Patterns};
use lin_core::{HostNode, RuleError, RuleMeta, RuleNode, Severity};
use lin_kotlin::KotlinNode;

/// Rule code for no-find-view-by-id-calls.
pub const CODE: &str = "LIN007";

/// Rule name for no-find-view-by-id-calls.
pub const NAME: &str = "no-find-view-by-id-calls";

pub(crate) const RULE: Builtin = Builtin {
    code: CODE,
    name: NAME,
    meta,
    patterns,
};

fn meta() -> RuleMeta {
    RuleMeta::new(CODE, NAME, "There should not be calls to findViewById")
        .explanation(paragraph(&[
            "Nowadays there are better ways to synthetize these calls into a more concise declaration with tools",
            "like ButterKnife. See https://github.com/JakeWharton/butterknife or",
            "https://kotlinlang.org/docs/tutorials/android-plugin.html#view-binding",
        ]))
        .severity(Severity::Warning)
}

fn patterns() -> Result<Patterns, RuleError> {
    Ok(vec![RuleNode::file().child(
        RuleNode::call_expression().such_that(|call: &KotlinNode| {
            call.name() == Some("findViewById")
                && (call.receiver_is_a("android.app.Activity")
                    || call.receiver_is_a("android.view.View"))
        }),
    )])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check;

    #[test]
    fn flags_implicit_receiver_first() {
        let src = r"import android.view.View
import androidx.appcompat.app.AppCompatActivity

class MainActivity : AppCompatActivity() {
    fun bind(root: View) {
        val title = findViewById<View>(R.id.title)
        val body = root.findViewById<View>(R.id.body)
    }
}
";
        let result = check(&RULE, &[("MainActivity.kt", src)]);
        // One violation per file, located at the first witness.
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].location.line, 6);
    }

    #[test]
    fn explicit_view_receiver() {
        let src = "import android.view.View\n\nfun bind(root: View) = root.findViewById<View>(1)\n";
        let result = check(&RULE, &[("Bind.kt", src)]);
        assert_eq!(result.violations.len(), 1);
    }

    #[test]
    fn unrelated_classes_pass() {
        let src = "class Finder {\n    fun run() = findViewById(1)\n    fun findViewById(id: Int) = id\n}\n";
        let result = check(&RULE, &[("Finder.kt", src)]);
        assert!(result.violations.is_empty());
    }
}
