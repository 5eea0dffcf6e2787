//! Rule to catch synthetic view imports from the wrong layout.
//!
//! # Rationale
//!
//! `kotlinx.android.synthetic.main.<layout>` imports only make sense for the
//! layout the class inflates. Importing another layout's views is mostly a
//! typo, and custom views should expose methods instead of their layout.
//!
//! # Detected Patterns
//!
//! A file importing `kotlinx.android.synthetic.main.activity_main.*` that
//! references `R.layout.<other>` where `<other>` is not `activity_main`.
//!
//! # Suppression
//!
//! - `// lin: allow(wrong-synthetic-view-reference)` comment

use crate::{paragraph, regex, Builtin, Patterns};
use lin_core::{Bindings, HostNode, RuleError, RuleMeta, RuleNode};
use lin_kotlin::KotlinNode;

/// Rule code for wrong-synthetic-view-reference.
pub const CODE: &str = "LIN004";

/// Rule name for wrong-synthetic-view-reference.
pub const NAME: &str = "wrong-synthetic-view-reference";

/// Context key holding the layout named by the synthetic import.
pub const IMPORTED_LAYOUT: &str = "Imported Layout";

const SYNTHETIC_IMPORT: &str = r"^kotlinx\.android\.synthetic\.main\.(\w+)";
const LAYOUT_REFERENCE: &str = r"\bR\.layout\.(\w+)";

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
        "References to synthetic views not directly defined in this class or its ancestors layout",
    )
    .explanation(paragraph(&[
        "Imports to kotlinx synthetic views other than the ones defined in the layout referenced in this",
        "or its ancestor classes is mostly a typo. If you want to reference views from custom views abstract them",
        "with methods in order to keep a low coupling with its specific implementation.",
    ]))
}

fn patterns() -> Result<Patterns, RuleError> {
    let import = regex(SYNTHETIC_IMPORT)?;
    let import_for_extract = import.clone();
    let layout = regex(LAYOUT_REFERENCE)?;

    // Nested expressions sit under their enclosing expression, so the layout
    // reference is searched for in the text of each top-level expression.
    Ok(vec![RuleNode::file().children([
        RuleNode::import()
            .such_that(move |node: &KotlinNode| node.name().is_some_and(|n| import.is_match(n)))
            .extract(move |node: &KotlinNode| {
                node.name()
                    .and_then(|n| import_for_extract.captures(n))
                    .and_then(|c| c.get(1))
                    .map(|m| Bindings::from([(IMPORTED_LAYOUT.to_string(), m.as_str().to_string())]))
                    .unwrap_or_default()
            }),
        RuleNode::expression().such_that_ctx(move |node: &KotlinNode, ctx| {
            let Some(imported) = ctx.get(IMPORTED_LAYOUT) else {
                return false;
            };
            layout
                .captures_iter(node.text())
                .filter_map(|c| c.get(1))
                .any(|used| used.as_str() != imported)
        }),
    ])])
}
