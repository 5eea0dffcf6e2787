//! Rule to keep view properties private.
//!
//! # Rationale
//!
//! Exposing views from activities or custom views leaks layout details to
//! other classes, which then break whenever the layout changes.
//!
//! # Detected Patterns
//!
//! - Non-private properties whose type is `android.view.View` or a subtype
//!
//! # Allowed Patterns
//!
//! - `override` properties, which implement an interface member
//!
//! # Suppression
//!
//! - `// lin: allow(no-public-view-properties)` comment

use crate::{paragraph, Builtin, Patterns};
use lin_core::{HostNode, RuleError, RuleMeta, RuleNode, Severity, Visibility};
use lin_kotlin::KotlinNode;

/// Rule code for no-public-view-properties.
pub const CODE: &str = "LIN001";

/// Rule name for no-public-view-properties.
pub const NAME: &str = "no-public-view-properties";

const VIEW: &str = "android.view.View";

pub(crate) const RULE: Builtin = Builtin {
    code: CODE,
    name: NAME,
    meta,
    patterns,
};

fn meta() -> RuleMeta {
    RuleMeta::new(CODE, NAME, "View properties should always be private")
        .explanation(paragraph(&[
            "Exposing views to other classes, be it from activities or custom views is leaking too much",
            "information to other classes and is prompt to break if the inner implementation of",
            "the layout changes, the only exception is if those views are part of an implemented",
            "interface",
        ]))
        .severity(Severity::Warning)
}

fn patterns() -> Result<Patterns, RuleError> {
    Ok(vec![RuleNode::file().child(
        RuleNode::field().such_that(is_exposed_view),
    )])
}

fn is_exposed_view(field: &KotlinNode) -> bool {
    field.visibility() != Some(Visibility::Private)
        && !field.has_modifier("override")
        && field.is_subtype_of(VIEW)
}
