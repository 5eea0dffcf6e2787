//! Rule to create `Gson` in one place only.
//!
//! # Rationale
//!
//! `Gson` instances are expensive and usually carry configuration (type
//! adapters, naming policies). Creating them in several places duplicates
//! that configuration. The count spans the whole project: one construction
//! in each of two files is already too many.
//!
//! # Suppression
//!
//! - `// lin: allow(no-more-than-one-gson-instance)` comment

use crate::{paragraph, Builtin, Patterns};
use lin_core::{RuleError, RuleMeta, Severity};

/// Rule code for no-more-than-one-gson-instance.
pub const CODE: &str = "LIN002";

/// Rule name for no-more-than-one-gson-instance.
pub const NAME: &str = "no-more-than-one-gson-instance";

pub(crate) const RULE: Builtin = Builtin {
    code: CODE,
    name: NAME,
    meta,
    patterns,
};

fn meta() -> RuleMeta {
    RuleMeta::new(CODE, NAME, "Gson should only be initialized only once")
        .explanation(paragraph(&[
            "Creating multiple instances of Gson may hurt performance and it's a common mistake to instantiate it for",
            "simple serialization/deserialization. Use a single instance, be it with a classic singleton pattern or",
            "other mechanism your dependency injector framework provides. This way you can also share the common",
            "type adapters.",
        ]))
        .severity(Severity::Warning)
}

fn patterns() -> Result<Patterns, RuleError> {
    Ok(crate::no_more_than_one_date_instance::constructed_more_than_once(
        "com.google.gson.Gson",
    ))
}
