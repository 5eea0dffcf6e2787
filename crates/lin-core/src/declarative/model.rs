//! Validated conditions attached to declarative rule nodes.

use crate::context::{Bindings, MatchContext};
use crate::tree::{HostNode, Visibility};
use regex::Regex;

/// How a compared value must relate to an extracted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Values must be equal.
    Equals,
    /// Values must differ.
    Differs,
}

/// A regex whose first capture group (or whole match) yields a value.
#[derive(Debug, Clone)]
pub struct ValuePattern(Regex);

impl ValuePattern {
    /// Wraps a compiled regex.
    #[must_use]
    pub fn new(regex: Regex) -> Self {
        Self(regex)
    }

    /// Value found in `text`, if the pattern matches.
    #[must_use]
    pub fn value<'t>(&self, text: &'t str) -> Option<&'t str> {
        let caps = self.0.captures(text)?;
        caps.get(1).or_else(|| caps.get(0)).map(|m| m.as_str())
    }
}

/// A single requirement on a host node.
///
/// Every condition answers `false` when the host cannot provide the fact it
/// needs.
#[derive(Debug, Clone)]
pub enum Condition {
    /// `name()` equals the string.
    Name(String),
    /// `name()` contains a match.
    NameMatches(Regex),
    /// `text()` contains a match.
    TextMatches(Regex),
    /// `visibility()` equals the value.
    Visibility(Visibility),
    /// `visibility()` is known and differs from the value.
    NotVisibility(Visibility),
    /// `is_subtype_of()` holds.
    SubtypeOf(String),
    /// `has_modifier()` holds.
    Modifier(String),
    /// The capture pattern matches `text()`.
    Captures(ValuePattern),
    /// A value found in `text()` relates to an extracted binding.
    Compare {
        /// Binding name.
        key: String,
        /// Pattern producing the compared value.
        pattern: ValuePattern,
        /// Relation.
        op: CompareOp,
    },
}

impl Condition {
    /// Evaluates the condition on `node` within `ctx`.
    pub fn holds<N: HostNode>(&self, node: &N, ctx: &MatchContext) -> bool {
        match self {
            Self::Name(name) => node.name() == Some(name.as_str()),
            Self::NameMatches(re) => node.name().is_some_and(|n| re.is_match(n)),
            Self::TextMatches(re) => re.is_match(node.text()),
            Self::Visibility(v) => node.visibility() == Some(*v),
            Self::NotVisibility(v) => node.visibility().is_some_and(|actual| actual != *v),
            Self::SubtypeOf(fqn) => node.is_subtype_of(fqn),
            Self::Modifier(m) => node.has_modifier(m),
            Self::Captures(pattern) => pattern.value(node.text()).is_some(),
            Self::Compare { key, pattern, op } => {
                let (Some(expected), Some(actual)) = (ctx.get(key), pattern.value(node.text()))
                else {
                    return false;
                };
                match op {
                    CompareOp::Equals => expected == actual,
                    CompareOp::Differs => expected != actual,
                }
            }
        }
    }
}

/// Extraction declared by `capture`.
#[derive(Debug, Clone)]
pub struct Capture {
    /// Binding name.
    pub key: String,
    /// Pattern producing the value.
    pub pattern: ValuePattern,
}

impl Capture {
    /// Bindings produced for `node`; empty when the pattern does not match.
    pub fn extract<N: HostNode>(&self, node: &N) -> Bindings {
        self.pattern
            .value(node.text())
            .map(|value| Bindings::from([(self.key.clone(), value.to_string())]))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::NodeCategory;
    use crate::testing::TestNode;

    fn re(s: &str) -> Regex {
        Regex::new(s).unwrap()
    }

    #[test]
    fn value_pattern_prefers_first_group() {
        let p = ValuePattern::new(re(r"R\.layout\.(\w+)"));
        assert_eq!(p.value("setContentView(R.layout.main)"), Some("main"));
        assert_eq!(ValuePattern::new(re(r"\d+")).value("a 42 b"), Some("42"));
        assert_eq!(p.value("nothing"), None);
    }

    #[test]
    fn missing_facts_answer_no() {
        let node = TestNode::new(NodeCategory::Field, "button");
        let ctx = MatchContext::new();
        assert!(!Condition::NotVisibility(Visibility::Private).holds(&node, &ctx));
        assert!(!Condition::SubtypeOf("android.view.View".into()).holds(&node, &ctx));
        assert!(!Condition::Compare {
            key: "layout".into(),
            pattern: ValuePattern::new(re(".*")),
            op: CompareOp::Differs,
        }
        .holds(&node, &ctx));
    }

    #[test]
    fn compare_reads_bindings() {
        let node = TestNode::new(NodeCategory::Expression, "ref").with_text("R.layout.main");
        let ctx = MatchContext::new().with_bindings(&Bindings::from([(
            "layout".to_string(),
            "detail".to_string(),
        )]));
        let compare = |op| Condition::Compare {
            key: "layout".into(),
            pattern: ValuePattern::new(re(r"R\.layout\.(\w+)")),
            op,
        };
        assert!(compare(CompareOp::Differs).holds(&node, &ctx));
        assert!(!compare(CompareOp::Equals).holds(&node, &ctx));
    }

    #[test]
    fn capture_extracts_value() {
        let node = TestNode::new(NodeCategory::Import, "x")
            .with_text("kotlinx.android.synthetic.main.activity_main.*");
        let capture = Capture {
            key: "layout".into(),
            pattern: ValuePattern::new(re(r"synthetic\.main\.(\w+)")),
        };
        assert_eq!(capture.extract(&node)["layout"], "activity_main");
    }
}
