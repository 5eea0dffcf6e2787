//! Rule registration: metadata and rule trees travelling together.

use crate::category::CategorySet;
use crate::matcher::{matches, MatchResult};
use crate::rule_tree::{RuleError, RuleNode, RuleTree};
use crate::tree::{HostNode, TreeCache};
use crate::types::Severity;

/// Descriptive metadata of a rule, consumed by reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMeta {
    /// Short code (e.g., "LIN001").
    pub code: String,
    /// Kebab-case name used in configuration and suppression comments.
    pub name: String,
    /// One-line description, used as the violation message.
    pub description: String,
    /// Longer explanation, shown as help.
    pub explanation: Option<String>,
    /// Default severity.
    pub severity: Severity,
}

impl RuleMeta {
    /// Creates metadata with [`Severity::Error`] and no explanation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: description.into(),
            explanation: None,
            severity: Severity::Error,
        }
    }

    /// Sets the explanation.
    #[must_use]
    pub fn explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Sets the default severity.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// A diagnostic rule: metadata plus one or more alternative patterns.
///
/// The rule fires when any of its patterns matches.
pub struct Rule<N> {
    meta: RuleMeta,
    patterns: Vec<RuleTree<N>>,
}

impl<N> Rule<N> {
    /// Creates a rule from a single pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is malformed.
    pub fn new(meta: RuleMeta, pattern: RuleNode<N>) -> Result<Self, RuleError> {
        Self::any_of(meta, [pattern])
    }

    /// Creates a rule that fires when any of `patterns` matches.
    ///
    /// # Errors
    ///
    /// Returns an error if no pattern is given or any pattern is malformed.
    pub fn any_of<I>(meta: RuleMeta, patterns: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = RuleNode<N>>,
    {
        let patterns = patterns
            .into_iter()
            .map(RuleTree::new)
            .collect::<Result<Vec<_>, _>>()?;
        if patterns.is_empty() {
            return Err(RuleError::Invalid {
                rule: meta.name,
                message: "a rule needs at least one pattern".to_string(),
            });
        }
        Ok(Self { meta, patterns })
    }

    /// Rule metadata.
    #[must_use]
    pub fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    /// Rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Rule code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.meta.code
    }

    /// Alternative patterns, in declaration order.
    #[must_use]
    pub fn patterns(&self) -> &[RuleTree<N>] {
        &self.patterns
    }

    /// Categories referenced by any pattern.
    #[must_use]
    pub fn categories(&self) -> CategorySet {
        self.patterns
            .iter()
            .fold(CategorySet::new(), |set, p| set.union(p.categories()))
    }
}

impl<N: HostNode> Rule<N> {
    /// Matches the patterns selected by `filter` in order, each against the
    /// tree built for its own categories, and returns the first success
    /// together with its pattern index.
    pub fn evaluate_where<F>(
        &self,
        trees: &mut TreeCache<'_, N>,
        filter: F,
    ) -> Option<(usize, MatchResult)>
    where
        F: Fn(&RuleTree<N>) -> bool,
    {
        self.patterns
            .iter()
            .enumerate()
            .filter(|(_, pattern)| filter(pattern))
            .map(|(i, pattern)| (i, matches(trees.tree(pattern.categories()), pattern)))
            .find(|(_, result)| result.is_match())
    }

    /// Matches every pattern in order and returns the first success.
    pub fn evaluate(&self, trees: &mut TreeCache<'_, N>) -> Option<(usize, MatchResult)> {
        self.evaluate_where(trees, |_| true)
    }
}

impl<N> std::fmt::Debug for Rule<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("meta", &self.meta)
            .field("patterns", &self.patterns)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::NodeCategory;
    use crate::rule_tree::Quantifier;
    use crate::testing::TestNode;

    fn gson_rule() -> Rule<TestNode> {
        let is_gson = |n: &TestNode| n.name() == Some("Gson");
        Rule::any_of(
            RuleMeta::new("LIN002", "no-more-than-one-gson-instance", "Gson should be created once")
                .severity(Severity::Warning),
            [
                RuleNode::file()
                    .quantifier(Quantifier::more_than(1))
                    .child(RuleNode::call_expression().such_that(is_gson)),
                RuleNode::file().child(
                    RuleNode::call_expression()
                        .quantifier(Quantifier::more_than(1))
                        .such_that(is_gson),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn first_matching_pattern_wins() {
        let rule = gson_rule();
        let host = TestNode::new(NodeCategory::File, "A.kt")
            .child(TestNode::new(NodeCategory::CallExpression, "Gson"))
            .child(TestNode::new(NodeCategory::CallExpression, "Gson"));
        let mut trees = TreeCache::new(vec![&host]);

        let (index, result) = rule.evaluate(&mut trees).unwrap();
        assert_eq!(index, 1);
        assert!(result.is_match());
        assert_eq!(rule.meta().severity, Severity::Warning);
    }

    #[test]
    fn filter_skips_patterns() {
        let rule = gson_rule();
        let host = TestNode::new(NodeCategory::File, "A.kt")
            .child(TestNode::new(NodeCategory::CallExpression, "Gson"))
            .child(TestNode::new(NodeCategory::CallExpression, "Gson"));
        let mut trees = TreeCache::new(vec![&host]);
        assert!(rule
            .evaluate_where(&mut trees, |p| p.is_project_wide())
            .is_none());
    }

    #[test]
    fn patterns_match_against_their_own_trees() {
        // With types kept, the call would sit under `Foo` instead of the file.
        let rule = Rule::any_of(
            RuleMeta::new("X", "x", "x"),
            [
                RuleNode::file().child(
                    RuleNode::type_().child(RuleNode::method().such_that(|n: &TestNode| {
                        n.name() == Some("never")
                    })),
                ),
                RuleNode::file().child(
                    RuleNode::call_expression().such_that(|n: &TestNode| n.name() == Some("Gson")),
                ),
            ],
        )
        .unwrap();
        let host = TestNode::new(NodeCategory::File, "A.kt").child(
            TestNode::new(NodeCategory::Type, "Foo")
                .child(TestNode::new(NodeCategory::CallExpression, "Gson")),
        );
        let mut trees = TreeCache::new(vec![&host]);

        let (index, result) = rule.evaluate(&mut trees).unwrap();
        assert_eq!(index, 1);
        assert_eq!(result.nodes().len(), 2);
        assert_eq!(trees.built(), 2);
    }

    #[test]
    fn malformed_patterns_are_rejected_at_registration() {
        let err = Rule::<TestNode>::new(
            RuleMeta::new("X", "x", "x"),
            RuleNode::import().child(RuleNode::expression()),
        )
        .unwrap_err();
        assert!(matches!(err, RuleError::UnreachableChild { .. }));

        let empty = Rule::<TestNode>::any_of(RuleMeta::new("X", "x", "x"), []);
        assert!(matches!(empty, Err(RuleError::Invalid { .. })));
    }
}
