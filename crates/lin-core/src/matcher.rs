//! Backtracking, memoized rule tree matching.
//!
//! A rule tree matches a sibling sequence by walking it left to right with
//! the set of still-active rule nodes:
//!
//! - an `All` rule must be satisfied by every sibling of its category, and
//!   the first sibling that fails it fails the branch;
//! - a counted rule (`Times`, `AtLeast`, `AtMost`) counts every satisfying
//!   sibling, and its count is checked once the siblings run out;
//! - an `Any` rule needs one witness and then leaves the active set. The
//!   same sibling may witness several `Any` rules.
//!
//! "Satisfying" always means predicate *and* nested children. Extracted
//! bindings reach the node's children and its later siblings, and are
//! dropped with the branch that produced them. Taking an `Any` witness is
//! only a real choice when the witness extracted bindings, so that is where
//! the matcher backtracks. Extractors are skipped for rule trees without a
//! context-reading predicate.

use crate::context::{Bindings, MatchContext};
use crate::rule_tree::{Quantifier, RuleId, RuleTree};
use crate::tree::{NodeId, SyntaxTree};

use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::trace;

/// Outcome of matching a rule tree against a syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchResult {
    matched: bool,
    nodes: Vec<NodeId>,
}

impl MatchResult {
    /// A failed match.
    #[must_use]
    pub fn no_match() -> Self {
        Self::default()
    }

    fn matched(nodes: Vec<NodeId>) -> Self {
        let mut seen = HashSet::new();
        let nodes = nodes.into_iter().filter(|id| seen.insert(*id)).collect();
        Self {
            matched: true,
            nodes,
        }
    }

    /// Returns `true` if the pattern occurs.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.matched
    }

    /// Nodes that took part in the match, most specific first.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Node to report the match at.
    #[must_use]
    pub fn primary(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }
}

/// Matches `rules` against the roots of `tree`.
#[must_use]
pub fn matches<N>(tree: &SyntaxTree<'_, N>, rules: &RuleTree<N>) -> MatchResult {
    Matcher::new(tree, rules).run()
}

/// What a single node contributes when it satisfies a rule.
#[derive(Debug)]
struct Claim {
    bindings: Bindings,
    nodes: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Level {
    Roots,
    ChildrenOf(NodeId),
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct SequenceKey {
    level: Level,
    start: usize,
    active: Vec<RuleId>,
    ctx: MatchContext,
}

/// Single-use matcher owning the memo tables for one syntax tree.
pub struct Matcher<'a, 'h, N> {
    tree: &'a SyntaxTree<'h, N>,
    rules: &'a RuleTree<N>,
    claims: HashMap<(RuleId, NodeId, MatchContext), Option<Rc<Claim>>>,
    sequences: HashMap<SequenceKey, Option<Vec<NodeId>>>,
}

impl<'a, 'h, N> Matcher<'a, 'h, N> {
    /// Creates a matcher with empty memo tables.
    #[must_use]
    pub fn new(tree: &'a SyntaxTree<'h, N>, rules: &'a RuleTree<N>) -> Self {
        Self {
            tree,
            rules,
            claims: HashMap::new(),
            sequences: HashMap::new(),
        }
    }

    /// Runs the match from the tree roots with the root rule.
    #[must_use]
    pub fn run(mut self) -> MatchResult {
        let root = self.rules.root();
        match self.match_sequence(Level::Roots, 0, vec![root], MatchContext::new()) {
            Some(nodes) => MatchResult::matched(nodes),
            None => MatchResult::no_match(),
        }
    }

    fn siblings(&self, level: Level) -> &'a [NodeId] {
        let tree: &'a SyntaxTree<'h, N> = self.tree;
        match level {
            Level::Roots => tree.roots(),
            Level::ChildrenOf(id) => tree.children(id),
        }
    }

    fn match_sequence(
        &mut self,
        level: Level,
        start: usize,
        active: Vec<RuleId>,
        ctx: MatchContext,
    ) -> Option<Vec<NodeId>> {
        let key = SequenceKey {
            level,
            start,
            active,
            ctx,
        };
        if let Some(known) = self.sequences.get(&key) {
            return known.clone();
        }
        let outcome = self.walk(level, start, key.active.clone(), key.ctx.clone());
        self.sequences.insert(key, outcome.clone());
        outcome
    }

    fn walk(
        &mut self,
        level: Level,
        start: usize,
        mut active: Vec<RuleId>,
        mut ctx: MatchContext,
    ) -> Option<Vec<NodeId>> {
        let rules = self.rules;
        let siblings = self.siblings(level);
        let mut nodes = Vec::new();

        for (index, &head) in siblings.iter().enumerate().skip(start) {
            if active.is_empty() {
                return Some(nodes);
            }

            let category = self.tree.category(head);
            let applicable: Vec<RuleId> = active
                .iter()
                .copied()
                .filter(|rule| category.is_a(rules.category(*rule)))
                .collect();
            if applicable.is_empty() {
                continue;
            }

            let arrival = ctx.clone();
            let mut choices = Vec::new();
            for rule in applicable {
                let quantifier = rules.quantifier_of(rule);
                let claim = self.satisfies(rule, head, &arrival);
                match (quantifier, claim) {
                    (Quantifier::All, None) => {
                        trace!(?rule, ?head, "universal rule violated");
                        return None;
                    }
                    (Quantifier::Any, Some(claim)) if claim.bindings.is_empty() => {
                        active.retain(|r| *r != rule);
                        nodes.extend_from_slice(&claim.nodes);
                    }
                    (Quantifier::Any, Some(claim)) => choices.push((rule, claim)),
                    (quantifier, Some(claim)) => {
                        ctx = ctx.with_bindings(&claim.bindings);
                        if quantifier.is_counted() {
                            ctx = ctx.with_count_incremented(rule);
                            if quantifier.is_exceeded_by(ctx.count(rule)) {
                                trace!(?rule, %quantifier, "count exceeded");
                                return None;
                            }
                        }
                        nodes.extend_from_slice(&claim.nodes);
                    }
                    (_, None) => {}
                }
            }

            if !choices.is_empty() {
                if let Some(tail) = self.branch(
                    level,
                    index + 1,
                    &choices,
                    false,
                    active.clone(),
                    ctx.clone(),
                ) {
                    nodes.extend(tail);
                    return Some(nodes);
                }
                trace!(?head, "no witness choice succeeded, keeping rules open");
            }
        }

        self.exhausted(&active, &ctx).then_some(nodes)
    }

    /// Explores every non-empty subset of `choices` taken at the current
    /// node, then continues with the siblings from `next`. The empty subset
    /// is the caller's own continuation.
    fn branch(
        &mut self,
        level: Level,
        next: usize,
        choices: &[(RuleId, Rc<Claim>)],
        taken_any: bool,
        active: Vec<RuleId>,
        ctx: MatchContext,
    ) -> Option<Vec<NodeId>> {
        let Some(((rule, claim), rest)) = choices.split_first() else {
            return if taken_any {
                self.match_sequence(level, next, active, ctx)
            } else {
                None
            };
        };

        let mut taken = active.clone();
        taken.retain(|r| r != rule);
        let taken_ctx = ctx.with_bindings(&claim.bindings);
        if let Some(tail) = self.branch(level, next, rest, true, taken, taken_ctx) {
            let mut nodes = claim.nodes.clone();
            nodes.extend(tail);
            return Some(nodes);
        }

        self.branch(level, next, rest, taken_any, active, ctx)
    }

    fn exhausted(&self, active: &[RuleId], ctx: &MatchContext) -> bool {
        active.iter().all(|rule| match self.rules.quantifier_of(*rule) {
            Quantifier::Any => false,
            quantifier => quantifier.is_met_by(ctx.count(*rule)),
        })
    }

    fn satisfies(&mut self, rule: RuleId, node: NodeId, ctx: &MatchContext) -> Option<Rc<Claim>> {
        let key = (rule, node, ctx.clone());
        if let Some(known) = self.claims.get(&key) {
            return known.clone();
        }
        let claim = self.evaluate(rule, node, ctx).map(Rc::new);
        self.claims.insert(key, claim.clone());
        claim
    }

    fn evaluate(&mut self, rule: RuleId, node: NodeId, ctx: &MatchContext) -> Option<Claim> {
        let rules: &'a RuleTree<N> = self.rules;
        let compiled = rules.rule(rule);
        let host = self.tree.host(node);

        if let Some(predicate) = &compiled.predicate {
            if !predicate(host, ctx) {
                return None;
            }
        }

        // Values nobody reads would only split the memo keys and turn every
        // extracting `Any` witness into a choice.
        let bindings = match &compiled.extractor {
            Some(extract) if rules.reads_context() => extract(host),
            _ => Bindings::new(),
        };

        let mut nodes = if compiled.children.is_empty() {
            Vec::new()
        } else {
            self.match_sequence(
                Level::ChildrenOf(node),
                0,
                compiled.children.clone(),
                ctx.descend(&bindings),
            )?
        };
        nodes.push(node);

        Some(Claim { bindings, nodes })
    }
}
