//! Declarative rule trees.
//!
//! A [`RuleNode`] is the builder an author writes; [`RuleTree::new`]
//! validates it once and compiles it into an immutable arena that can be
//! shared by every file and thread.

use crate::category::{CategorySet, NodeCategory, UnknownCategory};
use crate::context::{Bindings, MatchContext};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while constructing a rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// A child rule uses a category that cannot occur below its parent.
    #[error("a `{child}` rule cannot be nested under a `{parent}` rule")]
    UnreachableChild {
        /// Category of the parent rule node.
        parent: NodeCategory,
        /// Category of the offending child.
        child: NodeCategory,
    },

    /// A quantifier was given a negative count.
    #[error("quantifier count must not be negative, got {count}")]
    NegativeCount {
        /// The rejected count.
        count: i64,
    },

    /// `less_than(0)` can never be satisfied.
    #[error("`less than 0` can never be satisfied")]
    EmptyUpperBound,

    /// A category name did not match any known category.
    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategory),

    /// A textual pattern failed to compile.
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Compiler message.
        message: String,
    },

    /// A rule definition is incomplete or contradictory.
    #[error("invalid rule `{rule}`: {message}")]
    Invalid {
        /// Name of the rule.
        rule: String,
        /// What is wrong.
        message: String,
    },
}

/// How many siblings of a rule's category must satisfy it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quantifier {
    /// Every sibling of the category must satisfy the rule.
    All,
    /// At least one sibling must satisfy the rule.
    #[default]
    Any,
    /// Exactly `n` siblings satisfy the rule.
    Times(u32),
    /// At least `n` siblings satisfy the rule.
    AtLeast(u32),
    /// At most `n` siblings satisfy the rule.
    AtMost(u32),
}

/// Count-carrying quantifier kinds, used when counts come from untyped input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountKind {
    /// `Times(n)`.
    Times,
    /// `AtLeast(n)`.
    AtLeast,
    /// `AtMost(n)`.
    AtMost,
    /// `AtLeast(n + 1)`.
    MoreThan,
    /// `AtMost(n - 1)`.
    LessThan,
}

impl Quantifier {
    /// Strictly more than `n` siblings.
    #[must_use]
    pub const fn more_than(n: u32) -> Self {
        Self::AtLeast(n.saturating_add(1))
    }

    /// Strictly fewer than `n` siblings.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::EmptyUpperBound`] for `n == 0`.
    pub fn less_than(n: u32) -> Result<Self, RuleError> {
        match n.checked_sub(1) {
            Some(max) => Ok(Self::AtMost(max)),
            None => Err(RuleError::EmptyUpperBound),
        }
    }

    /// Builds a counted quantifier from a signed count.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::NegativeCount`] for negative or oversized counts
    /// and [`RuleError::EmptyUpperBound`] for `less than 0`.
    pub fn from_count(kind: CountKind, count: i64) -> Result<Self, RuleError> {
        let n = u32::try_from(count).map_err(|_| RuleError::NegativeCount { count })?;
        match kind {
            CountKind::Times => Ok(Self::Times(n)),
            CountKind::AtLeast => Ok(Self::AtLeast(n)),
            CountKind::AtMost => Ok(Self::AtMost(n)),
            CountKind::MoreThan => Ok(Self::more_than(n)),
            CountKind::LessThan => Self::less_than(n),
        }
    }

    /// Returns `true` for `Times`, `AtLeast` and `AtMost`.
    #[must_use]
    pub const fn is_counted(self) -> bool {
        matches!(self, Self::Times(_) | Self::AtLeast(_) | Self::AtMost(_))
    }

    /// Returns `true` if `count` satisfying siblings fulfil the quantifier.
    ///
    /// `All` and `Any` are checked eagerly by the matcher and accept any
    /// count here.
    #[must_use]
    pub const fn is_met_by(self, count: u32) -> bool {
        match self {
            Self::All | Self::Any => true,
            Self::Times(n) => count == n,
            Self::AtLeast(n) => count >= n,
            Self::AtMost(n) => count <= n,
        }
    }

    /// Returns `true` once `count` can no longer come back into range.
    #[must_use]
    pub const fn is_exceeded_by(self, count: u32) -> bool {
        match self {
            Self::Times(n) | Self::AtMost(n) => count > n,
            Self::All | Self::Any | Self::AtLeast(_) => false,
        }
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Any => write!(f, "any"),
            Self::Times(n) => write!(f, "exactly {n}"),
            Self::AtLeast(n) => write!(f, "at least {n}"),
            Self::AtMost(n) => write!(f, "at most {n}"),
        }
    }
}

/// Predicate over a host node and the context of the current branch.
pub type Predicate<N> = Arc<dyn Fn(&N, &MatchContext) -> bool + Send + Sync>;

/// Derives context values from a host node that satisfied its rule.
pub type Extractor<N> = Arc<dyn Fn(&N) -> Bindings + Send + Sync>;

/// Builder for one node of a rule tree.
pub struct RuleNode<N> {
    category: NodeCategory,
    quantifier: Quantifier,
    predicate: Option<Predicate<N>>,
    reads_context: bool,
    extractor: Option<Extractor<N>>,
    children: Vec<RuleNode<N>>,
}

impl<N> RuleNode<N> {
    /// Rule node matching any host node of `category`.
    #[must_use]
    pub fn new(category: NodeCategory) -> Self {
        Self {
            category,
            quantifier: Quantifier::default(),
            predicate: None,
            reads_context: false,
            extractor: None,
            children: Vec::new(),
        }
    }

    /// Rule node for a compilation unit.
    #[must_use]
    pub fn file() -> Self {
        Self::new(NodeCategory::File)
    }

    /// Rule node for an import.
    #[must_use]
    pub fn import() -> Self {
        Self::new(NodeCategory::Import)
    }

    /// Rule node for a type declaration.
    #[must_use]
    pub fn type_() -> Self {
        Self::new(NodeCategory::Type)
    }

    /// Rule node for a field or property.
    #[must_use]
    pub fn field() -> Self {
        Self::new(NodeCategory::Field)
    }

    /// Rule node for a method.
    #[must_use]
    pub fn method() -> Self {
        Self::new(NodeCategory::Method)
    }

    /// Rule node for any expression.
    #[must_use]
    pub fn expression() -> Self {
        Self::new(NodeCategory::Expression)
    }

    /// Rule node for a call.
    #[must_use]
    pub fn call_expression() -> Self {
        Self::new(NodeCategory::CallExpression)
    }

    /// Rule node for a `when`/`switch` expression.
    #[must_use]
    pub fn switch_expression() -> Self {
        Self::new(NodeCategory::SwitchExpression)
    }

    /// Sets the quantifier (default: [`Quantifier::Any`]).
    #[must_use]
    pub fn quantifier(mut self, quantifier: Quantifier) -> Self {
        self.quantifier = quantifier;
        self
    }

    /// Requires host nodes to satisfy `predicate`.
    #[must_use]
    pub fn such_that<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&N) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(move |node: &N, _: &MatchContext| predicate(node)));
        self.reads_context = false;
        self
    }

    /// Requires host nodes to satisfy `predicate`, which may read values
    /// extracted earlier in the branch.
    #[must_use]
    pub fn such_that_ctx<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&N, &MatchContext) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self.reads_context = true;
        self
    }

    /// Records values from a satisfying host node for later predicates.
    #[must_use]
    pub fn extract<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&N) -> Bindings + Send + Sync + 'static,
    {
        self.extractor = Some(Arc::new(extractor));
        self
    }

    /// Adds a nested rule matched against the host node's descendants.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Adds several nested rules.
    #[must_use]
    pub fn children<I: IntoIterator<Item = Self>>(mut self, children: I) -> Self {
        self.children.extend(children);
        self
    }
}

impl<N> fmt::Debug for RuleNode<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleNode")
            .field("category", &self.category)
            .field("quantifier", &self.quantifier)
            .field("has_predicate", &self.predicate.is_some())
            .field("has_extractor", &self.extractor.is_some())
            .field("children", &self.children)
            .finish()
    }
}

/// Identity of a compiled rule node inside its [`RuleTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(u32);

impl RuleId {
    /// Wraps a pre-order index.
    #[must_use]
    pub const fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// Pre-order index of the rule node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

pub(crate) struct CompiledRule<N> {
    pub(crate) category: NodeCategory,
    pub(crate) quantifier: Quantifier,
    pub(crate) predicate: Option<Predicate<N>>,
    pub(crate) extractor: Option<Extractor<N>>,
    pub(crate) children: Vec<RuleId>,
}

/// A validated, immutable rule tree.
pub struct RuleTree<N> {
    rules: Vec<CompiledRule<N>>,
    categories: CategorySet,
    reads_context: bool,
}

impl<N> RuleTree<N> {
    /// Validates and compiles a rule tree.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnreachableChild`] if some child rule uses a
    /// category that cannot appear below its parent's category.
    pub fn new(root: RuleNode<N>) -> Result<Self, RuleError> {
        let mut tree = Self {
            rules: Vec::new(),
            categories: CategorySet::new(),
            reads_context: false,
        };
        tree.compile(root)?;
        Ok(tree)
    }

    fn compile(&mut self, node: RuleNode<N>) -> Result<RuleId, RuleError> {
        for child in &node.children {
            if !node.category.may_contain(child.category) {
                return Err(RuleError::UnreachableChild {
                    parent: node.category,
                    child: child.category,
                });
            }
        }

        let id = RuleId(u32::try_from(self.rules.len()).map_err(|_| RuleError::Invalid {
            rule: node.category.to_string(),
            message: "rule tree is too large".to_string(),
        })?);
        self.categories.insert(node.category);
        self.reads_context |= node.reads_context;
        self.rules.push(CompiledRule {
            category: node.category,
            quantifier: node.quantifier,
            predicate: node.predicate,
            extractor: node.extractor,
            children: Vec::new(),
        });

        let mut children = Vec::with_capacity(node.children.len());
        for child in node.children {
            children.push(self.compile(child)?);
        }
        self.rules[id.index()].children = children;
        Ok(id)
    }

    /// Identity of the root rule node.
    #[must_use]
    pub const fn root(&self) -> RuleId {
        RuleId(0)
    }

    /// Every category referenced anywhere in the tree.
    #[must_use]
    pub fn categories(&self) -> CategorySet {
        self.categories
    }

    /// Returns `true` if some predicate reads extracted values. Without
    /// such a predicate, extracted values cannot change any outcome.
    #[must_use]
    pub fn reads_context(&self) -> bool {
        self.reads_context
    }

    /// Quantifier of the root rule node.
    #[must_use]
    pub fn root_quantifier(&self) -> Quantifier {
        self.rules[0].quantifier
    }

    /// Returns `true` if the tree must be matched against all files at
    /// once. A root `Any` only asks for one satisfying file, which is the
    /// same as matching each file on its own.
    #[must_use]
    pub fn is_project_wide(&self) -> bool {
        self.root_quantifier() != Quantifier::Any
    }

    /// Number of rule nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Always `false`: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Category of a rule node.
    #[must_use]
    pub fn category(&self, id: RuleId) -> NodeCategory {
        self.rules[id.index()].category
    }

    /// Quantifier of a rule node.
    #[must_use]
    pub fn quantifier_of(&self, id: RuleId) -> Quantifier {
        self.rules[id.index()].quantifier
    }

    pub(crate) fn rule(&self, id: RuleId) -> &CompiledRule<N> {
        &self.rules[id.index()]
    }
}

impl<N> fmt::Debug for RuleTree<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleTree")
            .field("len", &self.rules.len())
            .field("categories", &self.categories)
            .finish()
    }
}
