//! Generic syntax tree built from a host parse tree.
//!
//! The host parser owns its nodes; a [`SyntaxTree`] only borrows them and
//! keeps the ones whose category is relevant to a rule. Irrelevant host
//! nodes are transparent: their relevant descendants are attached to the
//! nearest kept ancestor, so the matcher only ever sees the shape a rule
//! can talk about.

use crate::category::{CategorySet, NodeCategory};
use crate::types::Span;
use std::collections::HashMap;

/// Declared visibility of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Visible everywhere.
    Public,
    /// Visible within the module.
    Internal,
    /// Visible to subclasses.
    Protected,
    /// Visible within the declaring scope only.
    Private,
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "public" => Ok(Self::Public),
            "internal" => Ok(Self::Internal),
            "protected" => Ok(Self::Protected),
            "private" => Ok(Self::Private),
            other => Err(format!("unknown visibility `{other}`")),
        }
    }
}

/// A node of a host parse tree, as seen by the engine.
///
/// Attribute queries answer conservatively: a fact the host cannot provide
/// reads as absent, and predicates treat absence as "does not match".
pub trait HostNode {
    /// Category of this node, or `None` if no category applies.
    fn category(&self) -> Option<NodeCategory>;

    /// Ordered children of this node.
    fn children(&self) -> &[Self]
    where
        Self: Sized;

    /// Source position of this node.
    fn span(&self) -> Span;

    /// Declared or referenced name.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Source text covered by this node.
    fn text(&self) -> &str {
        ""
    }

    /// Declared visibility, if the node is a declaration.
    fn visibility(&self) -> Option<Visibility> {
        None
    }

    /// Returns `true` if the node carries the given modifier keyword.
    fn has_modifier(&self, _modifier: &str) -> bool {
        false
    }

    /// Returns `true` if the node's resolved type is `fqn` or a subtype of it.
    fn is_subtype_of(&self, _fqn: &str) -> bool {
        false
    }
}

/// Index of a node inside a [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in pre-order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct SyntaxNode<'h, N> {
    host: &'h N,
    category: NodeCategory,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Immutable tree of relevant host nodes in document order.
#[derive(Debug)]
pub struct SyntaxTree<'h, N> {
    nodes: Vec<SyntaxNode<'h, N>>,
    roots: Vec<NodeId>,
    source_ends: Vec<usize>,
}

impl<'h, N> SyntaxTree<'h, N> {
    /// Top-level nodes (one per compilation unit for file-rooted trees).
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Category of a node.
    #[must_use]
    pub fn category(&self, id: NodeId) -> NodeCategory {
        self.nodes[id.0].category
    }

    /// Host node wrapped by a node.
    #[must_use]
    pub fn host(&self, id: NodeId) -> &'h N {
        self.nodes[id.0].host
    }

    /// Ordered children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Parent of a node, `None` for roots.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Top-level ancestor of a node.
    #[must_use]
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Index of the host root (in [`TreeBuilder::add_root`] order) a node
    /// was taken from.
    #[must_use]
    pub fn source_of(&self, id: NodeId) -> usize {
        self.source_ends.partition_point(|&end| end <= id.0)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no host node was kept.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Builds a [`SyntaxTree`] from one or more host roots.
pub struct TreeBuilder<'h, N> {
    categories: CategorySet,
    tree: SyntaxTree<'h, N>,
}

impl<'h, N: HostNode> TreeBuilder<'h, N> {
    /// Creates a builder keeping nodes admitted by `categories`.
    #[must_use]
    pub fn new(categories: CategorySet) -> Self {
        Self {
            categories,
            tree: SyntaxTree {
                nodes: Vec::new(),
                roots: Vec::new(),
                source_ends: Vec::new(),
            },
        }
    }

    /// Appends the relevant part of a host tree.
    ///
    /// Calling this once per file produces a project tree whose roots are
    /// the files in the order they were added.
    #[must_use]
    pub fn add_root(mut self, root: &'h N) -> Self {
        let mut stack: Vec<(&'h N, Option<NodeId>)> = vec![(root, None)];

        while let Some((host, kept_ancestor)) = stack.pop() {
            let attach_to = match host.category() {
                Some(category) if self.categories.admits(category) => {
                    Some(self.push(host, category, kept_ancestor))
                }
                _ => kept_ancestor,
            };
            for child in host.children().iter().rev() {
                stack.push((child, attach_to));
            }
        }

        self.tree.source_ends.push(self.tree.nodes.len());
        self
    }

    /// Finishes the tree.
    #[must_use]
    pub fn build(self) -> SyntaxTree<'h, N> {
        self.tree
    }

    fn push(&mut self, host: &'h N, category: NodeCategory, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.tree.nodes.len());
        self.tree.nodes.push(SyntaxNode {
            host,
            category,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(parent) => self.tree.nodes[parent.0].children.push(id),
            None => self.tree.roots.push(id),
        }
        id
    }
}

/// Lazily built trees over a fixed list of host roots, one per category set.
///
/// Rules with the same categories share a tree; rules with different
/// categories never see each other's nodes, so hoisting is always relative
/// to exactly the categories a pattern names.
pub struct TreeCache<'h, N> {
    roots: Vec<&'h N>,
    trees: HashMap<CategorySet, SyntaxTree<'h, N>>,
}

impl<'h, N: HostNode> TreeCache<'h, N> {
    /// Creates a cache over `roots` (one file, or every file of a project).
    #[must_use]
    pub fn new(roots: Vec<&'h N>) -> Self {
        Self {
            roots,
            trees: HashMap::new(),
        }
    }

    /// Tree keeping the nodes admitted by `categories`, built on first use.
    pub fn tree(&mut self, categories: CategorySet) -> &SyntaxTree<'h, N> {
        let roots = &self.roots;
        self.trees.entry(categories).or_insert_with(|| {
            roots
                .iter()
                .copied()
                .fold(TreeBuilder::new(categories), |builder, root| {
                    builder.add_root(root)
                })
                .build()
        })
    }

    /// Number of trees built so far.
    #[must_use]
    pub fn built(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestNode;
    use NodeCategory as C;

    fn names<N: HostNode>(tree: &SyntaxTree<'_, N>, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .map(|id| tree.host(*id).name().unwrap_or("?").to_string())
            .collect()
    }

    fn sample() -> TestNode {
        TestNode::new(C::File, "file")
            .child(TestNode::new(C::Import, "import"))
            .child(
                TestNode::new(C::Type, "Foo")
                    .child(TestNode::new(C::Field, "a").child(TestNode::new(C::CallExpression, "A")))
                    .child(
                        TestNode::new(C::Method, "run")
                            .child(TestNode::uncategorized("block").child(TestNode::new(C::CallExpression, "B"))),
                    ),
            )
    }

    #[test]
    fn keeps_only_admitted_categories_and_hoists_descendants() {
        let host = sample();
        let set: CategorySet = [C::File, C::CallExpression].into_iter().collect();
        let tree = TreeBuilder::new(set).add_root(&host).build();

        assert_eq!(tree.len(), 3);
        let file = tree.roots()[0];
        assert_eq!(tree.category(file), C::File);
        assert_eq!(names(&tree, tree.children(file)), vec!["A", "B"]);
        for child in tree.children(file) {
            assert_eq!(tree.parent(*child), Some(file));
        }
    }

    #[test]
    fn preserves_nesting_between_kept_nodes() {
        let host = sample();
        let set: CategorySet = [C::File, C::Declaration, C::Expression].into_iter().collect();
        let tree = TreeBuilder::new(set).add_root(&host).build();

        let file = tree.roots()[0];
        assert_eq!(names(&tree, tree.children(file)), vec!["Foo"]);
        let foo = tree.children(file)[0];
        assert_eq!(names(&tree, tree.children(foo)), vec!["a", "run"]);
        let run = tree.children(foo)[1];
        assert_eq!(names(&tree, tree.children(run)), vec!["B"]);
        assert_eq!(tree.root_of(tree.children(run)[0]), file);
    }

    #[test]
    fn missing_root_category_promotes_children_to_roots() {
        let host = sample();
        let set: CategorySet = [C::Type].into_iter().collect();
        let tree = TreeBuilder::new(set).add_root(&host).build();
        assert_eq!(names(&tree, tree.roots()), vec!["Foo"]);
        assert!(tree.children(tree.roots()[0]).is_empty());
    }

    #[test]
    fn multiple_roots_form_a_project_tree() {
        let first = TestNode::new(C::File, "A.kt");
        let second = TestNode::new(C::File, "B.kt");
        let set: CategorySet = [C::File].into_iter().collect();
        let tree = TreeBuilder::new(set)
            .add_root(&first)
            .add_root(&second)
            .build();
        assert_eq!(names(&tree, tree.roots()), vec!["A.kt", "B.kt"]);
        assert_eq!(tree.source_of(tree.roots()[0]), 0);
        assert_eq!(tree.source_of(tree.roots()[1]), 1);
    }

    #[test]
    fn source_of_survives_missing_roots() {
        let first = TestNode::new(C::File, "A.kt");
        let second = TestNode::new(C::File, "B.kt")
            .child(TestNode::new(C::CallExpression, "x"))
            .child(TestNode::new(C::CallExpression, "y"));
        let set: CategorySet = [C::CallExpression].into_iter().collect();
        let tree = TreeBuilder::new(set)
            .add_root(&first)
            .add_root(&second)
            .build();
        assert_eq!(names(&tree, tree.roots()), vec!["x", "y"]);
        assert!(tree.roots().iter().all(|id| tree.source_of(*id) == 1));
    }

    #[test]
    fn cache_shares_trees_per_category_set() {
        let host = sample();
        let mut cache = TreeCache::new(vec![&host]);
        let calls: CategorySet = [C::File, C::CallExpression].into_iter().collect();
        let types: CategorySet = [C::File, C::Type].into_iter().collect();

        assert_eq!(cache.tree(calls).len(), 3);
        assert_eq!(cache.tree(types).len(), 2);
        assert_eq!(cache.tree(calls).len(), 3);
        assert_eq!(cache.built(), 2);
    }

    #[test]
    fn empty_category_set_yields_empty_tree() {
        let host = sample();
        let tree = TreeBuilder::new(CategorySet::new()).add_root(&host).build();
        assert!(tree.is_empty());
        assert!(tree.roots().is_empty());
    }
}
