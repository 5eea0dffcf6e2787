//! In-memory host tree used by unit tests.

use crate::category::NodeCategory;
use crate::tree::{HostNode, Visibility};
use crate::types::Span;

#[derive(Debug, Clone, Default)]
pub(crate) struct TestNode {
    category: Option<NodeCategory>,
    name: String,
    text: String,
    visibility: Option<Visibility>,
    modifiers: Vec<String>,
    types: Vec<String>,
    line: usize,
    children: Vec<TestNode>,
}

impl TestNode {
    pub(crate) fn new(category: NodeCategory, name: &str) -> Self {
        Self {
            category: Some(category),
            name: name.to_string(),
            text: name.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn uncategorized(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub(crate) fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub(crate) fn modifier(mut self, modifier: &str) -> Self {
        self.modifiers.push(modifier.to_string());
        self
    }

    pub(crate) fn typed(mut self, fqn: &str) -> Self {
        self.types.push(fqn.to_string());
        self
    }

    pub(crate) fn line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    pub(crate) fn child(mut self, child: TestNode) -> Self {
        self.children.push(child);
        self
    }
}

impl HostNode for TestNode {
    fn category(&self) -> Option<NodeCategory> {
        self.category
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn span(&self) -> Span {
        Span {
            line: self.line,
            column: 1,
            offset: 0,
            length: self.text.len(),
        }
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn visibility(&self) -> Option<Visibility> {
        self.visibility
    }

    fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    fn is_subtype_of(&self, fqn: &str) -> bool {
        self.types.iter().any(|t| t == fqn)
    }
}
