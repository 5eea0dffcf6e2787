//! Owned Kotlin host tree.

use crate::types::TypeRef;
use lin_core::{HostNode, NodeCategory, Span, Visibility};
use std::ops::Range;
use std::sync::Arc;

/// One node of a parsed Kotlin file, with the facts rules ask about already
/// resolved.
///
/// Every named tree-sitter node becomes a `KotlinNode`; nodes whose kind has
/// no category are kept too (with `category() == None`) so that their
/// descendants stay reachable.
#[derive(Debug, Clone)]
pub struct KotlinNode {
    pub(crate) kind: &'static str,
    pub(crate) category: Option<NodeCategory>,
    pub(crate) name: Option<String>,
    pub(crate) visibility: Option<Visibility>,
    pub(crate) modifiers: Vec<String>,
    pub(crate) ty: Option<TypeRef>,
    pub(crate) receiver: Option<TypeRef>,
    pub(crate) supertypes: Vec<String>,
    pub(crate) is_constructor_call: bool,
    pub(crate) is_wildcard: bool,
    pub(crate) has_else_branch: bool,
    pub(crate) subject_is_enum_or_sealed: bool,
    pub(crate) span: Span,
    pub(crate) range: Range<usize>,
    pub(crate) source: Arc<str>,
    pub(crate) children: Vec<KotlinNode>,
}

impl KotlinNode {
    pub(crate) fn new(kind: &'static str, span: Span, source: Arc<str>) -> Self {
        Self {
            kind,
            category: None,
            name: None,
            visibility: None,
            modifiers: Vec::new(),
            ty: None,
            receiver: None,
            supertypes: Vec::new(),
            is_constructor_call: false,
            is_wildcard: false,
            has_else_branch: false,
            subject_is_enum_or_sealed: false,
            range: span.offset..span.offset + span.length,
            span,
            source,
            children: Vec::new(),
        }
    }

    /// Tree-sitter kind (e.g., `call_expression`).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Modifier keywords (`private`, `const`, `override`, ...).
    #[must_use]
    pub fn modifiers(&self) -> &[String] {
        &self.modifiers
    }

    /// Resolved type: the declared type of a variable, the class of a type
    /// declaration, the constructed class of a constructor call.
    #[must_use]
    pub fn ty(&self) -> Option<&TypeRef> {
        self.ty.as_ref()
    }

    /// Receiver type of a call, explicit or implied by the enclosing class.
    #[must_use]
    pub fn receiver(&self) -> Option<&TypeRef> {
        self.receiver.as_ref()
    }

    /// Returns `true` if the call has a receiver of type `fqn` or a subtype.
    #[must_use]
    pub fn receiver_is_a(&self, fqn: &str) -> bool {
        self.receiver.as_ref().is_some_and(|r| r.is_a(fqn))
    }

    /// Resolved direct supertypes of a type declaration.
    #[must_use]
    pub fn supertypes(&self) -> &[String] {
        &self.supertypes
    }

    /// `true` for calls that construct an object (`Gson()`).
    #[must_use]
    pub fn is_constructor_call(&self) -> bool {
        self.is_constructor_call
    }

    /// `true` for star imports.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.is_wildcard
    }

    /// `true` for a `when` with an `else` entry.
    #[must_use]
    pub fn has_else_branch(&self) -> bool {
        self.has_else_branch
    }

    /// `true` for a `when` whose subject is an enum or sealed class value.
    #[must_use]
    pub fn subject_is_enum_or_sealed(&self) -> bool {
        self.subject_is_enum_or_sealed
    }

    /// Iterates over this node and its descendants in pre-order.
    pub fn descendants(&self) -> impl Iterator<Item = &KotlinNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

impl Drop for KotlinNode {
    // Default drop glue recurses once per tree level.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

impl HostNode for KotlinNode {
    fn category(&self) -> Option<NodeCategory> {
        self.category
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn span(&self) -> Span {
        self.span
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn text(&self) -> &str {
        self.source.get(self.range.clone()).unwrap_or("")
    }

    fn visibility(&self) -> Option<Visibility> {
        self.visibility
    }

    fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    fn is_subtype_of(&self, fqn: &str) -> bool {
        self.ty.as_ref().is_some_and(|t| t.is_a(fqn))
    }
}
