//! Kotlin front end: tree-sitter parse tree to [`KotlinNode`]s.

use crate::kinds::{self, TYPE_DECLARATIONS};
use crate::node::KotlinNode;
use crate::symbols::{written_supertypes, ImportParts, Resolver, Scopes};
use crate::types::{TypeFacts, TypeRef};
use lin_core::{Config, Frontend, NodeCategory, ParseError, Span, Visibility};
use std::sync::Arc;
use tracing::debug;
use tree_sitter::{Language, Node, Parser};

/// Kinds that open a scope for value names.
const FRAME_KINDS: &[&str] = &[
    "function_declaration",
    "secondary_constructor",
    "anonymous_initializer",
    "lambda_literal",
    "anonymous_function",
    "block",
    "catch_block",
    "for_statement",
    "getter",
    "setter",
];

/// Parses Kotlin sources with tree-sitter and resolves the facts rules need.
pub struct KotlinFrontend {
    language: Language,
    facts: TypeFacts,
    strict: bool,
}

impl KotlinFrontend {
    /// Creates a front end with the bundled type facts.
    #[must_use]
    pub fn new() -> Self {
        Self::with_type_facts(TypeFacts::default())
    }

    /// Creates a front end with the given type facts.
    #[must_use]
    pub fn with_type_facts(facts: TypeFacts) -> Self {
        Self {
            language: tree_sitter_kotlin_ng::LANGUAGE.into(),
            facts,
            strict: false,
        }
    }

    /// Creates a front end with the bundled facts plus `[types]` from `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::with_type_facts(TypeFacts::default().with_config(&config.types))
    }

    /// Rejects sources with syntax errors instead of keeping the partial tree.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Type facts used for resolution.
    #[must_use]
    pub fn facts(&self) -> &TypeFacts {
        &self.facts
    }
}

impl Default for KotlinFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for KotlinFrontend {
    type Node = KotlinNode;

    fn language_id(&self) -> &'static str {
        "kotlin"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".kt", ".kts"]
    }

    fn parse(&self, source: &str) -> Result<KotlinNode, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ParseError::new(format!("failed to set kotlin language: {e}")))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError::new("parser produced no tree"))?;
        let root = tree.root_node();

        if root.has_error() {
            let line = first_error_line(&root).unwrap_or(1);
            if self.strict {
                return Err(ParseError::new("syntax error").at_line(line));
            }
            debug!(line, "Keeping partial tree for source with syntax errors");
        }

        let shared: Arc<str> = Arc::from(source);
        let src = source.as_bytes();
        let mut converter = Converter {
            src,
            source: shared,
            resolver: Resolver::scan(&root, src, &self.facts),
            scopes: Scopes::default(),
        };
        Ok(converter.convert(&root))
    }
}

fn first_error_line(root: &Node<'_>) -> Option<usize> {
    let mut stack = vec![*root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row + 1);
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).filter(|c| c.has_error()).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

fn span_of(node: &Node<'_>) -> Span {
    let start = node.start_position();
    Span {
        line: start.row + 1,
        column: start.column + 1,
        offset: node.start_byte(),
        length: node.end_byte() - node.start_byte(),
    }
}

fn visibility_of(modifiers: &[String]) -> Option<Visibility> {
    modifiers.iter().find_map(|m| m.parse().ok())
}

fn starts_uppercase(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase())
}

/// `TODO()` and friends are functions, not constructors.
fn looks_like_class(name: &str) -> bool {
    starts_uppercase(name) && name.chars().any(|c| c.is_ascii_lowercase())
}

#[derive(Default)]
struct CallFacts {
    name: Option<String>,
    receiver: Option<TypeRef>,
    constructed: Option<TypeRef>,
}

struct Converter<'s, 'f> {
    src: &'s [u8],
    source: Arc<str>,
    resolver: Resolver<'f>,
    scopes: Scopes,
}

/// What to undo in [`Scopes`] once a node's children are converted.
#[derive(Clone, Copy)]
enum Leave {
    Class,
    Frame,
    Nothing,
}

/// A node whose children are still being converted.
struct Pending<'t> {
    out: KotlinNode,
    children: std::vec::IntoIter<Node<'t>>,
    in_code: bool,
    leave: Leave,
}

impl Converter<'_, '_> {
    /// Converts the tree under `root` without recursing, so deeply nested
    /// expressions cannot exhaust the stack.
    fn convert(&mut self, root: &Node<'_>) -> KotlinNode {
        let mut current = self.enter(root, false);
        let mut parents = Vec::new();
        loop {
            if let Some(child) = current.children.next() {
                let entered = self.enter(&child, current.in_code);
                parents.push(std::mem::replace(&mut current, entered));
                continue;
            }
            match current.leave {
                Leave::Class => self.scopes.exit_class(),
                Leave::Frame => self.scopes.pop(),
                Leave::Nothing => {}
            }
            match parents.pop() {
                Some(mut parent) => {
                    parent.out.children.push(current.out);
                    current = parent;
                }
                None => return current.out,
            }
        }
    }

    fn enter<'t>(&mut self, node: &Node<'t>, in_code: bool) -> Pending<'t> {
        let kind = node.kind();
        let mut out = KotlinNode::new(kind, span_of(node), Arc::clone(&self.source));
        out.category = kinds::category_of(node, self.src, in_code);

        let leave = if TYPE_DECLARATIONS.contains(&kind) {
            let name = kinds::declared_name(node, self.src).unwrap_or_else(|| "Companion".into());
            let ty = self.resolver.type_ref(&name);
            self.scopes.enter_class(ty);
            self.declare_members(node);
            Leave::Class
        } else if FRAME_KINDS.contains(&kind) {
            self.scopes.push();
            Leave::Frame
        } else {
            Leave::Nothing
        };

        self.describe(node, &mut out);

        let children: Vec<_> = kinds::named_children(node)
            .into_iter()
            .filter(|c| !c.is_missing())
            .collect();
        out.children.reserve(children.len());
        Pending {
            out,
            children: children.into_iter(),
            in_code: kinds::opens_code(kind).unwrap_or(in_code),
            leave,
        }
    }

    /// Fills in the attributes of `out` and declares the names it introduces.
    fn describe(&mut self, node: &Node<'_>, out: &mut KotlinNode) {
        let src = self.src;
        match node.kind() {
            "source_file" => out.name = self.resolver.package().map(str::to_owned),
            "import" | "import_header" => {
                let import = ImportParts::of(node, src);
                out.is_wildcard = import.wildcard;
                out.name = Some(import.path);
            }
            "class_declaration" | "object_declaration" | "companion_object" => {
                self.describe_declaration(node, out);
                out.ty = self.scopes.enclosing_class().cloned();
                out.supertypes = written_supertypes(node, src)
                    .iter()
                    .map(|s| self.resolver.resolve(s))
                    .collect();
            }
            "function_declaration" | "enum_entry" => self.describe_declaration(node, out),
            "secondary_constructor" => {
                self.describe_declaration(node, out);
                out.name = Some("constructor".to_owned());
            }
            "property_declaration" => {
                self.describe_declaration(node, out);
                let (name, ty) = self.property_signature(node);
                out.name = name;
                out.ty = ty;
                self.declare(out);
            }
            "class_parameter" | "parameter" | "parameter_with_optional_type" | "catch_block" => {
                self.describe_declaration(node, out);
                out.ty = self.declared_type(node);
                self.declare(out);
            }
            "annotation" | "file_annotation" => {
                out.name = kinds::type_name(node, src)
                    .or_else(|| Some(kinds::text(node, src).trim_start_matches('@').to_owned()));
            }
            "call_expression" => self.describe_call(node, out),
            "binary_expression" if out.category == Some(NodeCategory::CallExpression) => {
                self.describe_call(node, out);
            }
            "navigation_expression" => {
                out.name = navigation_parts(node, src).map(|(_, member)| member);
                out.ty = self.expr_type(node);
            }
            "when_expression" => self.describe_when(node, out),
            _ => {}
        }
        if out.category.is_some_and(|c| c.is_a(NodeCategory::Declaration))
            && out.category != Some(NodeCategory::LocalVariable)
            && out.category != Some(NodeCategory::Parameter)
            && out.visibility.is_none()
        {
            out.visibility = Some(Visibility::Public);
        }
    }

    fn describe_declaration(&self, node: &Node<'_>, out: &mut KotlinNode) {
        out.name = kinds::declared_name(node, self.src);
        out.modifiers = kinds::modifiers(node, self.src);
        out.visibility = visibility_of(&out.modifiers);
    }

    fn declare(&mut self, out: &KotlinNode) {
        if let (Some(name), Some(ty)) = (&out.name, &out.ty) {
            self.scopes.declare(name.clone(), ty.clone());
        }
    }

    /// Pre-declares the properties of a class body so that members can refer
    /// to properties declared further down.
    fn declare_members(&mut self, class: &Node<'_>) {
        let Some(body) = kinds::child_of_kind(class, &["class_body", "enum_class_body"]) else {
            return;
        };
        for member in kinds::named_children(&body) {
            if member.kind() != "property_declaration" {
                continue;
            }
            if let (Some(name), Some(ty)) = self.property_signature(&member) {
                self.scopes.declare(name, ty);
            }
        }
    }

    /// Name and type of a property: the declared type, else the type of a
    /// constructor-call initializer.
    fn property_signature(&self, node: &Node<'_>) -> (Option<String>, Option<TypeRef>) {
        let src = self.src;
        let Some(var) = kinds::child_of_kind(node, &["variable_declaration"]) else {
            return (None, None);
        };
        let name = kinds::declared_name(&var, src);
        let declared = kinds::named_children(&var)
            .iter()
            .filter(|c| !kinds::is_identifier(c))
            .find_map(|c| kinds::type_name(c, src))
            .map(|t| self.resolver.type_ref(&t));
        let ty = declared.or_else(|| {
            kinds::named_children(node)
                .iter()
                .skip_while(|c| c.kind() != "variable_declaration")
                .skip(1)
                .find(|c| !matches!(c.kind(), "getter" | "setter" | "property_delegate"))
                .and_then(|init| self.expr_type(init))
        });
        (name, ty)
    }

    /// Declared type of a parameter-like node.
    fn declared_type(&self, node: &Node<'_>) -> Option<TypeRef> {
        kinds::named_children(node)
            .iter()
            .filter(|c| !kinds::is_identifier(c) && c.kind() != "modifiers")
            .filter(|c| c.kind() != "block")
            .find_map(|c| kinds::type_name(c, self.src))
            .map(|t| self.resolver.type_ref(&t))
    }

    fn describe_call(&self, node: &Node<'_>, out: &mut KotlinNode) {
        let call = self.call_facts(node);
        out.name = call.name;
        out.receiver = call.receiver;
        out.is_constructor_call = call.constructed.is_some();
        out.ty = call.constructed;
    }

    fn call_facts(&self, node: &Node<'_>) -> CallFacts {
        let src = self.src;
        let mut call = CallFacts::default();
        let callee = match kinds::generic_call(node) {
            Some((callee, _)) => Some(callee),
            None => kinds::named_children(node).into_iter().next(),
        };
        let Some(callee) = callee else {
            return call;
        };
        if kinds::is_identifier(&callee) {
            let name = kinds::text(&callee, src);
            if looks_like_class(name) {
                call.constructed = Some(self.resolver.type_ref(name));
            } else {
                call.receiver = self.scopes.enclosing_class().cloned();
            }
            call.name = Some(name.to_owned());
        } else if callee.kind() == "navigation_expression" {
            let Some((receiver, member)) = navigation_parts(&callee, src) else {
                return call;
            };
            let receiver_text = kinds::text(&receiver, src);
            if looks_like_class(&member) && is_package_path(receiver_text) {
                call.constructed = Some(self.resolver.type_ref(&format!("{receiver_text}.{member}")));
            } else {
                call.receiver = self.expr_type(&receiver);
            }
            call.name = Some(member);
        }
        call
    }

    fn describe_when(&self, node: &Node<'_>, out: &mut KotlinNode) {
        let entries: Vec<_> = kinds::named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "when_entry")
            .collect();
        out.has_else_branch = entries.iter().any(|e| kinds::has_token(e, &["else"]));

        let Some(subject) = kinds::child_of_kind(node, &["when_subject"]) else {
            return;
        };
        let subject_type = kinds::named_children(&subject)
            .last()
            .and_then(|expr| self.expr_type(expr));
        out.subject_is_enum_or_sealed = match subject_type {
            Some(ty) if self.resolver.is_enum_or_sealed(&ty) => true,
            Some(ty) if !ty.supertypes().is_empty() => false,
            // Unknown subject type: judge by what the entries test against.
            _ => entries
                .iter()
                .flat_map(|e| kinds::named_children(e))
                .filter(|c| c.kind() != "control_structure_body")
                .any(|cond| self.condition_names_enum_or_sealed(&cond)),
        };
    }

    /// `Color.RED` for a local enum, `is Circle` for a local sealed family.
    fn condition_names_enum_or_sealed(&self, cond: &Node<'_>) -> bool {
        let src = self.src;
        if let Some(t) = kinds::type_name(cond, src) {
            if self.resolver.is_enum_or_sealed(&self.resolver.type_ref(&t)) {
                return true;
            }
        }
        let mut stack = vec![*cond];
        while let Some(n) = stack.pop() {
            if n.kind() == "navigation_expression" {
                if let Some((receiver, _)) = navigation_parts(&n, src) {
                    let name = kinds::text(&receiver, src);
                    if starts_uppercase(name)
                        && self.resolver.is_enum_or_sealed(&self.resolver.type_ref(name))
                    {
                        return true;
                    }
                }
            }
            stack.extend(kinds::named_children(&n));
        }
        false
    }

    /// Best-effort static type of an expression.
    fn expr_type(&self, node: &Node<'_>) -> Option<TypeRef> {
        let src = self.src;
        match node.kind() {
            _ if kinds::is_identifier(node) => {
                let name = kinds::text(node, src);
                self.scopes.lookup(name).cloned().or_else(|| {
                    looks_like_class(name).then(|| self.resolver.type_ref(name))
                })
            }
            "this_expression" | "super_expression" => self.scopes.enclosing_class().cloned(),
            "parenthesized_expression" | "postfix_expression" => kinds::named_children(node)
                .first()
                .and_then(|inner| self.expr_type(inner)),
            "call_expression" => self.call_facts(node).constructed,
            "binary_expression" if kinds::generic_call(node).is_some() => {
                self.call_facts(node).constructed
            }
            "navigation_expression" => {
                let (receiver, member) = navigation_parts(node, src)?;
                if receiver.kind() == "this_expression" {
                    return self.scopes.lookup(&member).cloned();
                }
                let text = kinds::text(node, src);
                (looks_like_class(&member) && is_package_path(kinds::text(&receiver, src)))
                    .then(|| self.resolver.type_ref(text))
            }
            "as_expression" => kinds::named_children(node)
                .last()
                .and_then(|t| kinds::type_name(t, src))
                .map(|t| self.resolver.type_ref(&t)),
            "string_literal" => Some(self.resolver.type_ref("String")),
            _ => None,
        }
    }
}

/// Receiver and member name of `receiver.member`.
fn navigation_parts<'t>(node: &Node<'t>, src: &[u8]) -> Option<(Node<'t>, String)> {
    let children = kinds::named_children(node);
    if children.len() < 2 {
        return None;
    }
    let receiver = children[0];
    let last = children[children.len() - 1];
    let member = if kinds::is_identifier(&last) {
        last
    } else {
        kinds::named_children(&last)
            .into_iter()
            .rev()
            .find(kinds::is_identifier)?
    };
    Some((receiver, kinds::text(&member, src).to_owned()))
}

/// `java.util` in `java.util.Date()`.
fn is_package_path(text: &str) -> bool {
    !text.is_empty()
        && text.split('.').all(|segment| {
            segment.starts_with(|c: char| c.is_ascii_lowercase())
                && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}
