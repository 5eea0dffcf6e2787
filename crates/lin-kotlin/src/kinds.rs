//! Tree-sitter kind names and their node categories.
//!
//! Kind names follow `tree-sitter-kotlin-ng`; a few aliases from older Kotlin
//! grammars are accepted so that small grammar renames degrade to "no
//! category" instead of misclassifying nodes.

use lin_core::NodeCategory;
use tree_sitter::Node;

const BINARY: &[&str] = &[
    "binary_expression",
    "additive_expression",
    "multiplicative_expression",
    "comparison_expression",
    "equality_expression",
    "conjunction_expression",
    "disjunction_expression",
    "elvis_expression",
    "infix_expression",
    "range_expression",
    "in_expression",
    "assignment",
];

const WITH_TYPE: &[&str] = &["as_expression", "is_expression", "check_expression"];

const LITERALS: &[&str] = &[
    "string_literal",
    "line_string_literal",
    "multi_line_string_literal",
    "number_literal",
    "integer_literal",
    "long_literal",
    "hex_literal",
    "bin_literal",
    "unsigned_literal",
    "real_literal",
    "float_literal",
    "boolean_literal",
    "character_literal",
    "null_literal",
];

/// Kinds whose bodies hold statements rather than member declarations.
const CODE_BLOCKS: &[&str] = &[
    "function_body",
    "lambda_literal",
    "anonymous_function",
    "anonymous_initializer",
    "secondary_constructor",
    "getter",
    "setter",
    "control_structure_body",
];

/// Kinds whose bodies hold member declarations.
const MEMBER_BLOCKS: &[&str] = &["class_body", "enum_class_body"];

/// Kinds that declare a class-like type.
pub(crate) const TYPE_DECLARATIONS: &[&str] =
    &["class_declaration", "object_declaration", "companion_object"];

const IDENTIFIERS: &[&str] = &["identifier", "simple_identifier", "type_identifier"];

/// Category of a named node, or `None` when no category applies.
///
/// `in_code` is `true` inside function bodies, lambdas and initializers,
/// where a property declaration is a local variable.
pub(crate) fn category_of(node: &Node<'_>, src: &[u8], in_code: bool) -> Option<NodeCategory> {
    if node.is_error() || node.is_missing() {
        return None;
    }
    let kind = node.kind();
    if kind == "binary_expression" {
        if generic_call(node).is_some() {
            return Some(NodeCategory::CallExpression);
        }
        if is_generic_callee(node) {
            return None;
        }
    }
    let category = match kind {
        "source_file" => NodeCategory::File,
        "import" | "import_header" => NodeCategory::Import,
        "class_declaration" | "object_declaration" | "companion_object" => NodeCategory::Type,
        "function_declaration" | "secondary_constructor" => NodeCategory::Method,
        "anonymous_initializer" => NodeCategory::Initializer,
        "property_declaration" if in_code => NodeCategory::LocalVariable,
        "property_declaration" => NodeCategory::Field,
        "class_parameter" if has_token(node, &["val", "var"]) => NodeCategory::Field,
        "class_parameter" | "parameter" | "parameter_with_optional_type" => {
            NodeCategory::Parameter
        }
        "enum_entry" => NodeCategory::EnumConstant,
        "annotation" | "file_annotation" => NodeCategory::Annotation,
        "catch_block" => NodeCategory::CatchClause,
        "call_expression" => NodeCategory::CallExpression,
        "navigation_expression" => NodeCategory::QualifiedReferenceExpression,
        "parenthesized_expression" => NodeCategory::ParenthesizedExpression,
        "prefix_expression" => NodeCategory::PrefixExpression,
        "postfix_expression" => NodeCategory::PostfixExpression,
        "if_expression" => NodeCategory::IfExpression,
        "when_expression" => NodeCategory::SwitchExpression,
        "when_entry" => NodeCategory::SwitchClauseExpression,
        "while_statement" | "while_expression" => NodeCategory::WhileExpression,
        "do_while_statement" | "do_while_expression" => NodeCategory::DoWhileExpression,
        "for_statement" | "for_expression" => NodeCategory::ForEachExpression,
        "try_expression" => NodeCategory::TryExpression,
        "this_expression" => NodeCategory::ThisExpression,
        "super_expression" => NodeCategory::SuperExpression,
        "indexing_expression" => NodeCategory::ArrayAccessExpression,
        "callable_reference" => NodeCategory::CallableReferenceExpression,
        "lambda_literal" | "anonymous_function" => NodeCategory::LambdaExpression,
        "object_literal" => NodeCategory::ObjectLiteralExpression,
        "jump_expression" => jump_category(node, src)?,
        _ if BINARY.contains(&kind) => NodeCategory::BinaryExpression,
        _ if WITH_TYPE.contains(&kind) => NodeCategory::BinaryExpressionWithType,
        _ if LITERALS.contains(&kind) => NodeCategory::LiteralExpression,
        _ => return None,
    };
    Some(category)
}

fn jump_category(node: &Node<'_>, src: &[u8]) -> Option<NodeCategory> {
    let keyword = first_token(node, src)?;
    let category = if keyword.starts_with("throw") {
        NodeCategory::ThrowExpression
    } else if keyword.starts_with("return") {
        NodeCategory::ReturnExpression
    } else if keyword.starts_with("continue") {
        NodeCategory::ContinueExpression
    } else if keyword.starts_with("break") {
        NodeCategory::BreakExpression
    } else {
        return None;
    };
    Some(category)
}

/// Callee and argument list of a call with explicit type arguments.
///
/// The grammar reads `findViewById<View>(id)` as the comparison chain
/// `(findViewById < View) > (id)`; this recognizes that shape and returns
/// the `findViewById` node and the parenthesized arguments.
pub(crate) fn generic_call<'t>(node: &Node<'t>) -> Option<(Node<'t>, Node<'t>)> {
    if node.kind() != "binary_expression" || !has_token(node, &[">"]) {
        return None;
    }
    let [head, args] = <[Node<'t>; 2]>::try_from(named_children(node)).ok()?;
    if args.kind() != "parenthesized_expression" {
        return None;
    }
    let callee = type_argument_head(&head)?;
    Some((callee, args))
}

/// `callee` in `callee < Type`, if the callee can name a function.
fn type_argument_head<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    if node.kind() != "binary_expression" || !has_token(node, &["<"]) {
        return None;
    }
    let [callee, type_arg] = <[Node<'t>; 2]>::try_from(named_children(node)).ok()?;
    let callable = is_identifier(&callee) || callee.kind() == "navigation_expression";
    let type_like = is_identifier(&type_arg)
        || matches!(type_arg.kind(), "user_type" | "navigation_expression");
    (callable && type_like).then_some(callee)
}

/// The `callee < Type` half of a generic call; it is not a comparison.
fn is_generic_callee(node: &Node<'_>) -> bool {
    node.parent().is_some_and(|parent| {
        generic_call(&parent).is_some()
            && named_children(&parent).first().map(Node::id) == Some(node.id())
    })
}

/// Whether the children of `kind` are statements (`Some(true)`), members
/// (`Some(false)`) or inherit the surrounding context (`None`).
pub(crate) fn opens_code(kind: &str) -> Option<bool> {
    if CODE_BLOCKS.contains(&kind) {
        Some(true)
    } else if MEMBER_BLOCKS.contains(&kind) {
        Some(false)
    } else {
        None
    }
}

pub(crate) fn text<'a>(node: &Node<'_>, src: &'a [u8]) -> &'a str {
    std::str::from_utf8(&src[node.start_byte()..node.end_byte()]).unwrap_or("")
}

pub(crate) fn is_identifier(node: &Node<'_>) -> bool {
    IDENTIFIERS.contains(&node.kind())
}

/// Text of the first token (named or not) of `node`.
pub(crate) fn first_token<'a>(node: &Node<'_>, src: &'a [u8]) -> Option<&'a str> {
    let mut cursor = node.walk();
    let first = node.children(&mut cursor).next()?;
    Some(text(&first, src))
}

/// Returns `true` if one of the direct children is an anonymous token in
/// `tokens`.
pub(crate) fn has_token(node: &Node<'_>, tokens: &[&str]) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| !c.is_named() && tokens.contains(&c.kind()));
    found
}

pub(crate) fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| !c.is_extra())
        .collect()
}

pub(crate) fn child_of_kind<'t>(node: &Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    named_children(node)
        .into_iter()
        .find(|c| kinds.contains(&c.kind()))
}

/// Declared name of a declaration: the `name` field, or the first identifier.
pub(crate) fn declared_name(node: &Node<'_>, src: &[u8]) -> Option<String> {
    if let Some(name) = node.child_by_field_name("name") {
        return Some(text(&name, src).to_owned());
    }
    child_of_kind(node, IDENTIFIERS).map(|n| text(&n, src).to_owned())
}

/// Join identifier children of a `qualified_identifier` node with dots.
pub(crate) fn qualified_id(node: &Node<'_>, src: &[u8]) -> String {
    if is_identifier(node) {
        return text(node, src).to_owned();
    }
    named_children(node)
        .iter()
        .filter(|c| is_identifier(c))
        .map(|c| text(c, src))
        .collect::<Vec<_>>()
        .join(".")
}

/// Texts of the `*_modifier` keywords attached to a declaration.
pub(crate) fn modifiers(node: &Node<'_>, src: &[u8]) -> Vec<String> {
    let Some(mods) = child_of_kind(node, &["modifiers"]) else {
        return Vec::new();
    };
    named_children(&mods)
        .iter()
        .filter(|m| m.kind().ends_with("_modifier"))
        .map(|m| text(m, src).trim().to_owned())
        .collect()
}

/// Dotted name of the first user type found under `node`, ignoring type
/// arguments and nullability (`List<String>?` reads as `List`).
pub(crate) fn type_name(node: &Node<'_>, src: &[u8]) -> Option<String> {
    if node.kind() == "type_arguments" || node.kind() == "function_type" {
        return None;
    }
    if node.kind() == "user_type" {
        let mut parts = Vec::new();
        collect_type_segments(node, src, &mut parts);
        return (!parts.is_empty()).then(|| parts.join("."));
    }
    named_children(node)
        .iter()
        .find_map(|c| type_name(c, src))
}

fn collect_type_segments(node: &Node<'_>, src: &[u8], parts: &mut Vec<String>) {
    for child in named_children(node) {
        if child.kind() == "type_arguments" {
            continue;
        }
        if is_identifier(&child) {
            parts.push(text(&child, src).to_owned());
        } else {
            collect_type_segments(&child, src, parts);
        }
    }
}
