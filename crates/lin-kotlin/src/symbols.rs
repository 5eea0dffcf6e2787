//! Name resolution for one Kotlin file.

use crate::kinds::{self, TYPE_DECLARATIONS};
use crate::types::{ancestors_with, TypeFacts, TypeRef};
use std::collections::HashMap;
use tree_sitter::Node;

/// Classes declared in the file being converted.
#[derive(Debug, Clone, Default)]
struct LocalClass {
    qualified: String,
    /// Supertype names as written; resolved lazily.
    supertypes: Vec<String>,
    is_enum: bool,
    is_sealed: bool,
}

/// Resolves simple type names against a file's imports, its package, its own
/// class declarations and the shared [`TypeFacts`].
pub(crate) struct Resolver<'f> {
    facts: &'f TypeFacts,
    package: Option<String>,
    imports: HashMap<String, String>,
    wildcards: Vec<String>,
    classes: HashMap<String, LocalClass>,
}

impl<'f> Resolver<'f> {
    /// Scans `root` for the package header, imports and class declarations.
    pub(crate) fn scan(root: &Node<'_>, src: &[u8], facts: &'f TypeFacts) -> Self {
        let mut resolver = Self {
            facts,
            package: None,
            imports: HashMap::new(),
            wildcards: Vec::new(),
            classes: HashMap::new(),
        };
        for child in kinds::named_children(root) {
            match child.kind() {
                "package_header" => {
                    resolver.package = kinds::child_of_kind(&child, &["qualified_identifier"])
                        .map(|q| kinds::qualified_id(&q, src));
                }
                "import" | "import_header" => resolver.add_import(&child, src),
                "import_list" => {
                    for import in kinds::named_children(&child) {
                        resolver.add_import(&import, src);
                    }
                }
                _ => {}
            }
        }
        let prefix = resolver.package.clone();
        resolver.scan_classes(root, src, prefix.as_deref());
        resolver
    }

    fn add_import(&mut self, node: &Node<'_>, src: &[u8]) {
        let import = ImportParts::of(node, src);
        if import.wildcard {
            self.wildcards.push(import.path);
            return;
        }
        let key = import.alias.unwrap_or_else(|| last_segment(&import.path).to_owned());
        self.imports.insert(key, import.path);
    }

    fn scan_classes(&mut self, root: &Node<'_>, src: &[u8], outer: Option<&str>) {
        let mut stack: Vec<(Node<'_>, Option<String>)> = kinds::named_children(root)
            .into_iter()
            .rev()
            .map(|c| (c, outer.map(str::to_owned)))
            .collect();
        while let Some((node, outer)) = stack.pop() {
            let inner = if TYPE_DECLARATIONS.contains(&node.kind()) {
                let name =
                    kinds::declared_name(&node, src).unwrap_or_else(|| "Companion".to_owned());
                let qualified = match &outer {
                    Some(outer) => format!("{outer}.{name}"),
                    None => name.clone(),
                };
                let modifiers = kinds::modifiers(&node, src);
                self.classes.insert(
                    name,
                    LocalClass {
                        qualified: qualified.clone(),
                        supertypes: written_supertypes(&node, src),
                        is_enum: modifiers.iter().any(|m| m == "enum"),
                        is_sealed: modifiers.iter().any(|m| m == "sealed"),
                    },
                );
                Some(qualified)
            } else {
                outer
            };
            for child in kinds::named_children(&node).into_iter().rev() {
                stack.push((child, inner.clone()));
            }
        }
    }

    pub(crate) fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Fully qualified name for a type name as written in this file.
    pub(crate) fn resolve(&self, written: &str) -> String {
        let (head, rest) = match written.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (written, None),
        };
        if rest.is_some() && head.starts_with(|c: char| c.is_ascii_lowercase()) {
            // Already qualified (`java.util.Date`).
            return written.to_owned();
        }
        let head = self.resolve_simple(head);
        match rest {
            Some(rest) => format!("{head}.{rest}"),
            None => head,
        }
    }

    fn resolve_simple(&self, name: &str) -> String {
        if let Some(path) = self.imports.get(name) {
            return path.clone();
        }
        if let Some(class) = self.classes.get(name) {
            return class.qualified.clone();
        }
        for package in &self.wildcards {
            let candidate = format!("{package}.{name}");
            if self.facts.is_known(&candidate) {
                return candidate;
            }
        }
        for implicit in ["kotlin", "java.lang"] {
            let candidate = format!("{implicit}.{name}");
            if self.facts.is_known(&candidate) {
                return candidate;
            }
        }
        match &self.package {
            Some(package) => format!("{package}.{name}"),
            None => name.to_owned(),
        }
    }

    /// Resolves a written type name and attaches its transitive supertypes.
    pub(crate) fn type_ref(&self, written: &str) -> TypeRef {
        let qualified = self.resolve(written);
        let supertypes = self.ancestors(&qualified);
        TypeRef::new(qualified, supertypes)
    }

    /// Resolved direct supertypes of a type declared in this file, or the
    /// known supertypes of a library type.
    pub(crate) fn direct_supertypes(&self, qualified: &str) -> Vec<String> {
        match self.local(qualified) {
            Some(class) => class.supertypes.iter().map(|s| self.resolve(s)).collect(),
            None => self.facts.direct_supertypes(qualified).to_vec(),
        }
    }

    fn ancestors(&self, qualified: &str) -> Vec<String> {
        ancestors_with(qualified, |ty| self.direct_supertypes(ty))
    }

    fn local(&self, qualified: &str) -> Option<&LocalClass> {
        self.classes
            .get(last_segment(qualified))
            .filter(|c| c.qualified == qualified)
    }

    /// Returns `true` if `ty` is an enum or sealed class declared in this
    /// file, or inherits from a sealed class declared in this file.
    pub(crate) fn is_enum_or_sealed(&self, ty: &TypeRef) -> bool {
        std::iter::once(ty.qualified())
            .chain(ty.supertypes().iter().map(String::as_str))
            .filter_map(|q| self.local(q))
            .any(|c| c.is_enum || c.is_sealed)
    }
}

/// Path, alias and wildcard flag of an import header.
pub(crate) struct ImportParts {
    pub(crate) path: String,
    pub(crate) alias: Option<String>,
    pub(crate) wildcard: bool,
}

impl ImportParts {
    pub(crate) fn of(node: &Node<'_>, src: &[u8]) -> Self {
        let children = kinds::named_children(node);
        let mut rest = children
            .iter()
            .skip_while(|c| !matches!(c.kind(), "qualified_identifier" | "identifier"));
        let path = rest
            .next()
            .map(|q| kinds::qualified_id(q, src))
            .unwrap_or_default();
        // `import a.b.C as D` puts `D` right after the path; older grammars
        // wrap it in `import_alias`.
        let alias = rest
            .find(|c| kinds::is_identifier(c))
            .map(|a| kinds::text(a, src).to_owned())
            .or_else(|| {
                kinds::child_of_kind(node, &["import_alias"])
                    .and_then(|a| kinds::declared_name(&a, src))
            });
        let wildcard = kinds::text(node, src).trim_end().ends_with('*');
        Self {
            path,
            alias,
            wildcard,
        }
    }
}

/// Supertype names from a class header's delegation specifiers.
pub(crate) fn written_supertypes(node: &Node<'_>, src: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    for child in kinds::named_children(node) {
        match child.kind() {
            "delegation_specifiers" => {
                for spec in kinds::named_children(&child) {
                    out.extend(kinds::type_name(&spec, src));
                }
            }
            "delegation_specifier" => out.extend(kinds::type_name(&child, src)),
            _ => {}
        }
    }
    out
}

fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Lexical scopes of value names and the classes enclosing the current node.
#[derive(Debug, Default)]
pub(crate) struct Scopes {
    frames: Vec<HashMap<String, TypeRef>>,
    classes: Vec<TypeRef>,
}

impl Scopes {
    pub(crate) fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub(crate) fn pop(&mut self) {
        self.frames.pop();
    }

    pub(crate) fn declare(&mut self, name: impl Into<String>, ty: TypeRef) {
        if self.frames.is_empty() {
            self.push();
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), ty);
        }
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<&TypeRef> {
        self.frames.iter().rev().find_map(|f| f.get(name))
    }

    pub(crate) fn enter_class(&mut self, ty: TypeRef) {
        self.classes.push(ty);
        self.push();
    }

    pub(crate) fn exit_class(&mut self) {
        self.pop();
        self.classes.pop();
    }

    pub(crate) fn enclosing_class(&self) -> Option<&TypeRef> {
        self.classes.last()
    }
}
