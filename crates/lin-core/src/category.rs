//! Closed vocabulary of syntax node categories.
//!
//! Every syntax tree node and every rule node carries exactly one
//! [`NodeCategory`]. Membership is checked with [`NodeCategory::is_a`], which
//! walks a hand-written ancestor table: a `CallExpression` node also matches
//! a rule written for `Expression`, an `EnumConstant` also matches `Field`,
//! `Variable` and `Declaration`.

use std::fmt;
use std::str::FromStr;

/// Category of a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeCategory {
    /// A compilation unit.
    File,
    /// An import statement.
    Import,
    /// Any declaration.
    Declaration,
    /// A class, interface or object declaration.
    Type,
    /// An initializer block.
    Initializer,
    /// A function, method or constructor.
    Method,
    /// Any variable-like declaration.
    Variable,
    /// A method or constructor parameter.
    Parameter,
    /// A property or field declared on a type or at top level.
    Field,
    /// A variable local to a function body.
    LocalVariable,
    /// An enum entry.
    EnumConstant,
    /// An annotation usage.
    Annotation,
    /// A `catch` clause of a try expression.
    CatchClause,
    /// Any expression.
    Expression,
    /// A function, method or constructor call.
    CallExpression,
    /// A dotted reference such as `a.b.c`.
    QualifiedReferenceExpression,
    /// A binary operation, including assignment.
    BinaryExpression,
    /// A type test or cast such as `x is T` or `x as T`.
    BinaryExpressionWithType,
    /// An expression in parentheses.
    ParenthesizedExpression,
    /// Any unary operation.
    UnaryExpression,
    /// A prefix operation such as `!x` or `++x`.
    PrefixExpression,
    /// A postfix operation such as `x++` or `x!!`.
    PostfixExpression,
    /// An `if` expression.
    IfExpression,
    /// A `when`/`switch` expression.
    SwitchExpression,
    /// One branch of a switch expression.
    SwitchClauseExpression,
    /// A `while` loop.
    WhileExpression,
    /// A `do ... while` loop.
    DoWhileExpression,
    /// A `for (x in xs)` loop.
    ForEachExpression,
    /// A `try` expression.
    TryExpression,
    /// A literal value.
    LiteralExpression,
    /// `this`.
    ThisExpression,
    /// `super`.
    SuperExpression,
    /// A `return` jump.
    ReturnExpression,
    /// A `break` jump.
    BreakExpression,
    /// A `continue` jump.
    ContinueExpression,
    /// A `throw` jump.
    ThrowExpression,
    /// An indexing expression such as `a[i]`.
    ArrayAccessExpression,
    /// A callable reference such as `Foo::bar`.
    CallableReferenceExpression,
    /// A lambda literal.
    LambdaExpression,
    /// An anonymous object literal.
    ObjectLiteralExpression,
}

impl NodeCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 40] = [
        Self::File,
        Self::Import,
        Self::Declaration,
        Self::Type,
        Self::Initializer,
        Self::Method,
        Self::Variable,
        Self::Parameter,
        Self::Field,
        Self::LocalVariable,
        Self::EnumConstant,
        Self::Annotation,
        Self::CatchClause,
        Self::Expression,
        Self::CallExpression,
        Self::QualifiedReferenceExpression,
        Self::BinaryExpression,
        Self::BinaryExpressionWithType,
        Self::ParenthesizedExpression,
        Self::UnaryExpression,
        Self::PrefixExpression,
        Self::PostfixExpression,
        Self::IfExpression,
        Self::SwitchExpression,
        Self::SwitchClauseExpression,
        Self::WhileExpression,
        Self::DoWhileExpression,
        Self::ForEachExpression,
        Self::TryExpression,
        Self::LiteralExpression,
        Self::ThisExpression,
        Self::SuperExpression,
        Self::ReturnExpression,
        Self::BreakExpression,
        Self::ContinueExpression,
        Self::ThrowExpression,
        Self::ArrayAccessExpression,
        Self::CallableReferenceExpression,
        Self::LambdaExpression,
        Self::ObjectLiteralExpression,
    ];

    /// Returns the direct ancestor of this category, if any.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::File
            | Self::Import
            | Self::Declaration
            | Self::Annotation
            | Self::CatchClause
            | Self::Expression => None,
            Self::Type | Self::Initializer | Self::Method | Self::Variable => {
                Some(Self::Declaration)
            }
            Self::Parameter | Self::Field | Self::LocalVariable => Some(Self::Variable),
            Self::EnumConstant => Some(Self::Field),
            Self::PrefixExpression | Self::PostfixExpression => Some(Self::UnaryExpression),
            _ => Some(Self::Expression),
        }
    }

    /// Returns `true` if `self` is `other` or derives from it.
    #[must_use]
    pub fn is_a(self, other: Self) -> bool {
        self.ancestors().any(|c| c == other)
    }

    /// Iterates over `self` and then each ancestor up to the root category.
    pub fn ancestors(self) -> impl Iterator<Item = Self> {
        std::iter::successors(Some(self), |c| c.parent())
    }

    /// Returns `true` if a node of category `child` can appear anywhere
    /// below a node of category `self`.
    #[must_use]
    pub fn may_contain(self, child: Self) -> bool {
        if child == Self::File {
            return false;
        }
        match self {
            Self::File => true,
            Self::Import
            | Self::ThisExpression
            | Self::SuperExpression
            | Self::BreakExpression
            | Self::ContinueExpression => false,
            Self::Annotation => child.is_a(Self::Expression),
            _ => child != Self::Import,
        }
    }

    /// Stable kebab-case name, as used in configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Import => "import",
            Self::Declaration => "declaration",
            Self::Type => "type",
            Self::Initializer => "initializer",
            Self::Method => "method",
            Self::Variable => "variable",
            Self::Parameter => "parameter",
            Self::Field => "field",
            Self::LocalVariable => "local-variable",
            Self::EnumConstant => "enum-constant",
            Self::Annotation => "annotation",
            Self::CatchClause => "catch-clause",
            Self::Expression => "expression",
            Self::CallExpression => "call-expression",
            Self::QualifiedReferenceExpression => "qualified-reference-expression",
            Self::BinaryExpression => "binary-expression",
            Self::BinaryExpressionWithType => "binary-expression-with-type",
            Self::ParenthesizedExpression => "parenthesized-expression",
            Self::UnaryExpression => "unary-expression",
            Self::PrefixExpression => "prefix-expression",
            Self::PostfixExpression => "postfix-expression",
            Self::IfExpression => "if-expression",
            Self::SwitchExpression => "switch-expression",
            Self::SwitchClauseExpression => "switch-clause-expression",
            Self::WhileExpression => "while-expression",
            Self::DoWhileExpression => "do-while-expression",
            Self::ForEachExpression => "for-each-expression",
            Self::TryExpression => "try-expression",
            Self::LiteralExpression => "literal-expression",
            Self::ThisExpression => "this-expression",
            Self::SuperExpression => "super-expression",
            Self::ReturnExpression => "return-expression",
            Self::BreakExpression => "break-expression",
            Self::ContinueExpression => "continue-expression",
            Self::ThrowExpression => "throw-expression",
            Self::ArrayAccessExpression => "array-access-expression",
            Self::CallableReferenceExpression => "callable-reference-expression",
            Self::LambdaExpression => "lambda-expression",
            Self::ObjectLiteralExpression => "object-literal-expression",
        }
    }

    const fn bit(self) -> u64 {
        1 << (self as u8)
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown node category `{0}`")]
pub struct UnknownCategory(pub String);

impl FromStr for NodeCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A set of node categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CategorySet(u64);

impl CategorySet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Adds a category to the set.
    pub fn insert(&mut self, category: NodeCategory) {
        self.0 |= category.bit();
    }

    /// Returns `true` if the category itself is a member.
    #[must_use]
    pub const fn contains(self, category: NodeCategory) -> bool {
        self.0 & category.bit() != 0
    }

    /// Returns `true` if a node of `category` satisfies some member,
    /// either directly or through its ancestors.
    #[must_use]
    pub fn admits(self, category: NodeCategory) -> bool {
        category.ancestors().any(|c| self.contains(c))
    }

    /// Returns the union of both sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` if the set has no members.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over members in declaration order.
    pub fn iter(self) -> impl Iterator<Item = NodeCategory> {
        NodeCategory::ALL
            .into_iter()
            .filter(move |c| self.contains(*c))
    }
}

impl FromIterator<NodeCategory> for CategorySet {
    fn from_iter<I: IntoIterator<Item = NodeCategory>>(iter: I) -> Self {
        let mut set = Self::new();
        for category in iter {
            set.insert(category);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_constant_derives_from_declaration() {
        let chain: Vec<_> = NodeCategory::EnumConstant.ancestors().collect();
        assert_eq!(
            chain,
            vec![
                NodeCategory::EnumConstant,
                NodeCategory::Field,
                NodeCategory::Variable,
                NodeCategory::Declaration,
            ]
        );
        assert!(NodeCategory::EnumConstant.is_a(NodeCategory::Declaration));
        assert!(!NodeCategory::Field.is_a(NodeCategory::EnumConstant));
    }

    #[test]
    fn specific_expressions_are_expressions() {
        assert!(NodeCategory::CallExpression.is_a(NodeCategory::Expression));
        assert!(NodeCategory::PrefixExpression.is_a(NodeCategory::UnaryExpression));
        assert!(NodeCategory::PrefixExpression.is_a(NodeCategory::Expression));
        assert!(!NodeCategory::CatchClause.is_a(NodeCategory::Expression));
        assert!(!NodeCategory::Annotation.is_a(NodeCategory::Expression));
    }

    #[test]
    fn file_is_never_contained() {
        for category in NodeCategory::ALL {
            assert!(!category.may_contain(NodeCategory::File), "{category}");
        }
    }

    #[test]
    fn imports_only_live_in_files() {
        assert!(NodeCategory::File.may_contain(NodeCategory::Import));
        assert!(!NodeCategory::Type.may_contain(NodeCategory::Import));
        assert!(!NodeCategory::Import.may_contain(NodeCategory::Expression));
        assert!(NodeCategory::Annotation.may_contain(NodeCategory::LiteralExpression));
        assert!(!NodeCategory::Annotation.may_contain(NodeCategory::Field));
        assert!(NodeCategory::Type.may_contain(NodeCategory::Field));
        assert!(NodeCategory::Field.may_contain(NodeCategory::CallExpression));
    }

    #[test]
    fn names_round_trip() {
        for category in NodeCategory::ALL {
            assert_eq!(category.name().parse::<NodeCategory>(), Ok(category));
        }
        assert_eq!(
            "Call_Expression".parse::<NodeCategory>(),
            Ok(NodeCategory::CallExpression)
        );
        assert!("statement".parse::<NodeCategory>().is_err());
    }

    #[test]
    fn category_set_admits_subkinds() {
        let set: CategorySet = [NodeCategory::File, NodeCategory::Expression]
            .into_iter()
            .collect();
        assert!(set.admits(NodeCategory::CallExpression));
        assert!(set.admits(NodeCategory::File));
        assert!(!set.admits(NodeCategory::Field));
        assert!(!set.contains(NodeCategory::CallExpression));
        assert_eq!(set.iter().count(), 2);
    }
}
