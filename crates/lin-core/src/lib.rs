//! # lin-core
//!
//! Declarative rule-tree matching for source-code diagnostics.
//!
//! A rule is a tree of [`RuleNode`]s, each naming a [`NodeCategory`], a
//! [`Quantifier`] and an optional predicate over host nodes. The engine
//! builds a category-filtered [`SyntaxTree`] from whatever a front end
//! parsed and decides whether the rule tree matches it, returning the
//! contributing nodes so that a violation can be located.
//!
//! This crate provides:
//!
//! - [`HostNode`] and [`Frontend`], the parser boundary
//! - [`RuleNode`] / [`RuleTree`] / [`Rule`] for describing rules
//! - [`matches`] for evaluating one rule tree against one syntax tree
//! - [`Analyzer`] for scanning a project and producing [`Violation`]s
//! - [`declarative`] for rules written in TOML
//!
//! ## Example
//!
//! ```ignore
//! use lin_core::{Analyzer, Quantifier, Rule, RuleMeta, RuleNode};
//!
//! let rule = Rule::new(
//!     RuleMeta::new("LIN007", "no-find-view-by-id-calls", "Use view binding"),
//!     RuleNode::file().child(
//!         RuleNode::call_expression().such_that(|call| call.name() == Some("findViewById")),
//!     ),
//! )?;
//!
//! let result = Analyzer::builder(frontend)
//!     .root("./app")
//!     .rule(rule)
//!     .build()?
//!     .analyze()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod category;
mod config;
mod context;
mod matcher;
mod rule;
mod rule_tree;
mod tree;
mod types;

pub mod declarative;
/// Utility modules shared with rule crates.
pub mod utils;

#[cfg(test)]
mod testing;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError, Frontend, ParseError, SourceFile};
pub use category::{CategorySet, NodeCategory, UnknownCategory};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig, TypesConfig};
pub use context::{Bindings, FileContext, MatchContext};
pub use matcher::{matches, MatchResult, Matcher};
pub use rule::{Rule, RuleMeta};
pub use rule_tree::{CountKind, Extractor, Predicate, Quantifier, RuleError, RuleId, RuleNode, RuleTree};
pub use tree::{HostNode, NodeId, SyntaxTree, TreeBuilder, TreeCache, Visibility};
pub use types::{Label, LintResult, Location, Severity, Span, Violation, ViolationDiagnostic};
pub use utils::allowance::AllowCheck;
