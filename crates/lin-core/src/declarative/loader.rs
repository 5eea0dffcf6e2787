//! DTO → rule conversion with validation.

use super::config_dto::{PatternDto, QuantifierDto, RuleNodeDto};
use super::model::{Capture, CompareOp, Condition, ValuePattern};
use crate::category::NodeCategory;
use crate::context::MatchContext;
use crate::rule::{Rule, RuleMeta};
use crate::rule_tree::{CountKind, Quantifier, RuleError, RuleNode};
use crate::tree::{HostNode, Visibility};
use crate::types::Severity;
use regex::Regex;
use std::sync::Arc;

/// Errors during DTO → rule conversion.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Rule construction rejected a node.
    #[error("{context}: {source}")]
    Rule {
        /// Where the error occurred (e.g., "no-log-calls.root.children[0]").
        context: String,
        /// The underlying rule error.
        source: RuleError,
    },

    /// Unknown severity string.
    #[error("{context}: {message}")]
    UnknownSeverity {
        /// Where the error occurred.
        context: String,
        /// What was wrong with the value.
        message: String,
    },

    /// Unknown visibility keyword.
    #[error("{context}: unknown visibility `{value}`")]
    UnknownVisibility {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// Malformed quantifier.
    #[error("{context}: {message}")]
    Quantifier {
        /// Where the error occurred.
        context: String,
        /// What is wrong.
        message: String,
    },

    /// Unknown compare operator.
    #[error("{context}: unknown compare op `{value}`, expected: equals, differs")]
    UnknownCompareOp {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },
}

/// Converts every pattern into a rule over host nodes of type `N`.
///
/// # Errors
///
/// Returns the first error encountered.
pub fn load_rules<N: HostNode>(patterns: &[PatternDto]) -> Result<Vec<Rule<N>>, LoadError> {
    patterns.iter().map(load_rule).collect()
}

/// Converts one pattern into a rule.
///
/// # Errors
///
/// Returns an error if any field is invalid.
pub fn load_rule<N: HostNode>(dto: &PatternDto) -> Result<Rule<N>, LoadError> {
    let severity: Severity = dto
        .severity
        .parse()
        .map_err(|message| LoadError::UnknownSeverity {
            context: dto.name.clone(),
            message,
        })?;

    let mut meta = RuleMeta::new(
        dto.code
            .clone()
            .unwrap_or_else(|| dto.name.to_ascii_uppercase()),
        dto.name.clone(),
        dto.message.clone(),
    )
    .severity(severity);
    if let Some(description) = &dto.description {
        meta = meta.explanation(description.clone());
    }

    let context = format!("{}.root", dto.name);
    let root = convert_node(&dto.root, &context)?;
    Rule::new(meta, root).map_err(|source| LoadError::Rule { context, source })
}

fn convert_node<N: HostNode>(dto: &RuleNodeDto, context: &str) -> Result<RuleNode<N>, LoadError> {
    let rule_err = |source: RuleError| LoadError::Rule {
        context: context.to_string(),
        source,
    };

    let category: NodeCategory = dto
        .category
        .parse()
        .map_err(|e| rule_err(RuleError::UnknownCategory(e)))?;
    let quantifier = dto
        .quantifier
        .as_ref()
        .map_or(Ok(Quantifier::Any), |q| convert_quantifier(q, context))?;

    let mut conditions = Vec::new();
    if let Some(name) = &dto.name {
        conditions.push(Condition::Name(name.clone()));
    }
    if let Some(pattern) = &dto.name_matches {
        conditions.push(Condition::NameMatches(compile(pattern).map_err(rule_err)?));
    }
    if let Some(pattern) = &dto.text_matches {
        conditions.push(Condition::TextMatches(compile(pattern).map_err(rule_err)?));
    }
    if let Some(v) = &dto.visibility {
        conditions.push(Condition::Visibility(parse_visibility(v, context)?));
    }
    if let Some(v) = &dto.not_visibility {
        conditions.push(Condition::NotVisibility(parse_visibility(v, context)?));
    }
    if let Some(fqn) = &dto.subtype_of {
        conditions.push(Condition::SubtypeOf(fqn.clone()));
    }
    if let Some(m) = &dto.modifier {
        conditions.push(Condition::Modifier(m.clone()));
    }
    if let Some(compare) = &dto.compare {
        let op = match compare.op.as_str() {
            "equals" => CompareOp::Equals,
            "differs" => CompareOp::Differs,
            other => {
                return Err(LoadError::UnknownCompareOp {
                    context: context.to_string(),
                    value: other.to_string(),
                })
            }
        };
        conditions.push(Condition::Compare {
            key: compare.key.clone(),
            pattern: ValuePattern::new(compile(&compare.pattern).map_err(rule_err)?),
            op,
        });
    }
    let capture = match &dto.capture {
        Some(c) => {
            let pattern = ValuePattern::new(compile(&c.pattern).map_err(rule_err)?);
            conditions.push(Condition::Captures(pattern.clone()));
            Some(Capture {
                key: c.key.clone(),
                pattern,
            })
        }
        None => None,
    };

    let mut node = RuleNode::new(category).quantifier(quantifier);
    if !conditions.is_empty() {
        let compares = conditions
            .iter()
            .any(|c| matches!(c, Condition::Compare { .. }));
        let conditions = Arc::new(conditions);
        node = if compares {
            node.such_that_ctx(move |n: &N, ctx| conditions.iter().all(|c| c.holds(n, ctx)))
        } else {
            let empty = MatchContext::new();
            node.such_that(move |n: &N| conditions.iter().all(|c| c.holds(n, &empty)))
        };
    }
    if let Some(capture) = capture {
        node = node.extract(move |n: &N| capture.extract(n));
    }

    for (i, child) in dto.children.iter().enumerate() {
        node = node.child(convert_node(child, &format!("{context}.children[{i}]"))?);
    }
    Ok(node)
}

fn convert_quantifier(dto: &QuantifierDto, context: &str) -> Result<Quantifier, LoadError> {
    let invalid = |message: String| LoadError::Quantifier {
        context: context.to_string(),
        message,
    };

    match dto {
        QuantifierDto::Keyword(k) => match k.as_str() {
            "all" => Ok(Quantifier::All),
            "any" => Ok(Quantifier::Any),
            other => Err(invalid(format!(
                "unknown quantifier `{other}`, expected: all, any or a count table"
            ))),
        },
        QuantifierDto::Count(count) => {
            let set: Vec<(CountKind, i64)> = [
                (CountKind::Times, count.times),
                (CountKind::AtLeast, count.at_least),
                (CountKind::AtMost, count.at_most),
                (CountKind::MoreThan, count.more_than),
                (CountKind::LessThan, count.less_than),
            ]
            .into_iter()
            .filter_map(|(kind, n)| n.map(|n| (kind, n)))
            .collect();

            match set.as_slice() {
                [(kind, n)] => Quantifier::from_count(*kind, *n).map_err(|source| {
                    LoadError::Rule {
                        context: context.to_string(),
                        source,
                    }
                }),
                _ => Err(invalid(
                    "exactly one of times, at_least, at_most, more_than, less_than must be set"
                        .to_string(),
                )),
            }
        }
    }
}

fn parse_visibility(value: &str, context: &str) -> Result<Visibility, LoadError> {
    value.parse().map_err(|_| LoadError::UnknownVisibility {
        context: context.to_string(),
        value: value.to_string(),
    })
}

fn compile(pattern: &str) -> Result<Regex, RuleError> {
    Regex::new(pattern).map_err(|e| RuleError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}
