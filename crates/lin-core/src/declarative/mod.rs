//! Rule trees defined in TOML instead of Rust.
//!
//! # Architecture
//!
//! ```text
//! TOML text
//!   ↓ serde (DTO layer)
//! config_dto types
//!   ↓ validate + convert (loader)
//! model::Condition lists per rule node
//!   ↓ RuleNode / RuleTree construction
//! Vec<Rule<N>>
//! ```
//!
//! Conditions only use the attribute queries of [`HostNode`], so the same
//! patterns work for any front end.

pub mod config_dto;
pub mod loader;
pub mod model;

pub use loader::LoadError;

use crate::rule::Rule;
use crate::tree::HostNode;

/// Errors from parsing TOML and loading declarative rules.
#[derive(Debug, thiserror::Error)]
pub enum LoadRulesError {
    /// TOML deserialization failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A pattern failed validation.
    #[error("{0}")]
    Load(#[from] LoadError),
}

/// Parses TOML content and creates a rule for every `[[patterns]]` entry.
///
/// Returns `Ok(vec![])` if no patterns are present.
///
/// # Errors
///
/// Returns an error if TOML parsing or pattern validation fails.
pub fn load_rules_from_toml<N: HostNode>(content: &str) -> Result<Vec<Rule<N>>, LoadRulesError> {
    let dto: config_dto::PatternsDto = toml::from_str(content)?;
    Ok(loader::load_rules(&dto.patterns)?)
}
