//! Check command implementation.

use anyhow::{Context, Result};
use lin_core::Analyzer;
use lin_kotlin::KotlinFrontend;
use lin_rules::{rule_by_name, KotlinRule, Preset};
use std::path::Path;

use crate::config_resolver;
use crate::OutputFormat;

/// Runs the check command.
///
/// Returns `false` when a violation reaches the configured `fail_on`
/// severity.
pub fn run(
    path: &Path,
    format: OutputFormat,
    rules_filter: Option<String>,
    exclude: Vec<String>,
    config_path: Option<&Path>,
) -> Result<bool> {
    let config = config_resolver::resolve(path, config_path).load()?;
    let fail_on = config.fail_on_severity().context("Invalid `fail_on`")?;
    let preset: Preset = config
        .preset
        .as_deref()
        .unwrap_or("recommended")
        .parse()
        .map_err(anyhow::Error::msg)?;

    let rules = select_rules(rules_filter.as_deref(), preset)?;

    let analyzer = Analyzer::builder(KotlinFrontend::from_config(&config))
        .root(path)
        .excludes(exclude)
        .rules(rules)
        .config(config)
        .build()
        .context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {} with {} rules",
        path.display(),
        analyzer.rule_count()
    );

    let result = analyzer.analyze().context("Analysis failed")?;

    super::output::print(&result, format, analyzer.root())?;

    Ok(!result.has_violations_at(fail_on))
}

/// Rules named in `--rules`, or the preset's rules when no filter is given.
fn select_rules(filter: Option<&str>, preset: Preset) -> Result<Vec<KotlinRule>> {
    let Some(filter) = filter else {
        return preset.rules().context("Failed to build preset rules");
    };

    let mut rules = Vec::new();
    for name in filter.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        match rule_by_name(name) {
            Some(builtin) => rules.push(
                builtin
                    .build()
                    .with_context(|| format!("Failed to build rule {}", builtin.name))?,
            ),
            None => tracing::warn!("Unknown rule: {}", name),
        }
    }
    Ok(rules)
}
