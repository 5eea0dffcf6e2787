//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# lin configuration

# Rule preset: recommended, strict, minimal or all
preset = "recommended"

# Lowest severity that fails `lin check`
fail_on = "error"

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./app"

# Glob patterns to exclude from analysis
exclude = [
    "**/build/**",
    "**/.gradle/**",
    "**/generated/**",
]

# Respect .gitignore files
respect_gitignore = true

# Skip src/test, src/androidTest and *Test.kt sources
skip_tests = false

# Rule configurations, keyed by rule name.
# Each rule can be enabled/disabled and have its severity overridden.

[rules.no-print-stack-trace-calls]
enabled = true
# severity = "error"

# [rules.only-constants-in-type]
# enabled = false

# Supertypes the front end cannot see, e.g. base classes from other modules.
# [types.supertypes]
# "com.example.BaseActivity" = ["androidx.appcompat.app.AppCompatActivity"]

# Project rules written as rule trees.
# [[patterns]]
# code = "APP001"
# name = "no-log-calls"
# message = "Use the project logger instead of android.util.Log"
# severity = "warning"
#
# [patterns.root]
# category = "file"
#
# [[patterns.root.children]]
# category = "call-expression"
# text_matches = "^Log\\."
"#;

/// Runs the init command in the current directory.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new("lin.toml"), force)?;

    println!("Created lin.toml");
    println!("\nNext steps:");
    println!("  1. Edit lin.toml to configure rules");
    println!("  2. Run: lin check");

    Ok(())
}

fn write_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lin_core::Config;
    use tempfile::TempDir;

    #[test]
    fn default_config_parses() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.preset.as_deref(), Some("recommended"));
        assert!(config.is_rule_enabled("no-print-stack-trace-calls"));
        assert!(config.patterns.is_empty());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("lin.toml");
        std::fs::write(&path, "preset = \"all\"\n").unwrap();

        assert!(write_config(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "preset = \"all\"\n");

        write_config(&path, true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
