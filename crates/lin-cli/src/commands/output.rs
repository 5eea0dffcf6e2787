//! Shared output formatting for lint results.

use anyhow::Result;
use lin_core::{LintResult, Violation, ViolationDiagnostic};
use miette::{GraphicalReportHandler, GraphicalTheme, NamedSource, Report};
use std::fmt::Write as _;
use std::io::IsTerminal;
use std::path::Path;

use crate::OutputFormat;

/// Prints lint results in the specified format.
///
/// `root` is where violation paths are relative to; `pretty` reads sources
/// from there.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    let color = std::io::stdout().is_terminal();
    print!("{}", render(result, format, root, color)?);
    Ok(())
}

fn render(result: &LintResult, format: OutputFormat, root: &Path, color: bool) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => render_text(result, color),
        OutputFormat::Json => serde_json::to_string_pretty(result)? + "\n",
        OutputFormat::Compact => render_compact(result),
        OutputFormat::Pretty => render_pretty(result, root, color),
    })
}

fn render_text(result: &LintResult, color: bool) -> String {
    let mut out = String::new();
    for violation in &result.violations {
        out.push_str(&violation.format());
        out.push('\n');
    }
    out.push_str(&summary(result, color));
    out
}

fn summary(result: &LintResult, color: bool) -> String {
    let (errors, warnings, infos) = result.count_by_severity();
    let line = format!(
        "Found {errors} error(s), {warnings} warning(s), {infos} info(s) in {} file(s)",
        result.files_checked
    );
    if !color {
        return line + "\n";
    }
    let code = if errors > 0 {
        "31"
    } else if warnings > 0 {
        "33"
    } else {
        "32"
    };
    format!("\x1b[{code}m{line}\x1b[0m\n")
}

fn render_compact(result: &LintResult) -> String {
    result
        .violations
        .iter()
        .fold(String::new(), |mut out, violation| {
            let _ = writeln!(out, "{violation}");
            out
        })
}

fn render_pretty(result: &LintResult, root: &Path, color: bool) -> String {
    let theme = if color {
        GraphicalTheme::unicode()
    } else {
        GraphicalTheme::unicode_nocolor()
    };
    let handler = GraphicalReportHandler::new_themed(theme);

    let mut out = String::new();
    for violation in &result.violations {
        match diagnostic(violation, root) {
            Some(report) => {
                if handler.render_report(&mut out, &*report).is_err() {
                    out.push_str(&violation.format());
                }
            }
            None => out.push_str(&violation.format()),
        }
        out.push('\n');
    }
    out.push_str(&summary(result, color));
    out
}

/// The violation as a miette report over its file, if the file is readable.
fn diagnostic(violation: &Violation, root: &Path) -> Option<Report> {
    let path = root.join(&violation.location.file);
    let source = match std::fs::read_to_string(&path) {
        Ok(source) => source,
        Err(e) => {
            tracing::debug!("Cannot read {} for rendering: {}", path.display(), e);
            return None;
        }
    };
    let name = violation.location.file.display().to_string();
    Some(
        Report::new(ViolationDiagnostic::from(violation))
            .with_source_code(NamedSource::new(name, source)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use lin_core::{Label, Location, Severity};
    use std::path::PathBuf;

    fn sample() -> LintResult {
        let gson = Violation::new(
            "LIN002",
            "no-more-than-one-gson-instance",
            Severity::Error,
            Location::new(PathBuf::from("data/JsonA.kt"), 6, 23),
            "Gson should be created once",
        )
        .with_help("Share one instance")
        .with_label(Label::new(
            Location::new(PathBuf::from("data/JsonB.kt"), 6, 23),
            "matched call-expression",
        ));
        let find_view = Violation::new(
            "LIN007",
            "no-find-view-by-id-calls",
            Severity::Warning,
            Location::new(PathBuf::from("app/Main.kt"), 2, 16).with_span(28, 20),
            "Legacy findViewById",
        );
        LintResult {
            violations: vec![gson, find_view],
            files_checked: 3,
        }
    }

    #[test]
    fn compact_output() {
        let out = render(&sample(), OutputFormat::Compact, Path::new("."), false).unwrap();
        insta::assert_snapshot!(out, @r"
        data/JsonA.kt:6:23: error [LIN002] Gson should be created once
        app/Main.kt:2:16: warning [LIN007] Legacy findViewById
        ");
    }

    #[test]
    fn text_output() {
        let out = render(&sample(), OutputFormat::Text, Path::new("."), false).unwrap();
        insta::assert_snapshot!(out, @r"
        LIN002 no-more-than-one-gson-instance at data/JsonA.kt:6:23
          error: Gson should be created once
          = data/JsonB.kt:6:23: matched call-expression
          = help: Share one instance

        LIN007 no-find-view-by-id-calls at app/Main.kt:2:16
          warning: Legacy findViewById

        Found 1 error(s), 1 warning(s), 0 info(s) in 3 file(s)
        ");
    }

    #[test]
    fn text_summary_is_colored_on_terminals() {
        let out = render_text(&LintResult::new(), true);
        assert_eq!(
            out,
            "\x1b[32mFound 0 error(s), 0 warning(s), 0 info(s) in 0 file(s)\x1b[0m\n"
        );
    }

    #[test]
    fn json_output_round_trips() {
        let out = render(&sample(), OutputFormat::Json, Path::new("."), false).unwrap();
        let parsed: LintResult = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.files_checked, 3);
        assert_eq!(parsed.violations[0].labels.len(), 1);
        assert_eq!(parsed.violations[1].help, None);
    }

    #[test]
    fn pretty_output_shows_source() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("app")).unwrap();
        std::fs::write(
            tmp.path().join("app/Main.kt"),
            "fun show() {\n    val view = findViewById(R.id.x)\n}\n",
        )
        .unwrap();

        let out = render(&sample(), OutputFormat::Pretty, tmp.path(), false).unwrap();
        // JsonA.kt is missing, so that violation falls back to plain text.
        assert!(out.contains("LIN002 no-more-than-one-gson-instance at data/JsonA.kt:6:23"));
        assert!(out.contains("[LIN007] Legacy findViewById"));
        assert!(out.contains("app/Main.kt"));
        assert!(out.contains("val view = findViewById(R.id.x)"));
        assert!(out.contains("Found 1 error(s), 1 warning(s), 0 info(s) in 3 file(s)"));
    }
}
