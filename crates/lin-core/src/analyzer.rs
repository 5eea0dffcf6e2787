//! Scanning driver: discovers sources, parses them and runs rules.

use crate::config::Config;
use crate::context::FileContext;
use crate::declarative::loader;
use crate::matcher::MatchResult;
use crate::rule::Rule;
use crate::rule_tree::RuleTree;
use crate::tree::{HostNode, NodeId, SyntaxTree, TreeCache};
use crate::types::{Label, LintResult, Location, Violation};
use crate::utils::allowance::check_allow_with_reason;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A source file could not be parsed.
    #[error("Parse error in {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Directory walk error.
    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] ignore::Error),
}

/// Error reported by a [`Frontend`] for text it cannot parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    /// Human-readable description.
    pub message: String,
    /// Line of the first problem, if known (1-indexed).
    pub line: Option<usize>,
}

impl ParseError {
    /// Creates a parse error without position.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    /// Attaches the line of the first problem.
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

/// Turns source text into a host tree.
///
/// This is the parser boundary: the engine never reads source text itself.
pub trait Frontend {
    /// Host node type produced by this front end.
    type Node: HostNode;

    /// Language identifier (e.g., `"kotlin"`).
    fn language_id(&self) -> &'static str;

    /// File extensions this front end handles (e.g., `&[".kt", ".kts"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Parses one compilation unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid for this language.
    fn parse(&self, source: &str) -> Result<Self::Node, ParseError>;
}

/// Source text paired with its path relative to the project root.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path used in reports.
    pub path: PathBuf,
    /// File contents.
    pub content: String,
}

impl SourceFile {
    /// Creates a source file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

struct ParsedFile<N> {
    source: SourceFile,
    root: N,
}

/// Builder for configuring an [`Analyzer`].
pub struct AnalyzerBuilder<F: Frontend> {
    frontend: F,
    root: Option<PathBuf>,
    rules: Vec<Rule<F::Node>>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    fail_on_parse_error: bool,
}

impl<F: Frontend> AnalyzerBuilder<F> {
    /// Creates a new builder for `frontend` with default settings.
    #[must_use]
    pub fn new(frontend: F) -> Self {
        Self {
            frontend,
            root: None,
            rules: Vec::new(),
            exclude_patterns: Vec::new(),
            config: None,
            fail_on_parse_error: false,
        }
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule.
    #[must_use]
    pub fn rule(mut self, rule: Rule<F::Node>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several rules.
    #[must_use]
    pub fn rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = Rule<F::Node>>,
    {
        self.rules.extend(rules);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets whether to fail on parse errors (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Builds the analyzer.
    ///
    /// Declarative `[[patterns]]` from the configuration are compiled into
    /// rules here.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be resolved, an
    /// exclude pattern is invalid, or a declarative pattern is malformed.
    pub fn build(self) -> Result<Analyzer<F>, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());
        if exclude_patterns.is_empty() {
            exclude_patterns.extend(["**/build/**".to_string(), "**/.gradle/**".to_string()]);
        }
        let exclude = exclude_patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rules = self.rules;
        let declared = loader::load_rules::<F::Node>(&config.patterns)
            .map_err(crate::config::ConfigError::from)?;
        if !declared.is_empty() {
            debug!("Loaded {} declarative rule(s)", declared.len());
        }
        rules.extend(declared);

        Ok(Analyzer {
            frontend: self.frontend,
            root,
            rules,
            exclude,
            config,
            fail_on_parse_error: self.fail_on_parse_error,
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer<F: Frontend> {
    frontend: F,
    root: PathBuf,
    rules: Vec<Rule<F::Node>>,
    exclude: Vec<glob::Pattern>,
    config: Config,
    fail_on_parse_error: bool,
}

impl<F: Frontend> Analyzer<F> {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder(frontend: F) -> AnalyzerBuilder<F> {
        AnalyzerBuilder::new(frontend)
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Registered rules, including declarative ones.
    #[must_use]
    pub fn rules(&self) -> &[Rule<F::Node>] {
        &self.rules
    }

    /// Discovers, reads and analyzes every source file under the root.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery or reading fails, or if a file
    /// fails to parse while `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!(
            "Starting {} analysis at {}",
            self.frontend.language_id(),
            self.root.display()
        );

        let paths = self.discover_files()?;
        info!("Found {} files to analyze", paths.len());

        let mut sources = Vec::with_capacity(paths.len());
        for path in &paths {
            let content = std::fs::read_to_string(path)?;
            let FileContext {
                relative_path,
                is_test,
                ..
            } = FileContext::new(path, &content, &self.root);

            if is_test && self.config.analyzer.skip_tests {
                debug!("Skipping test source: {}", relative_path.display());
                continue;
            }
            sources.push(SourceFile::new(relative_path, content));
        }

        self.analyze_sources(sources)
    }

    /// Analyzes in-memory sources as one project.
    ///
    /// Per-file patterns run on each file; project-wide patterns run once on
    /// a tree whose roots are all parsed files.
    ///
    /// # Errors
    ///
    /// Returns an error if a file fails to parse while `fail_on_parse_error`
    /// is set.
    pub fn analyze_sources(&self, sources: Vec<SourceFile>) -> Result<LintResult, AnalyzerError> {
        let mut files = Vec::with_capacity(sources.len());
        for source in sources {
            match self.frontend.parse(&source.content) {
                Ok(root) => files.push(ParsedFile { source, root }),
                Err(e) => {
                    warn!("Failed to parse {}: {}", source.path.display(), e);
                    if self.fail_on_parse_error {
                        return Err(AnalyzerError::Parse {
                            path: source.path,
                            message: e.to_string(),
                        });
                    }
                }
            }
        }

        let rules: Vec<&Rule<F::Node>> = self
            .rules
            .iter()
            .filter(|rule| {
                let enabled = self.config.is_rule_enabled(rule.name());
                if !enabled {
                    debug!("Skipping disabled rule: {}", rule.name());
                }
                enabled
            })
            .collect();

        let mut result = LintResult::new();
        result.files_checked = files.len();

        for file in &files {
            debug!("Analyzing: {}", file.source.path.display());
            let mut trees = TreeCache::new(vec![&file.root]);
            for rule in &rules {
                result.violations.extend(self.run_rule(
                    rule,
                    &mut trees,
                    std::slice::from_ref(file),
                    |pattern| !pattern.is_project_wide(),
                ));
            }
        }

        let project_rules: Vec<&Rule<F::Node>> = rules
            .iter()
            .copied()
            .filter(|rule| rule.patterns().iter().any(RuleTree::is_project_wide))
            .collect();
        if !project_rules.is_empty() && !files.is_empty() {
            debug!("Running {} project-wide rule(s)", project_rules.len());
            let mut trees = TreeCache::new(files.iter().map(|f| &f.root).collect());
            for rule in project_rules {
                let Some(found) =
                    self.run_rule(rule, &mut trees, &files, RuleTree::is_project_wide)
                else {
                    continue;
                };
                // A per-file pattern of the same rule may already report this node.
                if result
                    .violations
                    .iter()
                    .any(|v| v.code == found.code && v.location == found.location)
                {
                    debug!(
                        "{} already reported at {}:{}",
                        found.code,
                        found.location.file.display(),
                        found.location.line
                    );
                    continue;
                }
                result.violations.push(found);
            }
        }

        result.sort();

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    fn run_rule<P>(
        &self,
        rule: &Rule<F::Node>,
        trees: &mut TreeCache<'_, F::Node>,
        files: &[ParsedFile<F::Node>],
        select: P,
    ) -> Option<Violation>
    where
        P: Fn(&RuleTree<F::Node>) -> bool,
    {
        let (pattern, result) = rule.evaluate_where(trees, select)?;
        let tree = trees.tree(rule.patterns()[pattern].categories());
        let violation = self.to_violation(rule, &result, tree, files)?;

        let file = &files[tree.source_of(result.primary()?)];
        let allowed = [rule.name(), rule.code()]
            .iter()
            .map(|name| check_allow_with_reason(&file.source.content, violation.location.line, name))
            .find(|check| check.is_allowed());
        if let Some(check) = allowed {
            debug!(
                "Suppressed {} at {}:{} ({})",
                rule.name(),
                violation.location.file.display(),
                violation.location.line,
                check.reason().unwrap_or("no reason given")
            );
            return None;
        }

        Some(self.apply_severity_override(rule.name(), violation))
    }

    /// Turns a match into a violation located at its most specific node.
    fn to_violation(
        &self,
        rule: &Rule<F::Node>,
        result: &MatchResult,
        tree: &SyntaxTree<'_, F::Node>,
        files: &[ParsedFile<F::Node>],
    ) -> Option<Violation> {
        let locate = |id: NodeId| {
            let file = &files[tree.source_of(id)];
            Location::from_span(file.source.path.clone(), tree.host(id).span())
        };

        let meta = rule.meta();
        let (primary, related) = result.nodes().split_first()?;
        let mut violation = Violation::new(
            meta.code.clone(),
            meta.name.clone(),
            meta.severity,
            locate(*primary),
            meta.description.clone(),
        );
        if let Some(help) = &meta.explanation {
            violation = violation.with_help(help.clone());
        }
        for id in related {
            violation = violation.with_label(Label::new(
                locate(*id),
                format!("matched {}", tree.category(*id)),
            ));
        }
        Some(violation)
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(&self, rule_name: &str, mut violation: Violation) -> Violation {
        if let Some(severity) = self.config.rule_severity(rule_name) {
            violation.severity = severity;
        }
        violation
    }

    /// Discovers all source files handled by the front end.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let extensions = self.frontend.extensions();

        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(self.config.analyzer.respect_gitignore)
            .require_git(false);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| format!(".{e}"))
                .unwrap_or_default();
            if !extensions.contains(&ext.as_str()) {
                continue;
            }

            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Checks if a path should be excluded, by absolute or root-relative path.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.exclude
            .iter()
            .any(|pattern| pattern.matches_path(path) || pattern.matches_path(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::NodeCategory;
    use crate::rule::RuleMeta;
    use crate::rule_tree::{Quantifier, RuleNode};
    use crate::testing::TestNode;
    use crate::types::Severity;
    use std::fs;

    /// Line-based toy language: `import X`, `class X`, `call X`; `!` fails.
    struct LineFrontend;

    impl Frontend for LineFrontend {
        type Node = TestNode;

        fn language_id(&self) -> &'static str {
            "lines"
        }

        fn extensions(&self) -> &'static [&'static str] {
            &[".kt"]
        }

        fn parse(&self, source: &str) -> Result<TestNode, ParseError> {
            let mut file = TestNode::new(NodeCategory::File, "file").line(1);
            for (i, line) in source.lines().enumerate() {
                let line_no = i + 1;
                let node = match line.trim().split_once(' ') {
                    Some(("import", name)) => TestNode::new(NodeCategory::Import, name),
                    Some(("class", name)) => TestNode::new(NodeCategory::Type, name),
                    Some(("call", name)) => TestNode::new(NodeCategory::CallExpression, name),
                    _ if line.starts_with('!') => {
                        return Err(ParseError::new("unexpected `!`").at_line(line_no))
                    }
                    _ => continue,
                };
                file = file.child(node.line(line_no));
            }
            Ok(file)
        }
    }

    fn named(name: &'static str) -> impl Fn(&TestNode) -> bool + Send + Sync + 'static {
        move |n: &TestNode| n.name() == Some(name)
    }

    fn gson_rule() -> Rule<TestNode> {
        Rule::any_of(
            RuleMeta::new("LIN002", "no-more-than-one-gson-instance", "Gson should be created once")
                .explanation("Share one Gson instance"),
            [
                RuleNode::file()
                    .quantifier(Quantifier::more_than(1))
                    .child(RuleNode::call_expression().such_that(named("Gson"))),
                RuleNode::file().child(
                    RuleNode::call_expression()
                        .quantifier(Quantifier::more_than(1))
                        .such_that(named("Gson")),
                ),
            ],
        )
        .unwrap()
    }

    fn find_view_rule() -> Rule<TestNode> {
        Rule::new(
            RuleMeta::new("LIN007", "no-find-view-by-id-calls", "Use view binding"),
            RuleNode::file().child(RuleNode::call_expression().such_that(named("findViewById"))),
        )
        .unwrap()
    }

    fn analyzer() -> AnalyzerBuilder<LineFrontend> {
        Analyzer::builder(LineFrontend)
            .root(".")
            .rule(gson_rule())
            .rule(find_view_rule())
    }

    #[test]
    fn test_builder() {
        let analyzer = analyzer().build().expect("Failed to build analyzer");
        assert!(analyzer.root().is_absolute());
        assert_eq!(analyzer.rule_count(), 2);
    }

    #[test]
    fn test_exclude_patterns() {
        let analyzer = Analyzer::builder(LineFrontend)
            .root("/project")
            .exclude("**/build/**")
            .exclude("**/generated/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.should_exclude(Path::new("/project/app/build/tmp/A.kt")));
        assert!(analyzer.should_exclude(Path::new("/project/generated/B.kt")));
        assert!(!analyzer.should_exclude(Path::new("/project/app/src/main/C.kt")));
    }

    #[test]
    fn invalid_exclude_is_rejected() {
        let err = Analyzer::builder(LineFrontend).exclude("[").build();
        assert!(matches!(err, Err(AnalyzerError::Glob(_))));
    }

    #[test]
    fn per_file_violation_points_at_the_most_specific_node() {
        let result = analyzer()
            .build()
            .unwrap()
            .analyze_sources(vec![SourceFile::new(
                "A.kt",
                "import x\ncall findViewById\n",
            )])
            .unwrap();

        assert_eq!(result.files_checked, 1);
        assert_eq!(result.violations.len(), 1);
        let v = &result.violations[0];
        assert_eq!(v.code, "LIN007");
        assert_eq!(v.location.file, PathBuf::from("A.kt"));
        assert_eq!(v.location.line, 2);
        assert_eq!(v.labels.len(), 1);
        assert_eq!(v.labels[0].message, "matched file");
    }

    #[test]
    fn project_wide_pattern_reports_once_across_files() {
        let result = analyzer()
            .build()
            .unwrap()
            .analyze_sources(vec![
                SourceFile::new("A.kt", "call Gson\n"),
                SourceFile::new("B.kt", "\ncall Gson\n"),
            ])
            .unwrap();

        assert_eq!(result.violations.len(), 1);
        let v = &result.violations[0];
        assert_eq!(v.rule, "no-more-than-one-gson-instance");
        assert_eq!(v.location.file, PathBuf::from("A.kt"));
        assert_eq!(v.help.as_deref(), Some("Share one Gson instance"));
        assert!(v
            .labels
            .iter()
            .any(|l| l.location.file == Path::new("B.kt") && l.location.line == 2));
    }

    #[test]
    fn per_file_and_project_wide_matches_at_one_node_report_once() {
        let result = analyzer()
            .build()
            .unwrap()
            .analyze_sources(vec![
                SourceFile::new("A.kt", "\n\ncall Gson\ncall Gson\n"),
                SourceFile::new("B.kt", "call Gson\ncall Gson\n"),
            ])
            .unwrap();

        let found: Vec<_> = result
            .violations
            .iter()
            .map(|v| format!("{}:{}", v.location.file.display(), v.location.line))
            .collect();
        assert_eq!(found, ["A.kt:3", "B.kt:1"]);
    }

    #[test]
    fn single_file_with_one_gson_is_clean() {
        let result = analyzer()
            .build()
            .unwrap()
            .analyze_sources(vec![SourceFile::new("A.kt", "call Gson\ncall other\n")])
            .unwrap();
        assert!(result.violations.is_empty());
    }

    #[test]
    fn suppression_comment_drops_violation() {
        let content = "// lin: allow(no-find-view-by-id-calls) reason=\"legacy\"\ncall findViewById\ncall findViewById\n";
        let result = analyzer()
            .build()
            .unwrap()
            .analyze_sources(vec![SourceFile::new("A.kt", content)])
            .unwrap();
        assert!(result.violations.is_empty());

        let by_code = "call findViewById // lin: allow(LIN007)\n";
        let result = analyzer()
            .build()
            .unwrap()
            .analyze_sources(vec![SourceFile::new("A.kt", by_code)])
            .unwrap();
        assert!(result.violations.is_empty());
    }

    #[test]
    fn config_disables_and_overrides_rules() {
        let config = Config::parse(
            r#"
[rules.no-find-view-by-id-calls]
severity = "info"

[rules.no-more-than-one-gson-instance]
enabled = false
"#,
        )
        .unwrap();
        let result = analyzer()
            .config(config)
            .build()
            .unwrap()
            .analyze_sources(vec![SourceFile::new(
                "A.kt",
                "call Gson\ncall Gson\ncall findViewById\n",
            )])
            .unwrap();

        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].severity, Severity::Info);
        assert!(!result.has_errors());
    }

    #[test]
    fn declarative_patterns_become_rules() {
        let config = Config::parse(
            r#"
[[patterns]]
code = "DEMO001"
name = "no-legacy-imports"
message = "Legacy package imported"
[patterns.root]
category = "file"
[[patterns.root.children]]
category = "import"
name_matches = "^legacy\\."
"#,
        )
        .unwrap();
        let analyzer = Analyzer::builder(LineFrontend)
            .config(config)
            .build()
            .unwrap();
        assert_eq!(analyzer.rule_count(), 1);

        let result = analyzer
            .analyze_sources(vec![SourceFile::new("A.kt", "import legacy.Thing\n")])
            .unwrap();
        assert_eq!(result.violations[0].code, "DEMO001");
        assert_eq!(result.violations[0].location.line, 1);
    }

    #[test]
    fn parse_errors_are_skipped_unless_fatal() {
        let sources = || {
            vec![
                SourceFile::new("Bad.kt", "!oops\n"),
                SourceFile::new("Good.kt", "call findViewById\n"),
            ]
        };

        let result = analyzer().build().unwrap().analyze_sources(sources()).unwrap();
        assert_eq!(result.files_checked, 1);
        assert_eq!(result.violations.len(), 1);

        let err = analyzer()
            .fail_on_parse_error(true)
            .build()
            .unwrap()
            .analyze_sources(sources())
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Parse { path, .. } if path == Path::new("Bad.kt")));
    }

    #[test]
    fn analyze_walks_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("app/src/main")).unwrap();
        fs::create_dir_all(root.join("app/src/test")).unwrap();
        fs::create_dir_all(root.join("app/build")).unwrap();
        fs::write(root.join("app/src/main/Main.kt"), "call findViewById\n").unwrap();
        fs::write(root.join("app/src/test/MainTest.kt"), "call findViewById\n").unwrap();
        fs::write(root.join("app/build/Gen.kt"), "call findViewById\n").unwrap();
        fs::write(root.join("app/src/main/notes.txt"), "call findViewById\n").unwrap();

        let mut config = Config::default();
        config.analyzer.skip_tests = true;
        let result = Analyzer::builder(LineFrontend)
            .root(root)
            .rule(find_view_rule())
            .config(config)
            .build()
            .unwrap()
            .analyze()
            .unwrap();

        assert_eq!(result.files_checked, 1);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(
            result.violations[0].location.file,
            PathBuf::from("app/src/main/Main.kt")
        );
    }
}
