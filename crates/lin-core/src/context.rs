//! Context values threaded through matching and analysis.

use crate::rule_tree::RuleId;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Values extracted from matched nodes, keyed by names agreed between rules.
pub type Bindings = BTreeMap<String, String>;

/// Immutable scratch space passed down each matching branch.
///
/// Holds the satisfaction counters of counted rules at the current sibling
/// level and the values extracted so far. Every update returns a new
/// context, so a branch that is abandoned leaves nothing behind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MatchContext {
    counters: Arc<BTreeMap<RuleId, u32>>,
    bindings: Arc<Bindings>,
}

impl MatchContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an extracted value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.bindings.get(key).map(String::as_str)
    }

    /// All extracted values visible in this branch.
    #[must_use]
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Number of siblings that satisfied `rule` so far at this level.
    #[must_use]
    pub fn count(&self, rule: RuleId) -> u32 {
        self.counters.get(&rule).copied().unwrap_or(0)
    }

    /// Returns a context with `values` merged over the current bindings.
    #[must_use]
    pub fn with_bindings(&self, values: &Bindings) -> Self {
        if values.is_empty() {
            return self.clone();
        }
        let mut bindings = (*self.bindings).clone();
        bindings.extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self {
            counters: Arc::clone(&self.counters),
            bindings: Arc::new(bindings),
        }
    }

    /// Returns a context where `rule` has been satisfied once more.
    #[must_use]
    pub fn with_count_incremented(&self, rule: RuleId) -> Self {
        let mut counters = (*self.counters).clone();
        *counters.entry(rule).or_insert(0) += 1;
        Self {
            counters: Arc::new(counters),
            bindings: Arc::clone(&self.bindings),
        }
    }

    /// Context for matching the children of a node: bindings carry over,
    /// counters start fresh.
    #[must_use]
    pub fn descend(&self, values: &Bindings) -> Self {
        Self {
            counters: Arc::default(),
            bindings: Arc::clone(&self.bindings),
        }
        .with_bindings(values)
    }
}

/// Context describing one analyzed source file.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Absolute path to the file.
    pub path: &'a Path,
    /// File contents as a string.
    pub content: &'a str,
    /// Whether this file is detected as a test source.
    pub is_test: bool,
    /// Path relative to the project root.
    pub relative_path: PathBuf,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, root: &Path) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);

        Self {
            path,
            content,
            is_test: Self::detect_test_file(&relative_path),
            relative_path,
        }
    }

    /// Detects Gradle test source sets and `*Test` files.
    fn detect_test_file(path: &Path) -> bool {
        let in_test_dir = path.components().any(|component| {
            matches!(
                component.as_os_str().to_str(),
                Some("test" | "tests" | "androidTest" | "testFixtures")
            )
        });
        let named_test = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.ends_with("Test") || s.ends_with("Tests"));

        in_test_dir || named_test
    }

    /// Calculates byte offset for a 1-indexed line and column.
    ///
    /// Returns 0 for line 0 and the end of the content when out of bounds.
    #[must_use]
    pub fn offset_for(&self, line: usize, column: usize) -> usize {
        if line == 0 {
            return 0;
        }

        let mut offset = 0;
        for (i, line_content) in self.content.split_inclusive('\n').enumerate() {
            if i + 1 == line {
                return offset + column.saturating_sub(1);
            }
            offset += line_content.len();
        }

        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(pairs: &[(&str, &str)]) -> Bindings {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn updates_do_not_touch_the_original() {
        let base = MatchContext::new();
        let extended = base.with_bindings(&bindings(&[("Imported Layout", "main")]));
        assert_eq!(base.get("Imported Layout"), None);
        assert_eq!(extended.get("Imported Layout"), Some("main"));
        assert_ne!(base, extended);
    }

    #[test]
    fn counters_are_per_rule_and_reset_on_descend() {
        let rule = RuleId::from_index(3);
        let ctx = MatchContext::new()
            .with_count_incremented(rule)
            .with_count_incremented(rule)
            .with_bindings(&bindings(&[("k", "v")]));
        assert_eq!(ctx.count(rule), 2);
        assert_eq!(ctx.count(RuleId::from_index(4)), 0);

        let child = ctx.descend(&bindings(&[("x", "y")]));
        assert_eq!(child.count(rule), 0);
        assert_eq!(child.get("k"), Some("v"));
        assert_eq!(child.get("x"), Some("y"));
    }

    #[test]
    fn equal_contexts_hash_equal() {
        use std::collections::HashSet;
        let a = MatchContext::new().with_bindings(&bindings(&[("k", "v")]));
        let b = MatchContext::new().with_bindings(&bindings(&[("k", "v")]));
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_detect_test_file() {
        assert!(FileContext::detect_test_file(Path::new(
            "app/src/test/java/foo/Bar.kt"
        )));
        assert!(FileContext::detect_test_file(Path::new(
            "app/src/androidTest/foo/Bar.kt"
        )));
        assert!(FileContext::detect_test_file(Path::new("src/BarTest.kt")));
        assert!(!FileContext::detect_test_file(Path::new(
            "app/src/main/java/foo/Bar.kt"
        )));
    }

    #[test]
    fn test_offset_calculation() {
        let ctx = FileContext::new(Path::new("/p/A.kt"), "line1\nline2\nline3", Path::new("/p"));
        assert_eq!(ctx.relative_path, PathBuf::from("A.kt"));
        assert_eq!(ctx.offset_for(1, 1), 0);
        assert_eq!(ctx.offset_for(2, 1), 6);
        assert_eq!(ctx.offset_for(2, 3), 8);
    }
}
