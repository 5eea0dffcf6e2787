//! Type facts the parser cannot see: supertypes of library classes.
//!
//! A single Kotlin file names library types (`Button`, `Gson`, `Exception`)
//! without their class hierarchy. [`TypeFacts`] is the table that fills the
//! gap; it ships with the Android and JDK facts the bundled rules rely on and
//! can be extended from `[types.supertypes]` in `lin.toml`.

use lin_core::TypesConfig;
use std::collections::{HashMap, HashSet, VecDeque};

const VIEW: &str = "android.view.View";
const VIEW_GROUP: &str = "android.view.ViewGroup";
const ACTIVITY: &str = "android.app.Activity";
const CONTEXT_WRAPPER: &str = "android.content.ContextWrapper";

/// Direct supertypes of well-known library classes.
const DEFAULT_FACTS: &[(&str, &[&str])] = &[
    // Views
    ("android.view.ViewGroup", &[VIEW]),
    ("android.widget.TextView", &[VIEW]),
    ("android.widget.ImageView", &[VIEW]),
    ("android.widget.ProgressBar", &[VIEW]),
    ("android.widget.Button", &["android.widget.TextView"]),
    ("android.widget.EditText", &["android.widget.TextView"]),
    ("android.widget.CompoundButton", &["android.widget.Button"]),
    ("android.widget.CheckBox", &["android.widget.CompoundButton"]),
    ("android.widget.Switch", &["android.widget.CompoundButton"]),
    ("android.widget.ImageButton", &["android.widget.ImageView"]),
    ("android.widget.FrameLayout", &[VIEW_GROUP]),
    ("android.widget.LinearLayout", &[VIEW_GROUP]),
    ("android.widget.RelativeLayout", &[VIEW_GROUP]),
    ("android.widget.ScrollView", &["android.widget.FrameLayout"]),
    ("android.widget.AdapterView", &[VIEW_GROUP]),
    ("android.widget.AbsListView", &["android.widget.AdapterView"]),
    ("android.widget.ListView", &["android.widget.AbsListView"]),
    ("androidx.recyclerview.widget.RecyclerView", &[VIEW_GROUP]),
    ("android.support.v7.widget.RecyclerView", &[VIEW_GROUP]),
    ("androidx.constraintlayout.widget.ConstraintLayout", &[VIEW_GROUP]),
    ("android.support.constraint.ConstraintLayout", &[VIEW_GROUP]),
    ("androidx.cardview.widget.CardView", &["android.widget.FrameLayout"]),
    ("androidx.appcompat.widget.Toolbar", &[VIEW_GROUP]),
    ("androidx.appcompat.widget.AppCompatTextView", &["android.widget.TextView"]),
    ("androidx.appcompat.widget.AppCompatButton", &["android.widget.Button"]),
    ("androidx.appcompat.widget.AppCompatImageView", &["android.widget.ImageView"]),
    // Activities, services and friends
    ("android.content.ContextWrapper", &["android.content.Context"]),
    ("android.view.ContextThemeWrapper", &[CONTEXT_WRAPPER]),
    ("android.app.Activity", &["android.view.ContextThemeWrapper"]),
    ("android.app.Service", &[CONTEXT_WRAPPER]),
    ("android.app.Application", &[CONTEXT_WRAPPER]),
    ("android.app.ListActivity", &[ACTIVITY]),
    ("android.app.Fragment", &[]),
    ("android.support.v4.app.FragmentActivity", &[ACTIVITY]),
    ("android.support.v7.app.AppCompatActivity", &["android.support.v4.app.FragmentActivity"]),
    ("android.support.v4.app.Fragment", &[]),
    ("androidx.core.app.ComponentActivity", &[ACTIVITY]),
    ("androidx.activity.ComponentActivity", &["androidx.core.app.ComponentActivity"]),
    ("androidx.fragment.app.FragmentActivity", &["androidx.activity.ComponentActivity"]),
    ("androidx.appcompat.app.AppCompatActivity", &["androidx.fragment.app.FragmentActivity"]),
    ("androidx.fragment.app.Fragment", &[]),
    // Throwables
    ("java.lang.Throwable", &[]),
    ("java.lang.Exception", &["java.lang.Throwable"]),
    ("java.lang.Error", &["java.lang.Throwable"]),
    ("java.lang.RuntimeException", &["java.lang.Exception"]),
    ("java.lang.IllegalStateException", &["java.lang.RuntimeException"]),
    ("java.lang.IllegalArgumentException", &["java.lang.RuntimeException"]),
    ("java.lang.NullPointerException", &["java.lang.RuntimeException"]),
    ("java.io.IOException", &["java.lang.Exception"]),
    ("kotlin.Throwable", &["java.lang.Throwable"]),
    ("kotlin.Exception", &["java.lang.Exception"]),
    ("kotlin.Error", &["java.lang.Error"]),
    ("kotlin.RuntimeException", &["java.lang.RuntimeException"]),
    ("kotlin.IllegalStateException", &["java.lang.IllegalStateException"]),
    ("kotlin.IllegalArgumentException", &["java.lang.IllegalArgumentException"]),
    ("kotlin.NullPointerException", &["java.lang.NullPointerException"]),
    // Plain classes the rules look for
    ("java.util.Date", &[]),
    ("com.google.gson.Gson", &[]),
    ("kotlin.Any", &[]),
    ("kotlin.String", &[]),
];

/// A resolved type: its simple name, qualified name and every supertype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    name: String,
    qualified: String,
    supertypes: Vec<String>,
}

impl TypeRef {
    /// Creates a type reference with the given transitive supertypes.
    #[must_use]
    pub fn new(qualified: impl Into<String>, supertypes: Vec<String>) -> Self {
        let qualified = qualified.into();
        let name = qualified
            .rsplit('.')
            .next()
            .unwrap_or(qualified.as_str())
            .to_string();
        Self {
            name,
            qualified,
            supertypes,
        }
    }

    /// Simple name (e.g., `Button`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully qualified name as far as it could be resolved.
    #[must_use]
    pub fn qualified(&self) -> &str {
        &self.qualified
    }

    /// Transitive supertypes, nearest first.
    #[must_use]
    pub fn supertypes(&self) -> &[String] {
        &self.supertypes
    }

    /// Returns `true` if this type is `fqn` or inherits from it.
    #[must_use]
    pub fn is_a(&self, fqn: &str) -> bool {
        self.qualified == fqn || self.supertypes.iter().any(|s| s == fqn)
    }
}

/// Supertype table keyed by fully qualified type name.
#[derive(Debug, Clone)]
pub struct TypeFacts {
    supertypes: HashMap<String, Vec<String>>,
    known: HashSet<String>,
}

impl TypeFacts {
    /// A table that knows nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            supertypes: HashMap::new(),
            known: HashSet::new(),
        }
    }

    /// The bundled Android and JDK facts.
    #[must_use]
    pub fn android() -> Self {
        let mut facts = Self::empty();
        for (ty, supers) in DEFAULT_FACTS {
            facts.add(*ty, supers.iter().copied());
        }
        facts
    }

    /// Records the direct supertypes of `fqn`, appending to what is known.
    pub fn add<I, S>(&mut self, fqn: impl Into<String>, supertypes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fqn = fqn.into();
        self.known.insert(fqn.clone());
        let entry = self.supertypes.entry(fqn).or_default();
        for s in supertypes {
            let s = s.into();
            self.known.insert(s.clone());
            if !entry.contains(&s) {
                entry.push(s);
            }
        }
    }

    /// Merges `[types.supertypes]` from configuration.
    #[must_use]
    pub fn with_config(mut self, config: &TypesConfig) -> Self {
        for (ty, supers) in &config.supertypes {
            self.add(ty.as_str(), supers.iter().map(String::as_str));
        }
        self
    }

    /// Returns `true` if `fqn` appears anywhere in the table.
    #[must_use]
    pub fn is_known(&self, fqn: &str) -> bool {
        self.known.contains(fqn)
    }

    /// Direct supertypes of `fqn`.
    #[must_use]
    pub fn direct_supertypes(&self, fqn: &str) -> &[String] {
        self.supertypes.get(fqn).map_or(&[], Vec::as_slice)
    }

    /// Transitive supertypes of `fqn`, breadth first, without `fqn` itself.
    #[must_use]
    pub fn ancestors(&self, fqn: &str) -> Vec<String> {
        ancestors_with(fqn, |ty| self.direct_supertypes(ty).to_vec())
    }
}

impl Default for TypeFacts {
    fn default() -> Self {
        Self::android()
    }
}

/// Breadth-first walk over a supertype relation; cycles are cut.
pub(crate) fn ancestors_with<F>(fqn: &str, mut direct: F) -> Vec<String>
where
    F: FnMut(&str) -> Vec<String>,
{
    let mut seen = HashSet::from([fqn.to_string()]);
    let mut queue = VecDeque::from([fqn.to_string()]);
    let mut out = Vec::new();
    while let Some(ty) = queue.pop_front() {
        for s in direct(&ty) {
            if seen.insert(s.clone()) {
                out.push(s.clone());
                queue.push_back(s);
            }
        }
    }
    out
}
