//! Rule to keep data frameworks out of Android classes.
//!
//! # Rationale
//!
//! Activities, fragments and other Android components should not fetch or
//! store data themselves; that belongs to other classes.
//!
//! # Detected Patterns
//!
//! A file that both imports a data framework (Retrofit, OkHttp, Volley, Room,
//! `SharedPreferences`, `android.database`, `java.net`) and declares a type
//! extending an Android framework class.
//!
//! # Suppression
//!
//! - `// lin: allow(no-data-frameworks-from-android-class)` comment

use crate::{paragraph, Builtin, Patterns};
use lin_core::{HostNode, RuleError, RuleMeta, RuleNode};
use lin_kotlin::KotlinNode;

/// Rule code for no-data-frameworks-from-android-class.
pub const CODE: &str = "LIN008";

/// Rule name for no-data-frameworks-from-android-class.
pub const NAME: &str = "no-data-frameworks-from-android-class";

/// Import prefixes of data frameworks.
const DATA_FRAMEWORKS: &[&str] = &[
    "com.squareup.retrofit",
    "com.squareup.retrofit2",
    "retrofit2.",
    "com.squareup.okhttp",
    "okhttp3",
    "com.android.volley",
    "com.mcxiaoke.volley",
    "androidx.room",
    "android.arch.persistence.room",
    "android.content.SharedPreferences",
    "android.database",
    "java.net",
];

/// Package prefixes of Android component base classes.
const ANDROID_COMPONENTS: &[&str] = &[
    "android.app.",
    "android.support.v4.app.",
    "android.support.v7.app.",
    "androidx.appcompat.app.",
    "androidx.fragment.app.",
    "androidx.activity.",
];

pub(crate) const RULE: Builtin = Builtin {
    code: CODE,
    name: NAME,
    meta,
    patterns,
};

fn meta() -> RuleMeta {
    RuleMeta::new(
        CODE,
        NAME,
        "Framework classes to get or store data should never be called from Activities, Fragments or any other Android related view.",
    )
    .explanation(paragraph(&[
        "Your Android classes should not be responsible for retrieving or storing information, that should be",
        "responsibility of another classes.",
    ]))
}

fn patterns() -> Result<Patterns, RuleError> {
    Ok(vec![RuleNode::file().children([
        RuleNode::import().such_that(is_data_framework_import),
        RuleNode::type_().such_that(extends_android_component),
    ])])
}

fn is_data_framework_import(import: &KotlinNode) -> bool {
    import
        .name()
        .is_some_and(|path| DATA_FRAMEWORKS.iter().any(|p| path.starts_with(p)))
}

fn extends_android_component(ty: &KotlinNode) -> bool {
    ty.supertypes()
        .iter()
        .any(|s| ANDROID_COMPONENTS.iter().any(|p| s.starts_with(p)))
        || ty.is_subtype_of("android.app.Activity")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check;

    #[test]
    fn flags_retrofit_in_activity() {
        let src = r"import androidx.appcompat.app.AppCompatActivity
import retrofit2.Retrofit
import com.squareup.retrofit2.Call

class UsersActivity : AppCompatActivity()
";
        let result = check(&RULE, &[("UsersActivity.kt", src)]);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].location.line, 2);
    }

    #[test]
    fn indirect_activity_subclass_is_flagged() {
        let src = r"import android.app.Activity
import android.content.SharedPreferences

open class BaseActivity : Activity()
class SettingsActivity : BaseActivity()
";
        let result = check(&RULE, &[("Settings.kt", src)]);
        assert_eq!(result.violations.len(), 1);
    }

    #[test]
    fn data_frameworks_in_plain_classes_pass() {
        let src = "import java.net.URL\n\nclass Repository(val url: URL)\n";
        let result = check(&RULE, &[("Repository.kt", src)]);
        assert!(result.violations.is_empty());
    }
}
