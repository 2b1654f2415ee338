//! Build variable expansion.
//!
//! Task fields may reference build variables with `${NAME}` syntax. Expansion
//! is fail-open: a reference with no matching variable is left in the text
//! untouched, so a half-configured build never loses information silently.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

/// Environment-style variables resolved from the surrounding build.
pub type BuildVars = IndexMap<String, String>;

static VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("variable pattern"));

/// Replaces every `${NAME}` reference in `text` with its value from `vars`.
///
/// Unknown references are copied through verbatim.
pub fn expand(text: &str, vars: &BuildVars) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for caps in VAR_PATTERN.captures_iter(text) {
        let reference = caps.get(0).expect("match");
        out.push_str(&text[cursor..reference.start()]);
        match vars.get(&caps[1]) {
            Some(value) => out.push_str(value),
            None => out.push_str(reference.as_str()),
        }
        cursor = reference.end();
    }
    out.push_str(&text[cursor..]);
    out
}

/// Boolean semantics for operator-set flag values.
///
/// Accepts "true", "yes", "on" and "1" in any case; everything else is false.
pub fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "on" | "1"
    )
}
