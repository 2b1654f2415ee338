//! Token substitution for custom command templates.
//!
//! Custom command fragments may reference invocation values with `{key}`
//! tokens. Keys under the reserved `deploy.` prefix resolve against the
//! current [`InvocationParameters`]; every other token is left in the text
//! verbatim, delimiters included. Unresolvable tokens are never an error,
//! they degrade to literal text.

use once_cell::sync::Lazy;
use regex::Regex;

use super::params::InvocationParameters;

/// Reserved prefix marking keys resolved from invocation parameters.
pub const TOKEN_PREFIX: &str = "deploy.";

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z0-9_.\-]+)\}").expect("token pattern"));

/// Replaces every resolvable `{key}` token in `text`.
///
/// Single left-to-right scan: spans between tokens are copied untouched,
/// and a token whose key does not resolve is copied byte-for-byte.
pub fn substitute(text: &str, params: &InvocationParameters) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for caps in TOKEN_PATTERN.captures_iter(text) {
        let token = caps.get(0).expect("match");
        out.push_str(&text[cursor..token.start()]);
        match resolve_key(&caps[1], params) {
            Some(value) => out.push_str(&value),
            None => out.push_str(token.as_str()),
        }
        cursor = token.end();
    }
    out.push_str(&text[cursor..]);
    out
}

/// Resolves one reserved-prefix key against the invocation parameters.
fn resolve_key(key: &str, params: &InvocationParameters) -> Option<String> {
    let name = key.strip_prefix(TOKEN_PREFIX)?;
    match name {
        "host" => Some(params.environment.host.clone()),
        "port" => Some(params.environment.port.to_string()),
        "protocol" => Some(params.protocol().to_string()),
        "adminurl" => Some(params.admin_url()),
        "name" => Some(params.deployment_name.clone()),
        "source" => params.source_path.clone(),
        "targets" => Some(params.targets.clone()),
        "artifact" => Some(params.artifact_name.clone()),
        "user" => params.environment.user.clone(),
        "remote_dir" => params.environment.remote_dir.clone(),
        "launcher" => Some(params.toolchain.launcher().to_string_lossy().to_string()),
        _ => None,
    }
}
