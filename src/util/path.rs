//! Path helpers: shell expansion and file name sanitization

use std::sync::OnceLock;

use regex::Regex;

/// Expand `~`, `$VAR`, and `${VAR}` in a path string.
///
/// Falls back to the unexpanded input when expansion fails.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Replace characters that are illegal in file names with underscores.
///
/// Covers `< > : " / \ | ? *`, control characters, and newlines, so an
/// ontology descriptor can safely become a cache file name.
pub fn sanitize_filename(name: &str) -> String {
    static ILLEGAL_CHARS: OnceLock<Regex> = OnceLock::new();
    let re = ILLEGAL_CHARS
        .get_or_init(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1F\n]"#).unwrap());
    re.replace_all(name, "_").into_owned()
}
