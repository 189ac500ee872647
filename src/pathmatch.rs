//! Prefix-aware glob matching on slash-separated paths
//!
//! Used both by the HTTP client policy (insecure patterns) and by the
//! only-releases policy in the checker. A pattern matches when it globs the
//! prefix of the target truncated to the pattern's segment count, so `a/b`
//! matches any target under `a/b/`.

use glob::Pattern;

const COMMA: char = ',';
const SLASH: char = '/';

/// Reports whether any segment prefix of `target` matches one of the
/// comma-separated glob patterns in `globs`
///
/// Blank patterns are ignored. A pattern with more segments than the target
/// cannot match. An empty target never matches.
pub fn matches(globs: &str, target: &str) -> bool {
    if target.is_empty() {
        return false;
    }
    let dst: Vec<&str> = target.split(SLASH).collect();
    for glob in globs.split(COMMA) {
        let glob = glob.trim();
        if glob.is_empty() {
            continue;
        }
        let src_len = glob.split(SLASH).count();
        if src_len > dst.len() {
            continue;
        }
        let prefix = dst[..src_len].join("/");
        if Pattern::new(glob).is_ok_and(|p| p.matches(&prefix)) {
            return true;
        }
    }
    false
}
