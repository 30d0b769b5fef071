//! Resource identities
//!
//! An identity is either an `http(s)://` URL or a local file path. The
//! normalized form is the cache key, so `a.css`, `./a.css?v=1` and
//! `a.css#x` all name the same resource.

use std::path::MAIN_SEPARATOR;

/// Whether an identity is fetched over HTTP(S)
pub fn is_remote(identity: &str) -> bool {
    identity
        .get(..7)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("http://"))
        || identity
            .get(..8)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("https://"))
}

/// Normalize an identity into its cache key.
///
/// Remote: drop the fragment, then a trailing bare `?`.
/// Local: drop everything from the first `?` or `#`, then normalize the path.
pub fn normalize(identity: &str) -> String {
    if identity.is_empty() {
        return String::new();
    }

    if is_remote(identity) {
        let without_fragment = identity.split_once('#').map_or(identity, |(head, _)| head);
        without_fragment
            .strip_suffix('?')
            .unwrap_or(without_fragment)
            .to_string()
    } else {
        let end = identity.find(['?', '#']).unwrap_or(identity.len());
        normalize_path(&identity[..end])
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || (cfg!(windows) && c == '\\')
}

/// Lexical path normalization: collapse separators, resolve `.` and `..`
/// without touching the filesystem. Leading `..` of a relative path is kept.
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let absolute = path.starts_with(is_separator);
    let trailing = path.len() > 1 && path.ends_with(is_separator);

    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split(is_separator) {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            segment => parts.push(segment),
        }
    }

    let separator = MAIN_SEPARATOR.to_string();
    let mut normalized = parts.join(&separator);
    if absolute {
        normalized.insert(0, MAIN_SEPARATOR);
    }
    if normalized.is_empty() {
        normalized.push('.');
    }
    if trailing && !normalized.ends_with(MAIN_SEPARATOR) {
        normalized.push(MAIN_SEPARATOR);
    }
    normalized
}
