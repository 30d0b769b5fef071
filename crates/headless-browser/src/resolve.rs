//! Resolving stylesheet hrefs against the document base

use std::path::Path;

use headless_net::is_remote;
use url::Url;

/// Resolve `href` against `base`.
///
/// Remote bases use URL joining, local bases join relative to the base's
/// directory. An empty base, an empty href or an already absolute href is
/// returned unchanged.
pub fn resolve_href(base: &str, href: &str) -> String {
    if base.is_empty() || href.is_empty() || is_remote(href) {
        return href.to_string();
    }

    if is_remote(base) {
        return match Url::parse(base).and_then(|base| base.join(href)) {
            Ok(url) => url.into(),
            Err(err) => {
                tracing::warn!(base, href, %err, "cannot resolve href against base");
                href.to_string()
            }
        };
    }

    if Path::new(href).is_absolute() {
        return href.to_string();
    }

    let dir = if base.ends_with(['/', std::path::MAIN_SEPARATOR]) {
        Path::new(base)
    } else {
        Path::new(base).parent().unwrap_or_else(|| Path::new(""))
    };
    dir.join(href).to_string_lossy().into_owned()
}
