// src/render/rewrite.rs
// =============================================================================
// Rewrites relative asset links in an HTML page so they point at the raw
// content host.
//
// When we show a branch live inside an iframe, the page is served from our
// own origin, so `<img src="logo.png">` would resolve against us instead of
// the repository. Prefixing every relative src/href with
// `https://raw.githubusercontent.com/<owner>/<repo>/<branch>/` fixes that.
//
// This is a plain text substitution, NOT an HTML parser:
// - only double-quoted src="..." and href="..." are touched
// - single-quoted attributes and CSS url(...) are left as they are
// - anything already absolute (http://, https://, data:, #..., mailto:) is kept
// =============================================================================

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Values starting with one of these are never rewritten
const ABSOLUTE_PREFIXES: &[&str] = &["http://", "https://", "data:", "#", "mailto:"];

static LINK_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(src|href)="([^"]+)""#).expect("link attribute pattern is valid")
});

/// Prefixes every relative `src="..."` / `href="..."` value with `base_url`.
///
/// `base_url` should end with a slash, e.g.
/// `https://raw.githubusercontent.com/acme/demo/main/`.
///
/// Example:
///   `<img src="img/a.png">` -> `<img src="https://raw.githubusercontent.com/acme/demo/main/img/a.png">`
pub fn rewrite_relative_urls(html: &str, base_url: &str) -> String {
    LINK_ATTRIBUTE
        .replace_all(html, |caps: &Captures| {
            let attribute = &caps[1];
            let value = &caps[2];

            if is_absolute(value) {
                caps[0].to_string()
            } else {
                format!(r#"{}="{}{}""#, attribute, base_url, value)
            }
        })
        .into_owned()
}

fn is_absolute(value: &str) -> bool {
    ABSOLUTE_PREFIXES.iter().any(|prefix| value.starts_with(prefix))
}
