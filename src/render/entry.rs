// src/render/entry.rs
// =============================================================================
// Picks the one file that represents an assignment when it's opened.
//
// Precedence, roughly what a person skimming the repository would click:
//   1. index.html at the root
//   2. the first other .html at the root
//   3. the first .html anywhere
//   4. nothing (the caller decides whether that's a problem)
//
// "First" means first in the order GitHub listed the tree. We don't sort,
// so ties follow the upstream order.
// =============================================================================

const ROOT_INDEX: &str = "index.html";

/// Chooses the entry file among `paths`, or None if there's no HTML at all.
pub fn pick_entry<S: AsRef<str>>(paths: &[S]) -> Option<String> {
    let is_html = |p: &&str| p.ends_with(".html");
    let is_root = |p: &&str| !p.contains('/');

    if paths.iter().any(|p| p.as_ref() == ROOT_INDEX) {
        return Some(ROOT_INDEX.to_string());
    }

    let first_root_html = paths
        .iter()
        .map(|p| p.as_ref())
        .filter(is_root)
        .find(is_html);

    first_root_html
        .or_else(|| paths.iter().map(|p| p.as_ref()).find(is_html))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_index() {
        assert_eq!(pick_entry(&["index.html"]), Some("index.html".to_string()));
    }

    #[test]
    fn test_index_beats_earlier_root_html() {
        assert_eq!(
            pick_entry(&["about.html", "index.html"]),
            Some("index.html".to_string())
        );
    }

    #[test]
    fn test_first_root_html_in_listing_order() {
        assert_eq!(
            pick_entry(&["docs/index.html", "zeta.html", "alpha.html"]),
            Some("zeta.html".to_string())
        );
    }

    #[test]
    fn test_nested_html() {
        assert_eq!(pick_entry(&["a/b.html"]), Some("a/b.html".to_string()));
        assert_eq!(
            pick_entry(&["README.md", "site/index.html", "site/other.html"]),
            Some("site/index.html".to_string())
        );
    }

    #[test]
    fn test_nested_index_is_not_root_index() {
        assert_eq!(
            pick_entry(&["pages/index.html", "home.html"]),
            Some("home.html".to_string())
        );
    }

    #[test]
    fn test_no_html() {
        assert_eq!(pick_entry(&["readme.md"]), None);
        assert_eq!(pick_entry::<&str>(&[]), None);
    }

    #[test]
    fn test_htm_is_not_html() {
        assert_eq!(pick_entry(&["old.htm"]), None);
    }
}
