use std::sync::OnceLock;

use regex::Regex;

/// Default pattern for harvesting post ids out of raw index links.
///
/// Matches `/r/<sub>/comments/<id>/<slug>` and deep wiki content links
/// (`/r/<sub>/wiki/<...>/<id>/<slug>`). Bare wiki pages like
/// `/r/x/wiki/index` carry no post id and must not match, so the pattern
/// requires either a `comments` segment or at least one path segment
/// between `wiki/` and the id.
pub const DEFAULT_LINK_PATTERN: &str = r"/r/[^/]+/(?:comments|wiki/.+)/(?P<id>[0-9a-z]+)/.+";

fn default_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(DEFAULT_LINK_PATTERN).unwrap())
}

/// Transforms raw reddit links into fullnames (`t3_<id>`).
///
/// Links that do not match the pattern are dropped silently; index pages
/// carry navigation and decoration links alongside the content links, and
/// those are expected, not an error. Output order follows input order with
/// the dropped entries removed.
pub fn fullnames<S: AsRef<str>>(links: &[S], pattern: Option<&Regex>) -> Vec<String> {
    let pattern = pattern.unwrap_or_else(|| default_pattern());
    links
        .iter()
        .filter_map(|link| {
            pattern
                .captures(link.as_ref())
                .and_then(|caps| caps.name("id"))
                .map(|id| fullname(id.as_str()))
        })
        .collect()
}

/// Qualifies a bare post id as a fullname. Ids that already carry the
/// `t3_` namespace are returned unchanged.
pub fn fullname(id: &str) -> String {
    if id.starts_with("t3_") {
        id.to_owned()
    } else {
        format!("t3_{id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_links_yield_fullnames() {
        let links = ["/r/x/comments/abc123/foo", "/r/x/wiki/index"];
        assert_eq!(fullnames(&links, None), vec!["t3_abc123"]);
    }

    #[test]
    fn deep_wiki_links_yield_fullnames() {
        let links = ["/r/teslore/wiki/archive/def456/the_title/"];
        assert_eq!(fullnames(&links, None), vec!["t3_def456"]);
    }

    #[test]
    fn non_matching_links_are_dropped_without_gaps() {
        let links = [
            "/message/compose",
            "/r/x/comments/aaa111/one/",
            "https://example.com/about",
            "/r/x/comments/bbb222/two/",
            "/r/x/wiki/index",
        ];
        assert_eq!(fullnames(&links, None), vec!["t3_aaa111", "t3_bbb222"]);
    }

    #[test]
    fn override_pattern_is_honored() {
        let pattern = Regex::new(r"^post-(?P<id>[0-9a-z]+)$").unwrap();
        let links = ["post-zzz999", "/r/x/comments/abc123/foo"];
        assert_eq!(fullnames(&links, Some(&pattern)), vec!["t3_zzz999"]);
    }

    #[test]
    fn fullname_is_idempotent() {
        assert_eq!(fullname("abc123"), "t3_abc123");
        assert_eq!(fullname("t3_abc123"), "t3_abc123");
    }
}
