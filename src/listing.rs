//! Index scanning: turns one listing request into the raw links it embeds.
//!
//! Reddit answers a wiki-page query with a single HTML dump and a post
//! query with a Listing of children, and it stores the markup under
//! `content_html` or `selftext_html` depending on which one it was. Both
//! shapes reduce to the same thing here: a flat, ordered list of hrefs.

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{ApiOutcome, RedditApi};
use crate::{extract, fullname, text};
use crate::{Error, Result};

/// Scrapes the global index page at `path`, returning every link the
/// `selector` matches, in page order.
pub async fn fetch_index<C: RedditApi>(
    api: &C,
    path: &str,
    selector: &str,
) -> Result<Vec<String>> {
    scrape_listing(api, path, selector).await
}

/// Reddit truncates `/by_id/` queries beyond this many fullnames.
const BY_ID_QUERY_LIMIT: usize = 100;

/// Scrapes the bodies of specific discussion threads instead of a general
/// index page. `ids` may be bare post ids or full `t3_` fullnames.
///
/// Large id sets are split across several queries; the per-thread link
/// order is preserved.
pub async fn fetch_thread_index<C: RedditApi, S: AsRef<str>>(
    api: &C,
    ids: &[S],
    selector: &str,
) -> Result<Vec<String>> {
    let fullnames: Vec<String> = ids
        .iter()
        .map(|id| fullname::fullname(id.as_ref()))
        .collect();
    let mut links = Vec::new();
    for chunk in fullnames.chunks(BY_ID_QUERY_LIMIT) {
        let query = format!("/by_id/{}", chunk.join(","));
        links.extend(scrape_listing(api, &query, selector).await?);
    }
    Ok(links)
}

async fn scrape_listing<C: RedditApi>(
    api: &C,
    path: &str,
    selector: &str,
) -> Result<Vec<String>> {
    let payload = match api.get(path).await {
        Ok(ApiOutcome::Success(payload)) => payload,
        Ok(ApiOutcome::Throttled { .. }) => {
            return Err(Error::Listing(format!(
                "rate limited while scanning `{path}`"
            )))
        }
        Err(e) => return Err(Error::Listing(e.to_string())),
    };

    let mut links = Vec::new();
    for item in listing_items(&payload) {
        let Some(html) = item_html(item) else {
            // Navigation stubs and deleted children have neither HTML
            // field; they carry no links and are not worth aborting over.
            debug!(path, "listing item without an HTML body, skipping");
            continue;
        };
        // The embedded markup is entity-escaped; decode exactly once
        // before handing it to the selector.
        let decoded = text::decode_entities(html);
        links.extend(extract::extract_links(&decoded, selector)?);
    }
    Ok(links)
}

/// Reduces either response shape to the items that may carry HTML.
fn listing_items(payload: &Value) -> Vec<&Value> {
    match payload.get("kind").and_then(Value::as_str) {
        Some("wikipage") => payload.get("data").into_iter().collect(),
        Some("Listing") => payload
            .pointer("/data/children")
            .and_then(Value::as_array)
            .map(|children| children.iter().filter_map(|c| c.get("data")).collect())
            .unwrap_or_default(),
        kind => {
            warn!(?kind, "unrecognized listing kind, treating as empty");
            Vec::new()
        }
    }
}

/// The two HTML-bearing fields are mutually exclusive; take whichever is
/// present.
fn item_html(item: &Value) -> Option<&str> {
    item.get("content_html")
        .or_else(|| item.get("selftext_html"))
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    struct FakeApi {
        replies: Mutex<Vec<Result<ApiOutcome>>>,
        paths: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn returning(replies: Vec<Result<ApiOutcome>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                paths: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RedditApi for FakeApi {
        async fn get(&self, path: &str) -> Result<ApiOutcome> {
            self.paths.lock().unwrap().push(path.to_owned());
            self.replies.lock().unwrap().remove(0)
        }
    }

    const ESCAPED_TABLE: &str = "&lt;table&gt;&lt;tr&gt;\
        &lt;td&gt;&lt;a href=\"/r/x/comments/abc123/foo/\"&gt;Foo&lt;/a&gt;&lt;/td&gt;\
        &lt;/tr&gt;&lt;/table&gt;";

    #[tokio::test]
    async fn wiki_page_yields_links() {
        let api = FakeApi::returning(vec![Ok(ApiOutcome::Success(json!({
            "kind": "wikipage",
            "data": { "content_html": ESCAPED_TABLE }
        })))]);
        let links = fetch_index(&api, "/r/x/wiki/archive", "td a").await.unwrap();
        assert_eq!(links, vec!["/r/x/comments/abc123/foo/"]);
    }

    #[tokio::test]
    async fn listing_children_are_flattened_in_order() {
        let second = ESCAPED_TABLE.replace("abc123/foo", "def456/bar");
        let api = FakeApi::returning(vec![Ok(ApiOutcome::Success(json!({
            "kind": "Listing",
            "data": { "children": [
                { "kind": "t3", "data": { "selftext_html": ESCAPED_TABLE } },
                { "kind": "t3", "data": { "title": "no body here" } },
                { "kind": "t3", "data": { "selftext_html": second } },
            ]}
        })))]);
        let links = fetch_index(&api, "/r/x/comments/zzz", "td a").await.unwrap();
        assert_eq!(
            links,
            vec!["/r/x/comments/abc123/foo/", "/r/x/comments/def456/bar/"]
        );
    }

    #[tokio::test]
    async fn unrecognized_kind_is_empty_not_fatal() {
        let api = FakeApi::returning(vec![Ok(ApiOutcome::Success(json!({
            "kind": "more", "data": {}
        })))]);
        let links = fetch_index(&api, "/r/x/wiki/archive", "td a").await.unwrap();
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn thread_index_queries_by_fullname() {
        let api = FakeApi::returning(vec![Ok(ApiOutcome::Success(json!({
            "kind": "Listing",
            "data": { "children": [] }
        })))]);
        let links = fetch_thread_index(&api, &["56j7pq", "t3_55erkr"], "td a")
            .await
            .unwrap();
        assert!(links.is_empty());
        assert_eq!(
            api.paths.lock().unwrap().as_slice(),
            ["/by_id/t3_56j7pq,t3_55erkr"]
        );
    }

    #[tokio::test]
    async fn thread_index_splits_oversized_id_sets() {
        let empty = || {
            Ok(ApiOutcome::Success(json!({
                "kind": "Listing",
                "data": { "children": [] }
            })))
        };
        let api = FakeApi::returning(vec![empty(), empty()]);
        let ids: Vec<String> = (0..150).map(|i| format!("{i:x}")).collect();

        fetch_thread_index(&api, &ids, "td a").await.unwrap();

        let paths = api.paths.lock().unwrap();
        let sizes: Vec<usize> = paths.iter().map(|p| p.matches(',').count() + 1).collect();
        assert_eq!(sizes, vec![100, 50]);
    }

    #[tokio::test]
    async fn throttle_during_listing_is_fatal() {
        let api = FakeApi::returning(vec![Ok(ApiOutcome::Throttled {
            retry_after_secs: 3,
        })]);
        let err = fetch_index(&api, "/r/x/wiki/archive", "td a")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Listing(_)));
    }
}
