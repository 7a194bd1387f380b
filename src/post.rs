use serde::{Deserialize, Deserializer};

/// Bodies reddit substitutes for content that was taken down. Posts
/// carrying one of these are archived as nothing at all.
const TOMBSTONES: [&str; 2] = ["[deleted]", "[removed]"];

/// One archivable text post, as returned by the `/by_id/` endpoint.
///
/// Constructed straight from the child `data` payload of a Listing
/// response; fields the archiver does not need are simply not exposed.
#[derive(Clone, Debug, Deserialize)]
pub struct Post {
    /// Service-assigned base-36 id, without the type prefix.
    pub id: String,
    /// Namespace-qualified form of the id (`t3_<id>`).
    #[serde(rename = "name")]
    pub fullname: String,
    #[serde(default)]
    pub author: String,
    /// May contain HTML entities; decode before display or filenames.
    pub title: String,
    /// Unix timestamp. Reddit serializes this as a float, older payloads
    /// as a numeric string.
    #[serde(deserialize_with = "timestamp")]
    pub created: i64,
    /// Raw Markdown body, or a tombstone sentinel.
    #[serde(default)]
    pub selftext: String,
    /// Entity-escaped HTML rendering of the body.
    #[serde(default)]
    pub selftext_html: Option<String>,
}

impl Post {
    /// True when the body is a deletion sentinel rather than real content.
    pub fn is_tombstone(&self) -> bool {
        TOMBSTONES.contains(&self.selftext.as_str())
    }
}

fn timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n as i64),
        Raw::Text(s) => s
            .trim()
            .parse::<f64>()
            .map(|n| n as i64)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Post {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn deserializes_from_listing_child_data() {
        let post = parse(
            r#"{
                "id": "abc123",
                "name": "t3_abc123",
                "author": "lu_ming",
                "title": "Jel Language",
                "created": 1480000000.0,
                "selftext": "body text",
                "selftext_html": "&lt;p&gt;body text&lt;/p&gt;",
                "score": 42
            }"#,
        );
        assert_eq!(post.fullname, "t3_abc123");
        assert_eq!(post.created, 1480000000);
        assert!(!post.is_tombstone());
    }

    #[test]
    fn accepts_numeric_string_timestamps() {
        let post = parse(
            r#"{"id":"a","name":"t3_a","author":"x","title":"t","created":"1480000000","selftext":""}"#,
        );
        assert_eq!(post.created, 1480000000);
    }

    #[test]
    fn tombstones_are_detected() {
        for body in ["[deleted]", "[removed]"] {
            let post = parse(&format!(
                r#"{{"id":"a","name":"t3_a","author":"x","title":"t","created":1,"selftext":"{body}"}}"#
            ));
            assert!(post.is_tombstone());
        }
    }
}
