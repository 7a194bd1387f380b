//! Writes posts to disk as metadata-annotated, word-wrapped files.

use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::config::ArchiveConfig;
use crate::post::Post;
use crate::text;
use crate::Result;

/// What became of one post handed to [`Archivist::archive`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArchiveOutcome {
    Written(PathBuf),
    Skipped,
}

/// Formats posts and writes them into the archive directory.
pub struct Archivist {
    root: PathBuf,
    width: usize,
}

impl Archivist {
    /// Prepares the archive directory. Failure to create it is fatal; the
    /// destination is misconfigured and nothing useful can be written.
    pub async fn create(config: &ArchiveConfig) -> Result<Self> {
        tokio::fs::create_dir_all(&config.path).await?;
        Ok(Self {
            root: config.path.clone(),
            width: config.width,
        })
    }

    /// Archives one post, overwriting any file already at the target name.
    ///
    /// Tombstoned posts are skipped without touching the disk. Two titles
    /// that sanitize to the same filename silently overwrite each other;
    /// the last write wins.
    pub async fn archive(&self, post: &Post) -> Result<ArchiveOutcome> {
        if post.is_tombstone() {
            return Ok(ArchiveOutcome::Skipped);
        }

        let title = text::decode_entities(&post.title);
        let path = self.root.join(file_name(&title));

        let mut contents = metadata_block(post, &title);
        let body = text::decode_entities(&post.selftext);
        contents.push_str(&text::wrap(&body, self.width));

        let mut file = File::create(&path).await?;
        file.write_all(contents.as_bytes()).await?;
        // Dropping a tokio File finishes writes in the background and
        // discards their errors; flush here so a failed write surfaces
        // before the post is counted as archived.
        file.flush().await?;
        Ok(ArchiveOutcome::Written(path))
    }
}

/// Fenced metadata header preceding the body.
fn metadata_block(post: &Post, decoded_title: &str) -> String {
    let date = DateTime::from_timestamp(post.created, 0)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Secs, true);
    format!(
        "---\nauthor: {}\ntitle: {}\ndate: {}\nreddit: {}\n---\n\n",
        post.author, decoded_title, date, post.id
    )
}

/// Derives a filesystem-safe filename from an entity-decoded title.
fn file_name(title: &str) -> String {
    let mut name: String = title
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' | '/' => Some('_'),
            ':' | '"' | '\'' | ',' => None,
            c => Some(c),
        })
        .collect();
    name.push_str(".html.md");
    name
}
