//! End-to-end pipeline: index scan → fullname harvest → batch fetch →
//! archive. Stages hand off through an mpsc channel so the archivist
//! consumes posts as the fetcher produces them.

use regex::Regex;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::archive::{ArchiveOutcome, Archivist};
use crate::client::{RedditApi, RedditClient};
use crate::config::Config;
use crate::fetch::BatchFetcher;
use crate::{fullname, listing};
use crate::Result;

/// What one run should scrape.
#[derive(Clone, Debug)]
pub enum Target {
    /// The configured global index page.
    Index,
    /// Specific discussion threads, given as post ids or fullnames.
    Threads(Vec<String>),
}

/// Counters reported after a completed run.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunStats {
    pub discovered: usize,
    pub written: usize,
    pub skipped: usize,
}

/// Runs the whole pipeline against the live API.
pub async fn run(config: &Config, target: Target) -> Result<RunStats> {
    info!("connecting to reddit");
    let api = RedditClient::connect(&config.client).await?;
    run_with(&api, config, target).await
}

/// Pipeline body, generic over the API seam.
pub async fn run_with<C: RedditApi>(
    api: &C,
    config: &Config,
    target: Target,
) -> Result<RunStats> {
    let links = match &target {
        Target::Index => {
            info!(path = %config.index.path, "scanning index page");
            listing::fetch_index(api, &config.index.path, &config.index.css).await?
        }
        Target::Threads(ids) => {
            info!(threads = ids.len(), "scanning discussion threads");
            listing::fetch_thread_index(api, ids, &config.index.css).await?
        }
    };

    let pattern = config
        .index
        .link_pattern
        .as_deref()
        .map(Regex::new)
        .transpose()?;
    let fullnames = fullname::fullnames(&links, pattern.as_ref());
    info!(
        links = links.len(),
        posts = fullnames.len(),
        "collecting posts"
    );

    let archivist = Archivist::create(&config.archive).await?;
    let (tx, mut rx) = mpsc::channel(256);

    // Consume posts as they arrive; the fetcher paces itself, so the
    // archivist is never the bottleneck.
    let archive_handle = tokio::spawn(async move {
        let mut written = 0usize;
        let mut skipped = 0usize;
        while let Some(post) = rx.recv().await {
            match archivist.archive(&post).await? {
                ArchiveOutcome::Written(path) => {
                    debug!(path = %path.display(), "archived");
                    written += 1;
                }
                ArchiveOutcome::Skipped => {
                    debug!(id = %post.id, "tombstoned post, skipped");
                    skipped += 1;
                }
            }
        }
        Ok::<_, crate::Error>((written, skipped))
    });

    let fetch_result = BatchFetcher::new(api, &config.fetch)
        .fetch_all(&fullnames, tx)
        .await;
    // A failed archivist drops the receiver and poisons the send side, so
    // surface its error before the fetcher's.
    let (written, skipped) = archive_handle.await??;
    fetch_result?;

    let stats = RunStats {
        discovered: fullnames.len(),
        written,
        skipped,
    };
    info!(
        discovered = stats.discovered,
        written = stats.written,
        skipped = stats.skipped,
        "run complete"
    );
    Ok(stats)
}
