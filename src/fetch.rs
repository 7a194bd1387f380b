//! Batched post retrieval with two-tier throttle handling.
//!
//! Reactive tier: an explicit throttle signal sleeps out the server-supplied
//! delay and retries the same batch, a bounded number of times. Proactive
//! tier: a fixed pacing delay between successive successful batches keeps
//! the run under the service's implicit rate budget so the retry budget is
//! rarely needed at all.

use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::client::{ApiOutcome, RedditApi};
use crate::config::FetchConfig;
use crate::post::Post;
use crate::{Error, Result};

/// Total attempts per batch, the first one included.
const MAX_ATTEMPTS: u32 = 3;

/// Sequential batch fetcher for `/by_id/` queries.
pub struct BatchFetcher<'a, C> {
    api: &'a C,
    batch_size: usize,
    pacing: Duration,
}

impl<'a, C: RedditApi> BatchFetcher<'a, C> {
    pub fn new(api: &'a C, config: &FetchConfig) -> Self {
        Self {
            api,
            batch_size: config.batch_size,
            pacing: Duration::from_secs(config.pacing_secs),
        }
    }

    /// Fetches every post named in `fullnames` and sends the records
    /// through `tx`, in the order the fullnames were given.
    ///
    /// `fullnames` is partitioned into contiguous batches of at most the
    /// configured size; duplicates are fetched again, not deduplicated.
    /// The receiver sees a finite, single-pass sequence; a second pass
    /// requires a fresh fetch.
    pub async fn fetch_all(&self, fullnames: &[String], tx: mpsc::Sender<Post>) -> Result<()> {
        for (batch_no, batch) in fullnames.chunks(self.batch_size).enumerate() {
            if batch_no > 0 {
                sleep(self.pacing).await;
            }
            let payload = self.fetch_batch(batch).await?;

            if payload.get("kind").and_then(Value::as_str) != Some("Listing") {
                warn!(batch_no, "batch response is not a Listing, skipping batch");
                continue;
            }
            let Some(children) = payload.pointer("/data/children").and_then(Value::as_array)
            else {
                warn!(batch_no, "Listing without children array, skipping batch");
                continue;
            };

            for child in children {
                let Some(data) = child.get("data") else {
                    warn!(batch_no, "child without a data payload, skipping");
                    continue;
                };
                match serde_json::from_value::<Post>(data.clone()) {
                    Ok(post) => tx.send(post).await?,
                    Err(e) => warn!(batch_no, error = %e, "malformed post record, skipping"),
                }
            }
        }
        Ok(())
    }

    /// Issues one batch request, sleeping out throttle signals.
    ///
    /// The server-supplied delay gets one extra second of grace before the
    /// retry. A throttle on the final attempt aborts the whole fetch; the
    /// remaining batches would only burn the same budget again.
    async fn fetch_batch(&self, batch: &[String]) -> Result<Value> {
        let query = format!("/by_id/{}.json", batch.join(","));
        for attempt in 1..=MAX_ATTEMPTS {
            let outcome = self
                .api
                .get(&query)
                .await
                .map_err(|e| Error::Fetch(e.to_string()))?;
            match outcome {
                ApiOutcome::Success(payload) => return Ok(payload),
                ApiOutcome::Throttled { retry_after_secs } => {
                    if attempt == MAX_ATTEMPTS {
                        break;
                    }
                    debug!(attempt, retry_after_secs, "throttled, backing off");
                    sleep(Duration::from_secs(retry_after_secs + 1)).await;
                }
            }
        }
        Err(Error::RateLimitExhausted)
    }
}
