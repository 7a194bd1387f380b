//! Access to the reddit API.
//!
//! [`RedditApi`] is the seam between the pipeline and the transport: the
//! listing and batch fetchers only ever see [`ApiOutcome`] values, so tests
//! drive them with canned fakes. [`RedditClient`] is the real
//! implementation, speaking OAuth2 as a script-type application.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::{Error, Result};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";

/// Fallback wait when the service throttles us without saying for how long.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Outcome of a single API read.
///
/// Throttling is an expected, recoverable condition, so it is a value here
/// rather than an error: the batch fetcher inspects it in a plain match
/// instead of routing control flow through the error channel.
#[derive(Clone, Debug)]
pub enum ApiOutcome {
    Success(Value),
    Throttled { retry_after_secs: u64 },
}

/// Read access to the reddit API.
#[async_trait]
pub trait RedditApi {
    /// Issues a single read for `path` (an API path or query, e.g.
    /// `/r/x/wiki/archive` or `/by_id/t3_a,t3_b.json`).
    ///
    /// Hard failures (transport errors, non-success statuses other than
    /// the throttle signal) are `Err`; throttling is a success-shaped
    /// [`ApiOutcome::Throttled`].
    async fn get(&self, path: &str) -> Result<ApiOutcome>;
}

#[derive(Deserialize)]
struct TokenReply {
    access_token: String,
}

/// Authenticated reqwest-backed client.
pub struct RedditClient {
    http: reqwest::Client,
    token: String,
    user_agent: String,
}

impl RedditClient {
    /// Performs the script-app password grant and returns a connected
    /// client. Credential problems surface as an [`Error::Api`] from the
    /// token endpoint.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::new();
        let response = http
            .post(TOKEN_URL)
            .basic_auth(&config.id, Some(&config.secret))
            .header(reqwest::header::USER_AGENT, &config.user_agent)
            .form(&[
                ("grant_type", "password"),
                ("username", config.username.as_str()),
                ("password", config.password.as_str()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Api {
                path: TOKEN_URL.into(),
                status: response.status().as_u16(),
            });
        }
        let token: TokenReply = response.json().await?;

        Ok(Self {
            http,
            token: token.access_token,
            user_agent: config.user_agent.clone(),
        })
    }
}

#[async_trait]
impl RedditApi for RedditClient {
    async fn get(&self, path: &str) -> Result<ApiOutcome> {
        let url = format!("{API_BASE}{path}");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Ok(ApiOutcome::Throttled { retry_after_secs });
        }
        if !status.is_success() {
            return Err(Error::Api {
                path: path.into(),
                status: status.as_u16(),
            });
        }

        Ok(ApiOutcome::Success(response.json().await?))
    }
}
