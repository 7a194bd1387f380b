use thiserror::Error;
use tokio::sync::mpsc;

use crate::post::Post;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("The selector you are trying to scrape for is invalid. Selector: {0}")]
    Selector(String),

    #[error("invalid link pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("listing fetch failed: {0}")]
    Listing(String),

    #[error("batch fetch failed: {0}")]
    Fetch(String),

    #[error("batch fetch failed: the remote service would not release its rate limit")]
    RateLimitExhausted,

    #[error("API request to {path} failed with status {status}")]
    Api { path: String, status: u16 },

    #[error("file write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),
    #[error("Couldn't send a post through a channel.")]
    RuntimeSendError,
}

impl From<mpsc::error::SendError<Post>> for Error {
    fn from(_value: mpsc::error::SendError<Post>) -> Self {
        Error::RuntimeSendError
    }
}
