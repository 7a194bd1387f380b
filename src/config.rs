//! Run configuration, loaded from a TOML file.
//!
//! The config is an immutable input for the duration of one run. Credential
//! values are passed through to the API client opaquely; validation only
//! checks that they are present and not left at placeholder values.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Placeholder credential values shipped in the sample config file. A
/// config still carrying one of these has been copied but never filled in.
const PLACEHOLDERS: [&str; 2] = ["CHANGE_ME", ""];

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub client: ClientConfig,
    pub index: IndexConfig,
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Credentials for the reddit script-type application.
#[derive(Clone, Debug, Deserialize)]
pub struct ClientConfig {
    pub id: String,
    pub secret: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Where the index lives and how to pick the content links out of it.
#[derive(Clone, Debug, Deserialize)]
pub struct IndexConfig {
    /// Reddit path of the index page, e.g. `/r/teslore/wiki/archive`.
    pub path: String,
    /// CSS selector for the content links, e.g. `td:first-child a`.
    pub css: String,
    /// Override for the id-harvesting pattern. Defaults to
    /// [`crate::fullname::DEFAULT_LINK_PATTERN`].
    #[serde(default)]
    pub link_pattern: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ArchiveConfig {
    /// Directory the archive files are written into. Created on first use.
    pub path: PathBuf,
    /// Wrap width for post bodies.
    #[serde(default = "default_wrap_width")]
    pub width: usize,
}

/// Batching and pacing knobs. The defaults are the tested behavior; the
/// remote API documents no hard limits, so these are empirical.
#[derive(Clone, Debug, Deserialize)]
pub struct FetchConfig {
    /// Maximum ids per `/by_id/` query.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Minimum delay between successive successful batch requests.
    #[serde(default = "default_pacing_secs")]
    pub pacing_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            pacing_secs: default_pacing_secs(),
        }
    }
}

fn default_user_agent() -> String {
    format!(
        "rust:postvault:{} (archival scraper)",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_wrap_width() -> usize {
    80
}

fn default_batch_size() -> usize {
    100
}

fn default_pacing_secs() -> u64 {
    1
}

impl Config {
    /// Loads and validates a config file.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!("could not read {}: {e}", path.display()))
        })?;
        let config = Self::parse(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))
    }

    /// Rejects configs with missing or placeholder values. Every failure
    /// names the offending field; the run cannot proceed on defaults for
    /// any of these.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("client.id", &self.client.id),
            ("client.secret", &self.client.secret),
            ("client.username", &self.client.username),
            ("client.password", &self.client.password),
        ] {
            if PLACEHOLDERS.contains(&value.as_str()) {
                return Err(Error::Config(format!(
                    "`{field}` must be set to the value reddit issued for your application"
                )));
            }
        }
        if self.index.path.is_empty() {
            return Err(Error::Config("`index.path` must not be empty".into()));
        }
        if self.index.css.is_empty() {
            return Err(Error::Config("`index.css` must not be empty".into()));
        }
        if self.archive.width == 0 {
            return Err(Error::Config("`archive.width` must be at least 1".into()));
        }
        if self.fetch.batch_size == 0 {
            return Err(Error::Config("`fetch.batch_size` must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [client]
        id = "app-id"
        secret = "app-secret"
        username = "archivist"
        password = "hunter2"

        [index]
        path = "/r/teslore/wiki/archive"
        css = "td:first-child a"

        [archive]
        path = "archive"
    "#;

    #[test]
    fn parses_with_defaults() {
        let config = Config::parse(SAMPLE).unwrap();
        config.validate().unwrap();
        assert_eq!(config.archive.width, 80);
        assert_eq!(config.fetch.batch_size, 100);
        assert_eq!(config.fetch.pacing_secs, 1);
        assert!(config.index.link_pattern.is_none());
    }

    #[test]
    fn rejects_placeholder_credentials() {
        let raw = SAMPLE.replace("\"app-secret\"", "\"CHANGE_ME\"");
        let err = Config::parse(&raw).unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("client.secret"));
    }

    #[test]
    fn rejects_zero_batch_size() {
        let raw = format!("{SAMPLE}\n[fetch]\nbatch_size = 0\n");
        let err = Config::parse(&raw).unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("fetch.batch_size"));
    }

    #[test]
    fn missing_section_is_a_config_error() {
        let raw = SAMPLE.replace("[archive]", "[attic]");
        assert!(matches!(Config::parse(&raw), Err(Error::Config(_))));
    }
}
