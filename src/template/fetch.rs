//! Remote template fetching.
//!
//! Shorthand expansion is a pure string rewrite ahead of a generic
//! fetch-by-URL; the HTTP client sits behind this narrow struct so tests
//! can point it at a mock server.

use std::time::Duration;

use tracing::debug;

use crate::error::{DocmanError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Expand the `github:owner/repo/path` shorthand to the raw-content URL,
/// pinning the default branch via `HEAD`. Anything else passes through
/// unchanged.
#[must_use]
pub fn expand_shorthand(url: &str) -> String {
    match url.strip_prefix("github:") {
        Some(rest) => {
            let mut parts = rest.splitn(3, '/');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(owner), Some(repo), Some(path)) => {
                    format!("https://raw.githubusercontent.com/{owner}/{repo}/HEAD/{path}")
                }
                // Malformed shorthand; let the fetch fail with the real URL.
                _ => format!("https://raw.githubusercontent.com/{rest}"),
            }
        }
        None => url.to_string(),
    }
}

/// Blocking HTTP fetcher with an explicit timeout. Failures are surfaced
/// immediately as `TemplateFetchFailed`; there are no retries and no
/// fallback to a local template.
pub struct TemplateFetcher {
    client: reqwest::blocking::Client,
}

impl TemplateFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DocmanError::Config(format!("http client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetch a template by URL or `github:` shorthand.
    pub fn fetch(&self, url: &str) -> Result<String> {
        let expanded = expand_shorthand(url);
        debug!(url = %expanded, "fetching template");

        let response = self
            .client
            .get(&expanded)
            .send()
            .map_err(|e| DocmanError::TemplateFetchFailed(format!("{expanded}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocmanError::TemplateFetchFailed(format!(
                "{expanded}: HTTP {status}"
            )));
        }

        response
            .text()
            .map_err(|e| DocmanError::TemplateFetchFailed(format!("{expanded}: {e}")))
    }
}
