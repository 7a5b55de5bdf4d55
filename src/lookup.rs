//! Lookup service: resolves a word against one dictionary.
//!
//! Builds the lookup URL, fetches the result page and hands the body to the
//! extraction engine. Transient transport problems are retried; a page that
//! plainly does not exist is not.

use std::time::Duration;

use anyhow::{Context, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;
use tracing::debug;

use crate::catalog::Dictionary;
use crate::extract::{self, MalformedDocument, TranslationRecord};
use crate::retry::{with_retry_if, RetryConfig};

/// Characters left verbatim when encoding the word into the URL path.
const WORD_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// The dictionary site serves a cut-down page to clients without a
/// conventional browser user-agent.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Why a lookup produced no record.
///
/// Callers surface every variant as the same "lookup failed" outcome to the
/// end user; the distinction exists for logging.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The page could not be retrieved (network error, timeout).
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The dictionary answered with a non-success status.
    #[error("dictionary returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The body could not be parsed into any document tree.
    #[error(transparent)]
    Malformed(#[from] MalformedDocument),
}

impl LookupError {
    /// Transient failures are worth retrying; missing pages and unparseable
    /// bodies are not.
    fn is_transient(&self) -> bool {
        match self {
            LookupError::Transport(_) => true,
            LookupError::Status(status) => status.is_server_error(),
            LookupError::Malformed(_) => false,
        }
    }
}

/// Stateless dictionary lookup client. Cheap to share; every lookup is an
/// independent fetch-and-parse pass with nothing cached in between.
pub struct LookupService {
    client: reqwest::Client,
    retry: RetryConfig,
}

impl LookupService {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            retry: RetryConfig::dictionary_fetch(),
        })
    }

    /// Look `word` up in `dict` and extract a record from the result page.
    pub async fn lookup(
        &self,
        word: &str,
        dict: Dictionary,
    ) -> Result<TranslationRecord, LookupError> {
        self.lookup_at(&lookup_url(word, dict), word).await
    }

    /// Fetch an explicit result-page URL and extract a record from it.
    pub async fn lookup_at(
        &self,
        url: &str,
        word: &str,
    ) -> Result<TranslationRecord, LookupError> {
        debug!("Fetching {}", url);

        let body = with_retry_if(
            &self.retry,
            &format!("lookup '{}'", word),
            || self.fetch(url),
            LookupError::is_transient,
        )
        .await?;

        let record = extract::extract(&body, word)?;
        Ok(record)
    }

    async fn fetch(&self, url: &str) -> Result<String, LookupError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }

        Ok(response.text().await?)
    }
}

/// Lookup URL for a word: the variant's base URL with the word
/// percent-encoded into the path.
pub fn lookup_url(word: &str, dict: Dictionary) -> String {
    format!(
        "{}{}",
        dict.base_url(),
        utf8_percent_encode(word, WORD_ENCODE_SET)
    )
}
