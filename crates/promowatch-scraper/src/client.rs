use std::time::Duration;

use promowatch_core::{AppConfig, CandidateRecord};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{Client, Url};

use crate::decode::decode_body;
use crate::error::ScraperError;
use crate::extract::extract_candidates;
use crate::rate_limit::retry_with_backoff;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_ZH: &str = "zh-CN,zh;q=0.9,en;q=0.8";

/// HTTP client for competitor pages.
///
/// Sends browser-like headers, bounds every request by a timeout, decodes
/// the body using the charset declared in the response header or the markup
/// (UTF-8 when neither declares one) and retries transient failures with exponential backoff.
pub struct PageClient {
    client: Client,
    timeout_secs: u64,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl PageClient {
    /// Creates a `PageClient` with the given timeout, `User-Agent` and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_ZH));

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            timeout_secs,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Builds a client from the scraper settings in `config`.
    ///
    /// # Errors
    ///
    /// See [`PageClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            config.scraper.request_timeout_secs,
            &config.scraper.user_agent,
            config.scraper.max_retries,
            config.scraper.retry_backoff_base_secs,
        )
    }

    /// Fetches one page and returns its decoded markup.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] if `url` is not an absolute http(s) URL.
    /// - [`ScraperError::Timeout`] if the request exceeds the timeout.
    /// - [`ScraperError::UnexpectedStatus`] for any non-2xx status.
    /// - [`ScraperError::Http`] for other network failures.
    /// - [`ScraperError::Parse`] if the response is not a text document.
    ///
    /// Transient errors are only returned once retries are exhausted.
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScraperError> {
        let parsed = parse_page_url(url)?;

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let parsed = parsed.clone();
            async move {
                let response = self
                    .client
                    .get(parsed)
                    .send()
                    .await
                    .map_err(|e| self.map_request_error(e, url))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_owned(),
                    });
                }

                let content_type = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                if let Some(content_type) = content_type.as_deref() {
                    if !is_text_document(content_type) {
                        return Err(ScraperError::Parse {
                            url: url.to_owned(),
                            reason: format!("unsupported content type \"{content_type}\""),
                        });
                    }
                }

                let body = response
                    .bytes()
                    .await
                    .map_err(|e| self.map_request_error(e, url))?;
                Ok(decode_body(&body, content_type.as_deref()))
            }
        })
        .await
    }

    /// Fetches one page and extracts its candidate campaigns.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_page`] or
    /// [`extract_candidates`].
    pub async fn scrape_page(&self, url: &str) -> Result<Vec<CandidateRecord>, ScraperError> {
        let markup = self.fetch_page(url).await?;
        let candidates = extract_candidates(&markup, url)?;
        tracing::info!(url, count = candidates.len(), "scraped page");
        Ok(candidates)
    }

    fn map_request_error(&self, error: reqwest::Error, url: &str) -> ScraperError {
        if error.is_timeout() {
            ScraperError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.timeout_secs,
            }
        } else {
            ScraperError::Http(error)
        }
    }
}

fn parse_page_url(url: &str) -> Result<Url, ScraperError> {
    let parsed = Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
        });
    }
    Ok(parsed)
}

fn is_text_document(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("text/") || mime.contains("html") || mime.contains("xml")
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
