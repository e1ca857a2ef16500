//! Candidate acquisition: live pages first, demo data when that falls short.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::time::Duration;

use promowatch_core::{CandidateRecord, ScrapeStatus};
use promowatch_scraper::demo_campaigns;

use crate::source::PageSource;

/// A target page that produced no candidates because it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub url: String,
    /// `true` when the markup could not be parsed, `false` for fetch failures.
    pub parse: bool,
    pub message: String,
}

/// Candidates for one run and how they were obtained.
#[derive(Debug, Clone)]
pub struct Acquisition {
    pub candidates: Vec<CandidateRecord>,
    pub used_demo_data: bool,
    pub status: ScrapeStatus,
    pub error_message: Option<String>,
    pub page_failures: Vec<PageFailure>,
}

impl Acquisition {
    /// Demo data requested explicitly.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            candidates: demo_campaigns(),
            used_demo_data: true,
            status: ScrapeStatus::Success,
            error_message: None,
            page_failures: Vec::new(),
        }
    }

    /// Applies the fallback rule to a live result: fewer than `min_candidates`
    /// switches to demo data with `partial` status.
    #[must_use]
    pub fn from_live(
        candidates: Vec<CandidateRecord>,
        page_failures: Vec<PageFailure>,
        min_candidates: usize,
    ) -> Self {
        if candidates.len() >= min_candidates {
            return Self {
                candidates,
                used_demo_data: false,
                status: ScrapeStatus::Success,
                error_message: None,
                page_failures,
            };
        }

        let mut message = format!(
            "live extraction produced {} candidate(s), below the minimum of {min_candidates}; \
             using demo data",
            candidates.len()
        );
        if !page_failures.is_empty() {
            let _ = write!(message, "; {} page(s) failed:", page_failures.len());
            for failure in &page_failures {
                let _ = write!(message, " {} ({})", failure.url, failure.message);
            }
        }

        Self {
            candidates: demo_campaigns(),
            used_demo_data: true,
            status: ScrapeStatus::Partial,
            error_message: Some(message),
            page_failures,
        }
    }
}

/// Scrapes every page in order, one at a time, pausing `delay` between
/// requests. Per-page failures are collected, never propagated. Candidates
/// are de-duplicated by name across pages; the first occurrence wins.
pub async fn scrape_pages<S: PageSource + ?Sized>(
    source: &S,
    pages: &[String],
    delay: Duration,
) -> (Vec<CandidateRecord>, Vec<PageFailure>) {
    let mut candidates = Vec::new();
    let mut failures = Vec::new();
    let mut seen_names = HashSet::new();

    for (index, url) in pages.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match source.fetch_candidates(url).await {
            Ok(found) => {
                for candidate in found {
                    let name = candidate.name.trim();
                    if name.is_empty() || !seen_names.insert(name.to_owned()) {
                        continue;
                    }
                    candidates.push(candidate);
                }
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "page scrape failed");
                failures.push(PageFailure {
                    url: url.clone(),
                    parse: e.is_parse(),
                    message: e.to_string(),
                });
            }
        }
    }

    (candidates, failures)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str) -> CandidateRecord {
        CandidateRecord::new(name, None, "https://example.com/")
    }

    #[test]
    fn live_result_meeting_threshold_is_success() {
        let live: Vec<_> = (0..5).map(|i| candidate(&format!("Offer {i}"))).collect();
        let acquisition = Acquisition::from_live(live.clone(), Vec::new(), 5);
        assert_eq!(acquisition.status, ScrapeStatus::Success);
        assert!(!acquisition.used_demo_data);
        assert!(acquisition.error_message.is_none());
        assert_eq!(acquisition.candidates, live);
    }

    #[test]
    fn page_failures_do_not_degrade_a_result_meeting_threshold() {
        let live: Vec<_> = (0..5).map(|i| candidate(&format!("Offer {i}"))).collect();
        let failure = PageFailure {
            url: "https://example.com/down".to_string(),
            parse: false,
            message: "timed out".to_string(),
        };
        let acquisition = Acquisition::from_live(live, vec![failure], 5);
        assert_eq!(acquisition.status, ScrapeStatus::Success);
        assert!(acquisition.error_message.is_none());
        assert_eq!(acquisition.page_failures.len(), 1);
    }

    #[test]
    fn thin_live_result_falls_back_to_demo() {
        let acquisition =
            Acquisition::from_live(vec![candidate("Offer A"), candidate("Offer B")], Vec::new(), 5);
        assert_eq!(acquisition.status, ScrapeStatus::Partial);
        assert!(acquisition.used_demo_data);
        assert_eq!(acquisition.candidates, demo_campaigns());
        let message = acquisition.error_message.unwrap();
        assert!(message.contains("2 candidate(s)"), "got: {message}");
    }

    #[test]
    fn fallback_message_lists_failed_pages() {
        let failure = PageFailure {
            url: "https://example.com/down".to_string(),
            parse: false,
            message: "timed out".to_string(),
        };
        let acquisition = Acquisition::from_live(Vec::new(), vec![failure], 5);
        let message = acquisition.error_message.unwrap();
        assert!(message.contains("1 page(s) failed"), "got: {message}");
        assert!(message.contains("https://example.com/down"), "got: {message}");
    }

    #[test]
    fn zero_threshold_never_falls_back() {
        let acquisition = Acquisition::from_live(Vec::new(), Vec::new(), 0);
        assert_eq!(acquisition.status, ScrapeStatus::Success);
        assert!(acquisition.candidates.is_empty());
    }

    #[test]
    fn explicit_demo_is_success() {
        let acquisition = Acquisition::demo();
        assert_eq!(acquisition.status, ScrapeStatus::Success);
        assert!(acquisition.used_demo_data);
        assert_eq!(acquisition.candidates.len(), 10);
    }
}
