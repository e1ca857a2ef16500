use async_trait::async_trait;
use promowatch_core::CandidateRecord;
use promowatch_scraper::{PageClient, ScraperError};

/// Where live candidates come from: one call per target page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_candidates(&self, url: &str) -> Result<Vec<CandidateRecord>, ScraperError>;
}

#[async_trait]
impl PageSource for PageClient {
    async fn fetch_candidates(&self, url: &str) -> Result<Vec<CandidateRecord>, ScraperError> {
        self.scrape_page(url).await
    }
}
