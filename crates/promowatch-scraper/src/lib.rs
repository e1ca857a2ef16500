pub mod classify;
pub mod client;
pub mod decode;
pub mod demo;
pub mod error;
pub mod extract;
pub mod normalize;
pub(crate) mod rate_limit;

pub use classify::classify;
pub use client::PageClient;
pub use demo::demo_campaigns;
pub use error::ScraperError;
pub use extract::extract_candidates;
