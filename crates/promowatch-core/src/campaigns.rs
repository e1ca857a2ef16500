//! Campaign, scrape-log and run-summary types shared by every crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed category set assigned to every stored campaign.
///
/// `General` is the catch-all for text matching no keyword set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignCategory {
    Family,
    Dining,
    Seasonal,
    Rewards,
    Travel,
    Business,
    Spa,
    Wedding,
    Promotion,
    General,
}

impl CampaignCategory {
    pub const ALL: [CampaignCategory; 10] = [
        CampaignCategory::Family,
        CampaignCategory::Dining,
        CampaignCategory::Seasonal,
        CampaignCategory::Rewards,
        CampaignCategory::Travel,
        CampaignCategory::Business,
        CampaignCategory::Spa,
        CampaignCategory::Wedding,
        CampaignCategory::Promotion,
        CampaignCategory::General,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CampaignCategory::Family => "family",
            CampaignCategory::Dining => "dining",
            CampaignCategory::Seasonal => "seasonal",
            CampaignCategory::Rewards => "rewards",
            CampaignCategory::Travel => "travel",
            CampaignCategory::Business => "business",
            CampaignCategory::Spa => "spa",
            CampaignCategory::Wedding => "wedding",
            CampaignCategory::Promotion => "promotion",
            CampaignCategory::General => "general",
        }
    }

    /// Parses a stored label; unknown labels map to `General`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == label)
            .unwrap_or(CampaignCategory::General)
    }
}

impl std::fmt::Display for CampaignCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A campaign as discovered on a page (or supplied by the demo provider),
/// before classification and matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: String,
    pub info: Option<String>,
    /// Origin page or resolved campaign link; empty when unknown.
    pub source_url: String,
}

impl CandidateRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, info: Option<&str>, source_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            info: info.map(str::to_owned),
            source_url: source_url.into(),
        }
    }

    /// Name and description joined for keyword classification.
    #[must_use]
    pub fn classification_text(&self) -> String {
        match &self.info {
            Some(info) => format!("{} {info}", self.name),
            None => self.name.clone(),
        }
    }
}

/// A stored campaign row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub id: i64,
    pub competitor_name: String,
    pub name: String,
    /// Never null; an absent description is stored as an empty string.
    pub info: String,
    pub source_url: String,
    pub category: CampaignCategory,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub is_active: bool,
}

impl CampaignRecord {
    /// Whole days between `last_seen_at` and `now`.
    #[must_use]
    pub fn days_since_seen(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_seen_at).num_days().max(0)
    }

    /// Duplicate-matching rule: same name, and the same source URL when both
    /// sides carry one.
    #[must_use]
    pub fn matches_key(&self, name: &str, source_url: &str) -> bool {
        self.name == name
            && (self.source_url.is_empty() || source_url.is_empty() || self.source_url == source_url)
    }
}

/// Fields for a first insertion; `seen_at` becomes both `first_seen_at` and
/// `last_seen_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCampaign {
    pub competitor_name: String,
    pub name: String,
    pub info: String,
    pub source_url: String,
    pub category: CampaignCategory,
    pub seen_at: DateTime<Utc>,
}

/// Partial update of a stored campaign. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignUpdate {
    pub last_seen_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub info: Option<String>,
    pub category: Option<CampaignCategory>,
}

impl CampaignUpdate {
    /// Update for a campaign matched again in a run.
    #[must_use]
    pub fn rematch(seen_at: DateTime<Utc>) -> Self {
        Self {
            last_seen_at: Some(seen_at),
            is_active: Some(true),
            ..Self::default()
        }
    }

    /// Update for a previously active campaign absent from a run.
    /// `last_seen_at` is deliberately left as the last real observation.
    #[must_use]
    pub fn deactivate() -> Self {
        Self {
            is_active: Some(false),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeStatus {
    Success,
    Partial,
    Failed,
}

impl ScrapeStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScrapeStatus::Success => "success",
            ScrapeStatus::Partial => "partial",
            ScrapeStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ScrapeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// One scrape-log entry, appended once per run and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewScrapeLog {
    pub run_at: DateTime<Utc>,
    pub competitor_name: String,
    /// Competitor homepage (or first target page) the run was aimed at.
    pub source_url: String,
    pub status: ScrapeStatus,
    pub campaigns_found: i32,
    pub new_campaigns: i32,
    pub error_message: Option<String>,
}

/// Result of one reconciliation run, returned to every caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub run_at: DateTime<Utc>,
    pub status: ScrapeStatus,
    pub campaigns_found: usize,
    pub new_campaigns: usize,
    pub updated_campaigns: usize,
    pub deactivated_campaigns: usize,
    pub used_demo_data: bool,
    pub error_message: Option<String>,
}

pub const DEFAULT_QUERY_LIMIT: i64 = 50;
pub const MAX_QUERY_LIMIT: i64 = 200;

/// Dashboard filter over stored campaigns. Results are ordered by
/// `last_seen_at` descending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CampaignQuery {
    /// Case-insensitive substring of the competitor name.
    pub competitor: Option<String>,
    /// Exact category label; `"all"` disables the filter.
    pub category: Option<String>,
    pub is_active: Option<bool>,
    /// Case-insensitive substring of name or description.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl CampaignQuery {
    /// `limit` clamped to `1..=MAX_QUERY_LIMIT`, defaulting to
    /// `DEFAULT_QUERY_LIMIT`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_QUERY_LIMIT)
            .clamp(1, MAX_QUERY_LIMIT)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// Category filter with blanks and `"all"` treated as absent.
    #[must_use]
    pub fn category_filter(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != "all")
    }

    #[must_use]
    pub fn search_filter(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn competitor_filter(&self) -> Option<&str> {
        self.competitor
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Applies every filter except pagination to one record.
    #[must_use]
    pub fn matches(&self, campaign: &CampaignRecord) -> bool {
        if let Some(competitor) = self.competitor_filter() {
            if !contains_ignore_case(&campaign.competitor_name, competitor) {
                return false;
            }
        }
        if let Some(category) = self.category_filter() {
            if campaign.category.as_str() != category {
                return false;
            }
        }
        if let Some(active) = self.is_active {
            if campaign.is_active != active {
                return false;
            }
        }
        if let Some(search) = self.search_filter() {
            if !contains_ignore_case(&campaign.name, search)
                && !contains_ignore_case(&campaign.info, search)
            {
                return false;
            }
        }
        true
    }
}

/// One page of query results plus the unpaginated total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignPage {
    pub items: Vec<CampaignRecord>,
    pub total: i64,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
