use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// The tracked competitor and the pages scraped for it, in fetch order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorConfig {
    pub name: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub pages: Vec<String>,
}

/// Load and validate the competitor configuration from a YAML file.
///
/// An empty `pages` list passes validation; whether a run can proceed
/// without target pages is decided by the reconciliation engine.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_competitor(path: &Path) -> Result<CompetitorConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CompetitorFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_competitor(&content)
}

/// Parse and validate competitor configuration from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the text is not valid YAML or fails validation.
pub fn parse_competitor(content: &str) -> Result<CompetitorConfig, ConfigError> {
    let mut competitor: CompetitorConfig = serde_yaml::from_str(content)?;
    competitor.name = competitor.name.trim().to_string();
    validate_competitor(&competitor)?;
    Ok(competitor)
}

fn validate_competitor(competitor: &CompetitorConfig) -> Result<(), ConfigError> {
    if competitor.name.is_empty() {
        return Err(ConfigError::Validation(
            "competitor name must be non-empty".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for page in &competitor.pages {
        if !(page.starts_with("https://") || page.starts_with("http://")) {
            return Err(ConfigError::Validation(format!(
                "page '{page}' must be an http(s) URL"
            )));
        }
        if !seen.insert(page.trim_end_matches('/')) {
            return Err(ConfigError::Validation(format!("duplicate page: '{page}'")));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "competitor_test.rs"]
mod tests;
