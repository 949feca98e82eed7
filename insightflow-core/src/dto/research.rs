//! Research submission DTOs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where the backend should look for sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Web,
    Academic,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Web => f.write_str("web"),
            SearchMode::Academic => f.write_str("academic"),
        }
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "web" => Ok(SearchMode::Web),
            "academic" => Ok(SearchMode::Academic),
            other => Err(format!(
                "unknown search mode '{}', expected 'web' or 'academic'",
                other
            )),
        }
    }
}

/// Request body for `POST /api/research`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchRequest {
    pub query: String,
    #[serde(default)]
    pub search_mode: SearchMode,
    /// Only meaningful in academic mode
    #[serde(default)]
    pub min_citations: u32,
    /// Only meaningful in academic mode
    #[serde(default)]
    pub open_access: bool,
}

impl ResearchRequest {
    /// Create a web-mode request with default filters
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            search_mode: SearchMode::default(),
            min_citations: 0,
            open_access: false,
        }
    }

    /// Switch to academic mode with the given filters
    pub fn academic(mut self, min_citations: u32, open_access: bool) -> Self {
        self.search_mode = SearchMode::Academic;
        self.min_citations = min_citations;
        self.open_access = open_access;
        self
    }

    /// Reject requests the backend would only waste a job on
    pub fn validate(&self) -> Result<(), String> {
        if self.query.trim().is_empty() {
            return Err("Please enter a query".to_string());
        }
        Ok(())
    }
}

/// Response body of `POST /api/research`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchResponse {
    pub job_id: String,
    pub status: String,
}
