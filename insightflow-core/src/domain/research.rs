//! Research result domain types

use serde::{Deserialize, Serialize};

/// Final output of a research job
///
/// Immutable once received from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchResult {
    pub query: String,
    /// Markdown report text
    pub report: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
}

/// A cited source, in the order the backend ranked it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
}

impl ResearchResult {
    /// Whether the report body is empty or whitespace only
    pub fn is_empty(&self) -> bool {
        self.report.trim().is_empty()
    }
}
