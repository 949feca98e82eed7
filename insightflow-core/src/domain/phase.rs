//! Research pipeline phases
//!
//! The backend only reports a free-text progress label. The views map it
//! onto the four agents of the pipeline so progress can be shown as a
//! position rather than a sentence.

use std::fmt;

/// Pipeline phase derived from a progress label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResearchPhase {
    /// No agent has picked the job up yet
    Starting,
    Planning,
    Gathering,
    Analyzing,
    Reporting,
    Complete,
}

impl ResearchPhase {
    /// The agent phases in pipeline order (excludes `Starting` and `Complete`)
    pub const AGENTS: [ResearchPhase; 4] = [
        ResearchPhase::Planning,
        ResearchPhase::Gathering,
        ResearchPhase::Analyzing,
        ResearchPhase::Reporting,
    ];

    /// Classify a progress label
    ///
    /// Matching is case-insensitive and substring based. Labels that match
    /// no agent mean no agent is active yet (`Starting`); completion is
    /// decided by the job status, never by the label.
    pub fn from_progress(label: &str) -> Self {
        let label = label.to_lowercase();

        if label.contains("plan") {
            ResearchPhase::Planning
        } else if label.contains("gather") || label.contains("search") {
            ResearchPhase::Gathering
        } else if label.contains("analyze") {
            ResearchPhase::Analyzing
        } else if label.contains("report") || label.contains("generat") {
            ResearchPhase::Reporting
        } else {
            ResearchPhase::Starting
        }
    }

    /// Display name of the agent responsible for this phase
    pub fn agent_name(&self) -> &'static str {
        match self {
            ResearchPhase::Starting => "Starting",
            ResearchPhase::Planning => "Planner",
            ResearchPhase::Gathering => "Gatherer",
            ResearchPhase::Analyzing => "Analyst",
            ResearchPhase::Reporting => "Writer",
            ResearchPhase::Complete => "Done",
        }
    }

    /// Whether this phase comes strictly before `other` in the pipeline
    pub fn is_before(&self, other: ResearchPhase) -> bool {
        *self < other
    }
}

impl fmt::Display for ResearchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResearchPhase::Starting => "starting",
            ResearchPhase::Planning => "planning",
            ResearchPhase::Gathering => "gathering",
            ResearchPhase::Analyzing => "analyzing",
            ResearchPhase::Reporting => "reporting",
            ResearchPhase::Complete => "complete",
        };
        f.write_str(s)
    }
}
