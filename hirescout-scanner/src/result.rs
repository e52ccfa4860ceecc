use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeErrorKind {
    Navigation,
    Timeout,
    Lookup,
    Script,
    Browser,
}

/// Result of visiting one job board for one company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub company: String,
    pub board: String,
    pub url: String,
    pub hit: bool,
    pub matches: usize,
    pub elapsed: Duration,
    pub error: Option<ProbeErrorKind>,
    pub error_message: Option<String>,
}

impl ProbeOutcome {
    pub fn new(company: String, board: String, url: String, matches: usize) -> Self {
        Self {
            company,
            board,
            url,
            hit: matches > 0,
            matches,
            elapsed: Duration::from_secs(0),
            error: None,
            error_message: None,
        }
    }

    pub fn with_error(
        company: String,
        board: String,
        url: String,
        kind: ProbeErrorKind,
        message: String,
    ) -> Self {
        Self {
            company,
            board,
            url,
            hit: false,
            matches: 0,
            elapsed: Duration::from_secs(0),
            error: Some(kind),
            error_message: Some(message),
        }
    }
}

/// Everything learned about one company after its boards were probed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyVerdict {
    pub company: String,
    pub hit_urls: Vec<String>,
    pub outcomes: Vec<ProbeOutcome>,
}

impl CompanyVerdict {
    pub fn from_outcomes(company: String, outcomes: Vec<ProbeOutcome>) -> Self {
        let hit_urls = outcomes
            .iter()
            .filter(|o| o.hit)
            .map(|o| o.url.clone())
            .collect();
        Self {
            company,
            hit_urls,
            outcomes,
        }
    }

    /// A company is resolved once at least one board showed a role keyword.
    pub fn resolved(&self) -> bool {
        !self.hit_urls.is_empty()
    }

    pub fn failed_boards(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }
}
