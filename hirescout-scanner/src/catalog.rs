// Job-board endpoint catalog

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Placeholder replaced by the company key in a board's URL template.
pub const COMPANY_PLACEHOLDER: &str = "{company}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobBoard {
    pub name: String,
    pub url_template: String,
    /// Text the board shows for an unknown company. Informational only;
    /// classification does not look at it.
    #[serde(default)]
    pub not_found_marker: String,
}

impl JobBoard {
    pub fn new(name: &str, url_template: &str, not_found_marker: &str) -> Self {
        Self {
            name: name.to_string(),
            url_template: url_template.to_string(),
            not_found_marker: not_found_marker.to_string(),
        }
    }

    pub fn url_for(&self, company: &str) -> String {
        self.url_template.replace(COMPANY_PLACEHOLDER, company)
    }
}

/// The boards probed when no catalog is configured.
pub fn default_catalog() -> Vec<JobBoard> {
    vec![
        JobBoard::new(
            "greenhouse",
            "https://boards.greenhouse.io/{company}",
            "Sorry, but we can't find that page.",
        ),
        JobBoard::new(
            "lever",
            "https://jobs.lever.co/{company}",
            "Sorry, we couldn't find anything here",
        ),
        JobBoard::new(
            "indeed",
            "https://www.indeed.com/cmp/{company}/jobs",
            "Page not found.",
        ),
        JobBoard::new(
            "workable",
            "https://apply.workable.com/{company}",
            "Page not found.",
        ),
        JobBoard::new(
            "ashby",
            "https://jobs.ashbyhq.com/{company}",
            "Page not found",
        ),
    ]
}

/// Check a catalog before probing with it. Returns one message per problem.
pub fn validate_catalog(boards: &[JobBoard]) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();
    let mut names = HashSet::new();

    if boards.is_empty() {
        problems.push("catalog has no job boards".to_string());
    }

    for board in boards {
        if board.name.trim().is_empty() {
            problems.push(format!("board with template '{}' has no name", board.url_template));
        } else if !names.insert(board.name.as_str()) {
            problems.push(format!("duplicate board name '{}'", board.name));
        }

        if !board.url_template.contains(COMPANY_PLACEHOLDER) {
            problems.push(format!(
                "board '{}' template is missing {}",
                board.name, COMPANY_PLACEHOLDER
            ));
        } else if let Err(e) = Url::parse(&board.url_for("example")) {
            problems.push(format!("board '{}' template is not a valid URL: {}", board.name, e));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_substitutes_key() {
        let board = JobBoard::new("indeed", "https://www.indeed.com/cmp/{company}/jobs", "");
        assert_eq!(board.url_for("acme"), "https://www.indeed.com/cmp/acme/jobs");
    }

    #[test]
    fn test_url_for_empty_key_is_still_a_url() {
        for board in default_catalog() {
            let url = board.url_for("");
            assert!(Url::parse(&url).is_ok(), "{} produced {}", board.name, url);
        }
    }

    #[test]
    fn test_default_catalog_is_valid_and_ordered() {
        let catalog = default_catalog();
        assert!(validate_catalog(&catalog).is_ok());
        let names: Vec<&str> = catalog.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["greenhouse", "lever", "indeed", "workable", "ashby"]);
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let catalog = vec![
            JobBoard::new("a", "https://a.example/{company}", ""),
            JobBoard::new("a", "https://b.example/{company}", ""),
            JobBoard::new("c", "https://c.example/jobs", ""),
            JobBoard::new("", "not a url {company}", ""),
        ];

        let problems = validate_catalog(&catalog).unwrap_err();
        assert_eq!(problems.len(), 4);
        assert!(problems.iter().any(|p| p.contains("duplicate board name 'a'")));
        assert!(problems.iter().any(|p| p.contains("'c' template is missing")));
        assert!(problems.iter().any(|p| p.contains("has no name")));
        assert!(problems.iter().any(|p| p.contains("not a valid URL")));
    }

    #[test]
    fn test_validate_rejects_empty_catalog() {
        assert!(validate_catalog(&[]).is_err());
    }
}
