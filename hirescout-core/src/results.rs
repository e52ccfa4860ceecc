// Result accumulation for a single run

use hirescout_scanner::result::CompanyVerdict;
use serde::{Deserialize, Serialize};

/// The three output lists of a run plus every verdict behind them.
///
/// `found` holds one URL per board hit in probing order, `unresolved` the
/// keys of companies with no hit in input order. A company contributes to
/// exactly one of the two.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSets {
    pub search: Vec<String>,
    pub found: Vec<String>,
    pub unresolved: Vec<String>,
    pub verdicts: Vec<CompanyVerdict>,
}

impl ResultSets {
    pub fn new(search: Vec<String>) -> Self {
        Self {
            search,
            ..Self::default()
        }
    }

    pub fn record(&mut self, verdict: CompanyVerdict) {
        if verdict.resolved() {
            self.found.extend(verdict.hit_urls.iter().cloned());
        } else {
            self.unresolved.push(verdict.company.clone());
        }
        self.verdicts.push(verdict);
    }

    /// Keys of companies with at least one hit, in probing order.
    pub fn resolved_companies(&self) -> Vec<&str> {
        self.verdicts
            .iter()
            .filter(|v| v.resolved())
            .map(|v| v.company.as_str())
            .collect()
    }

    pub fn failed_probes(&self) -> usize {
        self.verdicts.iter().map(|v| v.failed_boards()).sum()
    }

    /// A run succeeded when it had companies to search and found at least
    /// one hiring board.
    pub fn accomplished(&self) -> bool {
        !self.search.is_empty() && !self.found.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hirescout_scanner::result::{ProbeErrorKind, ProbeOutcome};

    fn verdict(company: &str, hits: &[&str], misses: usize) -> CompanyVerdict {
        let mut outcomes: Vec<ProbeOutcome> = hits
            .iter()
            .map(|url| ProbeOutcome::new(company.to_string(), "board".to_string(), url.to_string(), 1))
            .collect();
        for i in 0..misses {
            outcomes.push(ProbeOutcome::with_error(
                company.to_string(),
                "board".to_string(),
                format!("https://miss.test/{i}"),
                ProbeErrorKind::Timeout,
                "timed out".to_string(),
            ));
        }
        CompanyVerdict::from_outcomes(company.to_string(), outcomes)
    }

    #[test]
    fn test_record_partitions_companies() {
        let mut results = ResultSets::new(vec!["Acme".to_string(), "Beta".to_string()]);
        results.record(verdict("acme", &["https://a.test/acme", "https://b.test/acme"], 0));
        results.record(verdict("beta", &[], 2));

        assert_eq!(results.found, vec!["https://a.test/acme", "https://b.test/acme"]);
        assert_eq!(results.unresolved, vec!["beta"]);
        assert_eq!(results.resolved_companies(), vec!["acme"]);
        assert_eq!(results.failed_probes(), 2);
        assert!(results.accomplished());
    }

    #[test]
    fn test_not_accomplished_without_hits_or_search() {
        let mut results = ResultSets::new(vec!["Beta".to_string()]);
        results.record(verdict("beta", &[], 0));
        assert!(!results.accomplished());

        let mut empty_search = ResultSets::new(Vec::new());
        empty_search.record(verdict("acme", &["https://a.test/acme"], 0));
        assert!(!empty_search.accomplished());
    }
}
