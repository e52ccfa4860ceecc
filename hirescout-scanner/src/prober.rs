use crate::catalog::JobBoard;
use crate::driver::PageDriver;
use crate::error::Result;
use crate::result::{CompanyVerdict, ProbeOutcome};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub type ProbeCallback = Arc<dyn Fn(&ProbeOutcome) + Send + Sync>;

pub fn default_keywords() -> Vec<String> {
    ["engineer", "developer", "Engineer", "Developer"]
        .iter()
        .map(|k| k.to_string())
        .collect()
}

#[derive(Debug, Clone)]
pub struct ProbeOptions {
    pub keywords: Vec<String>,
    pub settle: Duration,
    pub stop_on_first_hit: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            settle: Duration::from_millis(200),
            stop_on_first_hit: false,
        }
    }
}

/// Visits every job board for a company and decides whether any of them
/// lists engineering roles.
pub struct Prober {
    catalog: Vec<JobBoard>,
    options: ProbeOptions,
    callback: Option<ProbeCallback>,
}

impl Prober {
    pub fn new(catalog: Vec<JobBoard>, options: ProbeOptions) -> Self {
        Self {
            catalog,
            options,
            callback: None,
        }
    }

    pub fn with_callback(mut self, callback: ProbeCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Probe `company` on each board in catalog order. A failing board is
    /// recorded as a miss and never stops the remaining boards.
    pub async fn probe(&self, driver: &mut dyn PageDriver, company: &str) -> CompanyVerdict {
        let mut outcomes = Vec::with_capacity(self.catalog.len());

        for board in &self.catalog {
            let outcome = self.probe_board(driver, company, board).await;
            if let Some(ref callback) = self.callback {
                callback(&outcome);
            }

            let hit = outcome.hit;
            outcomes.push(outcome);
            if hit && self.options.stop_on_first_hit {
                debug!("{}: stopping after first hit on {}", company, board.name);
                break;
            }
        }

        let verdict = CompanyVerdict::from_outcomes(company.to_string(), outcomes);
        info!(
            "{}: {} of {} boards hit",
            company,
            verdict.hit_urls.len(),
            verdict.outcomes.len()
        );
        verdict
    }

    async fn probe_board(
        &self,
        driver: &mut dyn PageDriver,
        company: &str,
        board: &JobBoard,
    ) -> ProbeOutcome {
        let url = board.url_for(company);
        let start = Instant::now();

        let mut outcome = match self.count_matches(driver, &url).await {
            Ok(matches) => {
                debug!("{} on {}: {} keyword matches", company, board.name, matches);
                ProbeOutcome::new(company.to_string(), board.name.clone(), url, matches)
            }
            Err(e) => {
                warn!("Error - {}: {} ({})", company, url, e);
                ProbeOutcome::with_error(
                    company.to_string(),
                    board.name.clone(),
                    url,
                    e.kind(),
                    e.to_string(),
                )
            }
        };
        outcome.elapsed = start.elapsed();
        outcome
    }

    async fn count_matches(&self, driver: &mut dyn PageDriver, url: &str) -> Result<usize> {
        driver.navigate(url).await?;
        tokio::time::sleep(self.options.settle).await;
        driver.count_text_matches(&self.options.keywords).await
    }
}
