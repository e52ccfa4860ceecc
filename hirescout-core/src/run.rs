use crate::config::Settings;
use crate::normalize::{dedupe_keys, dedupe_names};
use crate::persist::load_company_list;
use crate::results::ResultSets;
use chrono::{DateTime, Utc};
use hirescout_scanner::driver::PageDriver;
use hirescout_scanner::harvester::{HarvestProgressCallback, HarvestReport, Harvester};
use hirescout_scanner::prober::Prober;
use hirescout_scanner::result::CompanyVerdict;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Where the company names come from.
#[derive(Debug, Clone)]
pub enum CompanySource {
    /// Harvest the lazy list rendered at this URL.
    Harvest { url: String },
    /// Reload a list saved by an earlier run.
    File(PathBuf),
    Names(Vec<String>),
}

/// Callback for reporting run progress messages
pub type RunProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Callback for reporting each company verdict as it is decided
pub type VerdictCallback = Arc<dyn Fn(&CompanyVerdict) + Send + Sync>;

#[derive(Clone, Default)]
pub struct RunCallbacks {
    pub on_message: Option<RunProgressCallback>,
    pub on_harvest_progress: Option<HarvestProgressCallback>,
    pub on_verdict: Option<VerdictCallback>,
}

impl RunCallbacks {
    fn message(&self, msg: String) {
        if let Some(ref callback) = self.on_message {
            callback(msg);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub harvest: Option<HarvestReport>,
    /// Normalized keys in the order they were probed.
    pub keys: Vec<String>,
    pub results: ResultSets,
}

impl RunReport {
    pub fn accomplished(&self) -> bool {
        self.results.accomplished()
    }
}

/// Harvest the configured list at `url`.
pub async fn execute_harvest(
    driver: &mut dyn PageDriver,
    settings: &Settings,
    url: &str,
    callbacks: &RunCallbacks,
) -> HarvestReport {
    let mut harvester = Harvester::new(settings.harvest_options());
    if let Some(ref callback) = callbacks.on_harvest_progress {
        harvester = harvester.with_progress_callback(callback.clone());
    }

    let report = harvester.harvest(driver, url).await;
    if !report.converged() {
        callbacks.message(format!(
            "[!] Harvest stopped early ({}); continuing with {} names",
            report.reason.describe(),
            report.names.len()
        ));
    }
    report
}

/// Probe every key in order, accumulating the result sets.
pub async fn probe_companies(
    driver: &mut dyn PageDriver,
    settings: &Settings,
    search: Vec<String>,
    keys: &[String],
    callbacks: &RunCallbacks,
) -> ResultSets {
    let prober = Prober::new(settings.boards.clone(), settings.probe_options());
    let mut results = ResultSets::new(search);

    for (idx, key) in keys.iter().enumerate() {
        if key.is_empty() {
            warn!("Company #{} normalized to an empty key", idx + 1);
        }
        let verdict = prober.probe(driver, key).await;
        if let Some(ref callback) = callbacks.on_verdict {
            callback(&verdict);
        }
        results.record(verdict);
    }

    results
}

/// Collect names from `source`, then probe every normalized company.
///
/// Only driver-session creation can abort a run, and that happens before
/// this is called; here every failure degrades to a partial result.
pub async fn execute_run(
    driver: &mut dyn PageDriver,
    settings: &Settings,
    source: CompanySource,
    callbacks: &RunCallbacks,
) -> RunReport {
    let started_at = Utc::now();

    let (names, harvest) = match source {
        CompanySource::Harvest { url } => {
            let report = execute_harvest(driver, settings, &url, callbacks).await;
            (report.names.clone(), Some(report))
        }
        CompanySource::File(path) => match load_company_list(&path) {
            Ok(names) => (names, None),
            Err(e) => {
                callbacks.message(format!(
                    "[!] Error reading from {}: {}",
                    path.display(),
                    e
                ));
                (Vec::new(), None)
            }
        },
        CompanySource::Names(names) => (names, None),
    };
    // A reloaded or hand-written list may repeat names; the harvest never does.
    let names = dedupe_names(names);

    let keys = dedupe_keys(&names);
    info!(
        "Probing {} companies ({} names) on {} boards",
        keys.len(),
        names.len(),
        settings.boards.len()
    );

    let results = probe_companies(driver, settings, names, &keys, callbacks).await;

    RunReport {
        started_at,
        finished_at: Utc::now(),
        harvest,
        keys,
        results,
    }
}
