//! Lazy-list harvesting.
//!
//! A virtualized list only mounts the rows near the viewport, so the full
//! set of names is collected by reading the visible window, scrolling, and
//! reading again until a stop rule decides nothing more will appear.

use crate::driver::PageDriver;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub type HarvestProgressCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Insertion-ordered set of harvested names.
#[derive(Debug, Clone, Default)]
pub struct NameSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl NameSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name, returning whether it was new.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.seen.contains(name) {
            return false;
        }
        self.seen.insert(name.to_string());
        self.order.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarvestState {
    Accumulating,
    Converged,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    NoGrowth { rounds: usize },
    SentinelSeen(String),
    CeilingReached(usize),
    WaitBudgetExhausted { misses: usize },
    ScrollFailed(String),
    NavigationFailed(String),
    DriverFailed(String),
}

impl StopReason {
    pub fn describe(&self) -> String {
        match self {
            StopReason::NoGrowth { rounds } => {
                format!("no new rows after {} consecutive scrolls", rounds)
            }
            StopReason::SentinelSeen(value) => format!("last row '{}' observed", value),
            StopReason::CeilingReached(n) => format!("expected ceiling of {} rows reached", n),
            StopReason::WaitBudgetExhausted { misses } => {
                format!("rows did not appear after {} attempts", misses)
            }
            StopReason::ScrollFailed(e) => format!("scroll dispatch failed: {}", e),
            StopReason::NavigationFailed(e) => format!("could not open list: {}", e),
            StopReason::DriverFailed(e) => format!("driver failed: {}", e),
        }
    }
}

/// Snapshot handed to stop rules after every read.
pub struct HarvestProgress<'a> {
    pub names: &'a NameSet,
    /// Names first seen in this read.
    pub added: usize,
    pub round: usize,
}

/// Decides whether the list has been exhausted.
pub trait StopRule: Send {
    fn check(&mut self, progress: &HarvestProgress<'_>) -> Option<StopReason>;
}

/// Stops after `limit` consecutive reads that added nothing.
pub struct NoGrowth {
    limit: usize,
    streak: usize,
}

impl NoGrowth {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            streak: 0,
        }
    }
}

impl StopRule for NoGrowth {
    fn check(&mut self, progress: &HarvestProgress<'_>) -> Option<StopReason> {
        if progress.added == 0 {
            self.streak += 1;
        } else {
            self.streak = 0;
        }
        (self.streak >= self.limit).then_some(StopReason::NoGrowth {
            rounds: self.streak,
        })
    }
}

/// Stops once a known final row has been seen.
pub struct Sentinel(pub String);

impl StopRule for Sentinel {
    fn check(&mut self, progress: &HarvestProgress<'_>) -> Option<StopReason> {
        progress
            .names
            .contains(&self.0)
            .then(|| StopReason::SentinelSeen(self.0.clone()))
    }
}

/// Stops once the accumulator reaches an expected size.
pub struct Ceiling(pub usize);

impl StopRule for Ceiling {
    fn check(&mut self, progress: &HarvestProgress<'_>) -> Option<StopReason> {
        (progress.names.len() >= self.0).then_some(StopReason::CeilingReached(self.0))
    }
}

/// Override applied on top of the no-growth rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "strategy", content = "value", rename_all = "snake_case")]
pub enum TerminationPolicy {
    #[default]
    Convergence,
    Sentinel(String),
    /// `None` takes the ceiling from the list's record-count badge.
    Ceiling(Option<usize>),
}

#[derive(Debug, Clone)]
pub struct HarvestOptions {
    pub row_selector: String,
    pub wait_selector: String,
    pub scroll_container: String,
    pub scroll_delta: i64,
    pub count_selector: Option<String>,
    pub policy: TerminationPolicy,
    pub no_growth_limit: usize,
    pub wait_retry_budget: usize,
    pub wait_timeout: Duration,
    pub settle: Duration,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            row_selector: "[data-columnid] > div > div".to_string(),
            wait_selector: "[data-columnid]".to_string(),
            scroll_container: ".paneContainer".to_string(),
            scroll_delta: 900,
            count_selector: None,
            policy: TerminationPolicy::Convergence,
            no_growth_limit: 3,
            wait_retry_budget: 3,
            wait_timeout: Duration::from_secs(2),
            settle: Duration::from_millis(1500),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestReport {
    pub names: Vec<String>,
    pub state: HarvestState,
    pub reason: StopReason,
    pub scrolls: usize,
    pub misses: usize,
}

impl HarvestReport {
    pub fn converged(&self) -> bool {
        self.state == HarvestState::Converged
    }
}

/// Concatenate every ASCII digit in `text` into one number.
///
/// Record-count badges look like "1,402 records"; this reads them as 1402.
pub fn extract_number(text: &str) -> Option<usize> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

pub struct Harvester {
    options: HarvestOptions,
    extra_rules: Vec<Box<dyn StopRule>>,
    progress_callback: Option<HarvestProgressCallback>,
}

impl Harvester {
    pub fn new(options: HarvestOptions) -> Self {
        Self {
            options,
            extra_rules: Vec::new(),
            progress_callback: None,
        }
    }

    /// Install an additional stop rule, checked after the configured ones.
    pub fn with_rule(mut self, rule: Box<dyn StopRule>) -> Self {
        self.extra_rules.push(rule);
        self
    }

    pub fn with_progress_callback(mut self, callback: HarvestProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Open `url` and harvest the list it renders.
    ///
    /// Never fails: every failure ends the harvest early and the names seen
    /// so far are returned with `HarvestState::Aborted`.
    pub async fn harvest(self, driver: &mut dyn PageDriver, url: &str) -> HarvestReport {
        info!("Harvesting list at {}", url);
        if let Err(e) = driver.navigate(url).await {
            warn!("Could not open list source {}: {}", url, e);
            return HarvestReport {
                names: Vec::new(),
                state: HarvestState::Aborted,
                reason: StopReason::NavigationFailed(e.to_string()),
                scrolls: 0,
                misses: 0,
            };
        }
        self.harvest_current(driver).await
    }

    /// Harvest the list on the page the driver is already showing.
    pub async fn harvest_current(mut self, driver: &mut dyn PageDriver) -> HarvestReport {
        let opts = self.options.clone();
        let mut names = NameSet::new();
        let mut rules: Vec<Box<dyn StopRule>> = Vec::new();
        let mut policy_pending = true;

        let mut state = HarvestState::Accumulating;
        let mut reason = None;
        let mut round = 0;
        let mut scrolls = 0;
        let mut misses = 0;
        let mut consecutive_misses = 0;

        while state == HarvestState::Accumulating {
            let read = match driver.wait_for(&opts.wait_selector, opts.wait_timeout).await {
                Ok(()) => driver.visible_texts(&opts.row_selector).await,
                Err(e) => Err(e),
            };

            let texts = match read {
                Ok(texts) => {
                    consecutive_misses = 0;
                    texts
                }
                Err(e) if e.is_transient() => {
                    misses += 1;
                    consecutive_misses += 1;
                    debug!(
                        "Rows not ready ({}/{}): {}",
                        consecutive_misses, opts.wait_retry_budget, e
                    );
                    if consecutive_misses > opts.wait_retry_budget {
                        state = HarvestState::Aborted;
                        reason = Some(StopReason::WaitBudgetExhausted {
                            misses: consecutive_misses,
                        });
                    } else {
                        tokio::time::sleep(opts.settle).await;
                    }
                    continue;
                }
                Err(e) => {
                    state = HarvestState::Aborted;
                    reason = Some(StopReason::DriverFailed(e.to_string()));
                    continue;
                }
            };

            // Rules are built after the first successful read so that the
            // record-count badge has had a chance to render.
            if policy_pending {
                policy_pending = false;
                rules = self.build_rules(driver).await;
            }

            let added = texts
                .iter()
                .map(|text| text.trim())
                .filter(|name| !name.is_empty())
                .filter(|name| names.insert(name))
                .count();
            debug!(
                "Round {}: {} visible, {} new, {} total",
                round,
                texts.len(),
                added,
                names.len()
            );
            if let Some(ref callback) = self.progress_callback {
                callback(names.len());
            }

            let progress = HarvestProgress {
                names: &names,
                added,
                round,
            };
            // Every rule sees every round so counters stay in step.
            let fired: Vec<StopReason> = rules
                .iter_mut()
                .filter_map(|rule| rule.check(&progress))
                .collect();
            round += 1;

            if let Some(first) = fired.into_iter().next() {
                state = HarvestState::Converged;
                reason = Some(first);
                continue;
            }

            if let Err(e) = driver.scroll(&opts.scroll_container, opts.scroll_delta).await {
                warn!("Scroll dispatch failed, keeping {} names: {}", names.len(), e);
                state = HarvestState::Aborted;
                reason = Some(StopReason::ScrollFailed(e.to_string()));
                continue;
            }
            scrolls += 1;
            tokio::time::sleep(opts.settle).await;
        }

        let reason = reason
            .unwrap_or_else(|| StopReason::DriverFailed("harvest ended without a reason".to_string()));
        info!(
            "Harvest finished with {} names after {} scrolls: {}",
            names.len(),
            scrolls,
            reason.describe()
        );
        if names.is_empty() {
            warn!("Harvest produced no names; nothing will be probed");
        }

        HarvestReport {
            names: names.into_vec(),
            state,
            reason,
            scrolls,
            misses,
        }
    }

    async fn build_rules(&mut self, driver: &mut dyn PageDriver) -> Vec<Box<dyn StopRule>> {
        let mut rules: Vec<Box<dyn StopRule>> = Vec::new();

        let hint = match self.options.count_selector.as_deref() {
            Some(selector) => read_count_hint(driver, selector).await,
            None => None,
        };

        match &self.options.policy {
            TerminationPolicy::Convergence => {
                if let Some(count) = hint {
                    info!("List reports {} records", count);
                }
            }
            TerminationPolicy::Sentinel(value) => {
                // Names are trimmed before they are stored.
                rules.push(Box::new(Sentinel(value.trim().to_string())));
            }
            TerminationPolicy::Ceiling(Some(ceiling)) => {
                rules.push(Box::new(Ceiling(*ceiling)));
            }
            TerminationPolicy::Ceiling(None) => match hint {
                Some(count) => {
                    info!("Using record count {} as the ceiling", count);
                    rules.push(Box::new(Ceiling(count)));
                }
                None => warn!("No record count available; relying on convergence only"),
            },
        }

        rules.push(Box::new(NoGrowth::new(self.options.no_growth_limit)));
        rules.append(&mut self.extra_rules);
        rules
    }
}

async fn read_count_hint(driver: &mut dyn PageDriver, selector: &str) -> Option<usize> {
    match driver.read_text(selector).await {
        Ok(Some(text)) => extract_number(&text),
        Ok(None) => None,
        Err(e) => {
            debug!("Record count unavailable: {}", e);
            None
        }
    }
}
