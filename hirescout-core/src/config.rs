//! Run configuration.
//!
//! List selectors, termination parameters, timings, keywords and the job-board
//! catalog. Every section defaults independently, so a config file only needs
//! the keys it changes.

use hirescout_scanner::catalog::{JobBoard, default_catalog, validate_catalog};
use hirescout_scanner::chromium::ChromiumOptions;
use hirescout_scanner::harvester::{HarvestOptions, TerminationPolicy};
use hirescout_scanner::prober::{ProbeOptions, default_keywords};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "HIRESCOUT_CONFIG";

/// Config file picked up when nothing else is given.
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/hirescout/config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub url: String,
    pub row_selector: String,
    pub wait_selector: String,
    pub scroll_container: String,
    pub scroll_delta: i64,
    pub count_selector: Option<String>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            url: "https://airtable.com/embed/shrI8dno1rMGKZM8y/tblKU0jQiyIX182uU?backgroundColor=cyan&viewControls=on".to_string(),
            row_selector: r#"[data-columnid="fldekrsjTIcqFNlgA"] > div > div"#.to_string(),
            wait_selector: r#"[data-columnid="fldekrsjTIcqFNlgA"]"#.to_string(),
            scroll_container: ".paneContainer".to_string(),
            scroll_delta: 900,
            count_selector: Some(".selectionCount".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminationSettings {
    pub policy: TerminationPolicy,
    pub no_growth_limit: usize,
    pub wait_retry_budget: usize,
}

impl Default for TerminationSettings {
    fn default() -> Self {
        Self {
            policy: TerminationPolicy::Convergence,
            no_growth_limit: 3,
            wait_retry_budget: 3,
        }
    }
}

/// Durations in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    pub wait_timeout_ms: u64,
    pub harvest_settle_ms: u64,
    pub probe_settle_ms: u64,
    pub navigation_timeout_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            wait_timeout_ms: 2000,
            harvest_settle_ms: 1500,
            probe_settle_ms: 200,
            navigation_timeout_ms: 15000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub chrome_path: Option<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 900,
            window_height: 900,
            chrome_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub termination: TerminationSettings,
    pub timing: TimingSettings,
    pub keywords: Vec<String>,
    pub boards: Vec<JobBoard>,
    pub stop_on_first_hit: bool,
    pub browser: BrowserSettings,
    pub output_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: SourceSettings::default(),
            termination: TerminationSettings::default(),
            timing: TimingSettings::default(),
            keywords: default_keywords(),
            boards: default_catalog(),
            stop_on_first_hit: false,
            browser: BrowserSettings::default(),
            output_dir: "results".to_string(),
        }
    }
}

/// Pick the config file: explicit path, then `env_path`, then the default
/// location if it exists.
pub fn resolve_config_path(explicit: Option<&str>, env_path: Option<String>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(expand(path));
    }
    if let Some(path) = env_path.filter(|p| !p.trim().is_empty()) {
        return Some(expand(&path));
    }
    let default = expand(DEFAULT_CONFIG_PATH);
    default.exists().then_some(default)
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the resolved config path, or fall back to defaults.
    pub fn load_or_default(explicit: Option<&str>) -> Result<Self, ConfigError> {
        match resolve_config_path(explicit, std::env::var(CONFIG_ENV).ok()) {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            None => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if let Err(e) = Url::parse(&self.source.url) {
            problems.push(format!("source url '{}' is invalid: {}", self.source.url, e));
        }
        if self.source.row_selector.trim().is_empty() {
            problems.push("source row_selector is empty".to_string());
        }
        if self.termination.no_growth_limit == 0 {
            problems.push("termination no_growth_limit must be at least 1".to_string());
        }
        if let TerminationPolicy::Sentinel(value) = &self.termination.policy
            && value.trim().is_empty()
        {
            problems.push("termination sentinel value is empty".to_string());
        }
        if let TerminationPolicy::Ceiling(Some(0)) = self.termination.policy {
            problems.push("termination ceiling must be at least 1".to_string());
        }
        if self.keywords.is_empty() {
            problems.push("at least one role keyword is required".to_string());
        } else if self.keywords.iter().any(|k| k.is_empty()) {
            // An empty keyword matches every page.
            problems.push("role keywords must not be empty".to_string());
        }
        if let Err(catalog_problems) = validate_catalog(&self.boards) {
            problems.extend(catalog_problems);
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    pub fn output_path(&self) -> PathBuf {
        expand(&self.output_dir)
    }

    pub fn harvest_options(&self) -> HarvestOptions {
        HarvestOptions {
            row_selector: self.source.row_selector.clone(),
            wait_selector: self.source.wait_selector.clone(),
            scroll_container: self.source.scroll_container.clone(),
            scroll_delta: self.source.scroll_delta,
            count_selector: self.source.count_selector.clone(),
            policy: self.termination.policy.clone(),
            no_growth_limit: self.termination.no_growth_limit,
            wait_retry_budget: self.termination.wait_retry_budget,
            wait_timeout: Duration::from_millis(self.timing.wait_timeout_ms),
            settle: Duration::from_millis(self.timing.harvest_settle_ms),
        }
    }

    pub fn probe_options(&self) -> ProbeOptions {
        ProbeOptions {
            keywords: self.keywords.clone(),
            settle: Duration::from_millis(self.timing.probe_settle_ms),
            stop_on_first_hit: self.stop_on_first_hit,
        }
    }

    pub fn chromium_options(&self) -> ChromiumOptions {
        ChromiumOptions {
            headless: self.browser.headless,
            window_width: self.browser.window_width,
            window_height: self.browser.window_height,
            chrome_path: self.browser.chrome_path.as_deref().map(expand),
            navigation_timeout: Duration::from_millis(self.timing.navigation_timeout_ms),
        }
    }
}
