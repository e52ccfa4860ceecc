// Tests for configuration loading and validation

use hirescout_core::config::{ConfigError, Settings, resolve_config_path};
use hirescout_scanner::catalog::JobBoard;
use hirescout_scanner::harvester::TerminationPolicy;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

#[test]
fn test_defaults_are_valid() {
    let settings = Settings::default();
    assert!(settings.validate().is_ok());
    assert_eq!(settings.boards.len(), 5);
    assert_eq!(settings.termination.policy, TerminationPolicy::Convergence);
    assert_eq!(
        settings.keywords,
        vec!["engineer", "developer", "Engineer", "Developer"]
    );
}

#[test]
fn test_partial_file_keeps_other_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"{{
            "termination": {{ "policy": {{ "strategy": "sentinel", "value": "Zapier" }} }},
            "timing": {{ "harvest_settle_ms": 3000 }},
            "keywords": ["Engineer"]
        }}"#
    )?;

    let settings = Settings::load(file.path())?;

    assert_eq!(
        settings.termination.policy,
        TerminationPolicy::Sentinel("Zapier".to_string())
    );
    assert_eq!(settings.termination.no_growth_limit, 3);
    assert_eq!(settings.timing.harvest_settle_ms, 3000);
    assert_eq!(settings.timing.probe_settle_ms, 200);
    assert_eq!(settings.keywords, vec!["Engineer"]);
    assert_eq!(settings.boards.len(), 5);
    Ok(())
}

#[test]
fn test_custom_catalog_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"{{ "boards": [ {{ "name": "wellfound", "url_template": "https://wellfound.com/company/{{company}}/jobs" }} ] }}"#
    )?;

    let settings = Settings::load(file.path())?;

    assert_eq!(settings.boards.len(), 1);
    assert_eq!(settings.boards[0].not_found_marker, "");
    assert_eq!(
        settings.boards[0].url_for("acme"),
        "https://wellfound.com/company/acme/jobs"
    );
    assert!(settings.validate().is_ok());
    Ok(())
}

#[test]
fn test_malformed_file_is_parse_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();

    let result = Settings::load(file.path());
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn test_missing_file_is_io_error() {
    let result = Settings::load(std::path::Path::new("/nonexistent/hirescout.json"));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_validate_collects_problems() {
    let mut settings = Settings::default();
    settings.source.url = "not a url".to_string();
    settings.termination.no_growth_limit = 0;
    settings.termination.policy = TerminationPolicy::Sentinel("  ".to_string());
    settings.keywords = vec!["Engineer".to_string(), String::new()];
    settings.boards.push(JobBoard::new("lever", "https://jobs.lever.co/{company}", ""));

    match settings.validate() {
        Err(ConfigError::Invalid(problems)) => {
            assert_eq!(problems.len(), 5, "{:?}", problems);
        }
        other => panic!("expected invalid config, got {:?}", other),
    }
}

#[test]
fn test_validate_rejects_empty_keywords_and_zero_ceiling() {
    let mut settings = Settings::default();
    settings.keywords.clear();
    settings.termination.policy = TerminationPolicy::Ceiling(Some(0));

    let err = settings.validate().unwrap_err();
    let message = err.to_string();
    assert!(message.contains("at least one role keyword"));
    assert!(message.contains("ceiling must be at least 1"));
}

#[test]
fn test_option_conversions() {
    let mut settings = Settings::default();
    settings.timing.wait_timeout_ms = 4000;
    settings.timing.harvest_settle_ms = 700;
    settings.timing.probe_settle_ms = 50;
    settings.stop_on_first_hit = true;
    settings.browser.headless = false;

    let harvest = settings.harvest_options();
    assert_eq!(harvest.wait_timeout, Duration::from_millis(4000));
    assert_eq!(harvest.settle, Duration::from_millis(700));
    assert_eq!(harvest.scroll_container, ".paneContainer");
    assert_eq!(harvest.count_selector.as_deref(), Some(".selectionCount"));

    let probe = settings.probe_options();
    assert_eq!(probe.settle, Duration::from_millis(50));
    assert!(probe.stop_on_first_hit);

    let chromium = settings.chromium_options();
    assert!(!chromium.headless);
    assert_eq!(chromium.window_width, 900);
}

#[test]
fn test_resolve_prefers_explicit_then_env() {
    let explicit = resolve_config_path(Some("/tmp/a.json"), Some("/tmp/b.json".to_string()));
    assert_eq!(explicit, Some(std::path::PathBuf::from("/tmp/a.json")));

    let env = resolve_config_path(None, Some("/tmp/b.json".to_string()));
    assert_eq!(env, Some(std::path::PathBuf::from("/tmp/b.json")));
}

#[test]
fn test_round_trip_through_json() -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = Settings::default();
    settings.termination.policy = TerminationPolicy::Ceiling(None);

    let json = serde_json::to_string(&settings)?;
    let parsed: Settings = serde_json::from_str(&json)?;
    assert_eq!(parsed, settings);
    Ok(())
}
