// Tests for list loading and artifact persistence

use chrono::Utc;
use hirescout_core::persist::{
    FOUND_FILE, FOUND_JS_FILE, REPORT_FILE, SEARCH_FILE, UNRESOLVED_FILE, load_company_list,
    persist_run, write_search_list,
};
use hirescout_core::results::ResultSets;
use hirescout_core::run::RunReport;
use hirescout_scanner::result::{CompanyVerdict, ProbeOutcome};
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, tempdir};

fn sample_report() -> RunReport {
    let mut results = ResultSets::new(vec!["Acme, Inc.".to_string(), "Beta".to_string()]);
    results.record(CompanyVerdict::from_outcomes(
        "acme".to_string(),
        vec![ProbeOutcome::new(
            "acme".to_string(),
            "lever".to_string(),
            "https://jobs.lever.co/acme".to_string(),
            3,
        )],
    ));
    results.record(CompanyVerdict::from_outcomes("beta".to_string(), Vec::new()));

    RunReport {
        started_at: Utc::now(),
        finished_at: Utc::now(),
        harvest: None,
        keys: vec!["acme".to_string(), "beta".to_string()],
        results,
    }
}

#[test]
fn test_persist_writes_all_artifacts() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let out = dir.path().join("results");

    let outcome = persist_run(&sample_report(), &out);

    assert!(outcome.is_complete());
    assert_eq!(outcome.written.len(), 5);
    assert_eq!(fs::read_to_string(out.join(SEARCH_FILE))?, "Acme, Inc.\nBeta");
    assert_eq!(fs::read_to_string(out.join(FOUND_FILE))?, "https://jobs.lever.co/acme");
    assert_eq!(fs::read_to_string(out.join(UNRESOLVED_FILE))?, "beta");
    assert_eq!(
        fs::read_to_string(out.join(FOUND_JS_FILE))?,
        "module.exports = [\n  \"https://jobs.lever.co/acme\"\n];\n"
    );

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(out.join(REPORT_FILE))?)?;
    assert_eq!(json["keys"], serde_json::json!(["acme", "beta"]));
    assert_eq!(json["results"]["verdicts"][0]["outcomes"][0]["board"], "lever");
    assert!(json.get("harvest").is_none());
    Ok(())
}

#[test]
fn test_persist_reports_failure_without_panicking() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    // A file where the output directory should be.
    let blocker = dir.path().join("results");
    fs::write(&blocker, "occupied")?;

    let outcome = persist_run(&sample_report(), &blocker);

    assert!(!outcome.is_complete());
    assert!(outcome.written.is_empty());
    Ok(())
}

#[test]
fn test_persist_continues_past_a_failed_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    // A directory squatting on one artifact name makes only that write fail.
    fs::create_dir_all(dir.path().join(FOUND_FILE))?;

    let outcome = persist_run(&sample_report(), dir.path());

    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].0, dir.path().join(FOUND_FILE));
    assert_eq!(outcome.written.len(), 4);
    assert!(dir.path().join(UNRESOLVED_FILE).exists());
    Ok(())
}

#[test]
fn test_write_search_list_then_reload() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let names = vec!["Acme, Inc.".to_string(), "Beta Corp".to_string()];

    let path = write_search_list(&names, dir.path())?;

    assert_eq!(load_company_list(&path)?, names);
    Ok(())
}

#[test]
fn test_load_company_list_skips_blank_lines() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "Acme")?;
    writeln!(file)?;
    writeln!(file, "   ")?;
    writeln!(file, "\tBeta Corp  ")?;

    let names = load_company_list(file.path())?;

    assert_eq!(names, vec!["Acme", "Beta Corp"]);
    Ok(())
}

#[test]
fn test_load_company_list_missing_file() {
    assert!(load_company_list(std::path::Path::new("/nonexistent/list.txt")).is_err());
}
