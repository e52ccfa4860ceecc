// Reading company lists and writing run artifacts

use crate::run::RunReport;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const SEARCH_FILE: &str = "search.txt";
pub const FOUND_FILE: &str = "hiring.txt";
pub const FOUND_JS_FILE: &str = "companies.js";
pub const UNRESOLVED_FILE: &str = "unresolved.txt";
pub const REPORT_FILE: &str = "report.json";

/// Outcome of writing the artifacts of one run.
#[derive(Debug, Default)]
pub struct PersistReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl PersistReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Read a newline-delimited company list, one name per line. Blank lines
/// are skipped and surrounding whitespace trimmed.
pub fn load_company_list(path: &Path) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn render_lines(items: &[String]) -> String {
    items.join("\n")
}

/// The list as a CommonJS module for the display page.
pub fn render_js_list(items: &[String]) -> String {
    if items.is_empty() {
        return "module.exports = [];\n".to_string();
    }
    let entries: Vec<String> = items
        .iter()
        .map(|item| format!("  {}", serde_json::Value::String(item.clone())))
        .collect();
    format!("module.exports = [\n{}\n];\n", entries.join(",\n"))
}

/// Write the search list alone, as a harvest-only run does.
pub fn write_search_list(names: &[String], dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(SEARCH_FILE);
    fs::write(&path, render_lines(names))?;
    info!("Successfully wrote file: {}", path.display());
    Ok(path)
}

/// Write every artifact of a run into `dir`. Each file is written on its
/// own; a failure is recorded and the remaining files are still written.
pub fn persist_run(report: &RunReport, dir: &Path) -> PersistReport {
    let mut outcome = PersistReport::default();

    if let Err(e) = fs::create_dir_all(dir) {
        warn!("Could not create output directory {}: {}", dir.display(), e);
        outcome.failed.push((dir.to_path_buf(), e.to_string()));
        return outcome;
    }

    let results = &report.results;
    let report_json = serde_json::to_string_pretty(report)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e));

    let files: Vec<(&str, io::Result<String>)> = vec![
        (SEARCH_FILE, Ok(render_lines(&results.search))),
        (FOUND_FILE, Ok(render_lines(&results.found))),
        (FOUND_JS_FILE, Ok(render_js_list(&results.found))),
        (UNRESOLVED_FILE, Ok(render_lines(&results.unresolved))),
        (REPORT_FILE, report_json),
    ];

    for (name, content) in files {
        let path = dir.join(name);
        match content.and_then(|text| fs::write(&path, text)) {
            Ok(()) => {
                info!("Successfully wrote file: {}", path.display());
                outcome.written.push(path);
            }
            Err(e) => {
                warn!("Error writing file {}: {}", path.display(), e);
                outcome.failed.push((path, e.to_string()));
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_js_list_escapes_entries() {
        let items = vec![
            "https://a.test/acme".to_string(),
            "https://b.test/say\"hi\"".to_string(),
        ];
        assert_eq!(
            render_js_list(&items),
            "module.exports = [\n  \"https://a.test/acme\",\n  \"https://b.test/say\\\"hi\\\"\"\n];\n"
        );
    }

    #[test]
    fn test_render_js_list_empty() {
        assert_eq!(render_js_list(&[]), "module.exports = [];\n");
    }

    #[test]
    fn test_render_lines() {
        let items = vec!["a".to_string(), "b".to_string()];
        assert_eq!(render_lines(&items), "a\nb");
        assert_eq!(render_lines(&[]), "");
    }
}
