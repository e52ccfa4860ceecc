// Company-name normalization
//
// Display names become job-board slugs by scanning the lower-cased name
// through a three-way character table.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    /// Kept in the key.
    Accept,
    /// Dropped, scanning continues.
    Skip,
    /// Ends the key.
    Stop,
}

fn classify(c: char) -> CharClass {
    match c {
        'a'..='z' | '0'..='9' => CharClass::Accept,
        '.' | '&' | '-' => CharClass::Skip,
        _ => CharClass::Stop,
    }
}

/// Reduce a display name to its key: lower-case ASCII letters and digits up
/// to the first character outside the accept and skip sets.
///
/// ```
/// use hirescout_core::normalize::normalize;
/// assert_eq!(normalize("Bananas, Inc"), "bananas");
/// assert_eq!(normalize("AT&T"), "att");
/// ```
pub fn normalize(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    for c in raw.chars().flat_map(char::to_lowercase) {
        match classify(c) {
            CharClass::Accept => key.push(c),
            CharClass::Skip => {}
            CharClass::Stop => break,
        }
    }
    key
}

/// Remove every whitespace character.
pub fn compact(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Key used by the pipeline: whitespace is removed before the scan, so
/// multi-word names keep every word.
pub fn company_key(raw: &str) -> String {
    normalize(&compact(raw))
}

/// Raw names trimmed, blanks dropped and repeats removed, first occurrence kept.
pub fn dedupe_names(raw_names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw_names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}

/// Keys for `raw_names` in first-seen order, each key at most once.
///
/// Distinct names that share a prefix collapse to one key ("Acme, Inc." and
/// "Acme, LLC" are both "acme"); the first raw name wins.
pub fn dedupe_keys<S: AsRef<str>>(raw_names: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw_names
        .iter()
        .map(|raw| company_key(raw.as_ref()))
        .filter(|key| seen.insert(key.clone()))
        .collect()
}
