//! The page-driver seam.
//!
//! Harvesting and probing only need a handful of browser capabilities, so
//! they talk to a `PageDriver` rather than to a specific engine. One driver
//! is one session: commands are issued strictly one after another.

use crate::error::{Result, ScanError};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

#[async_trait]
pub trait PageDriver: Send {
    /// Load `url` in the session.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Wait until at least one element matches `selector`, or fail with
    /// `ScanError::WaitTimeout` once `timeout` has elapsed.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    /// Text of every element currently matching `selector`.
    async fn visible_texts(&mut self, selector: &str) -> Result<Vec<String>>;

    /// Text of the first element matching `selector`, if any.
    async fn read_text(&mut self, selector: &str) -> Result<Option<String>>;

    /// Dispatch a synthetic wheel event of `delta_y` pixels on `container`.
    async fn scroll(&mut self, container: &str, delta_y: i64) -> Result<()>;

    /// Number of rendered elements whose own text contains any of `keywords`.
    async fn count_text_matches(&mut self, keywords: &[String]) -> Result<usize>;

    /// End the session.
    async fn close(&mut self) -> Result<()>;
}

/// Which driver implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverKind {
    #[default]
    Chromium,
    Static,
}

impl DriverKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "chromium" | "chrome" | "browser" => Some(DriverKind::Chromium),
            "static" | "http" => Some(DriverKind::Static),
            _ => None,
        }
    }
}

/// Absolute URL a driver may navigate to.
pub(crate) fn parse_target(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{url}: {e}")))
}

/// JavaScript counterpart of `StaticDriver`'s keyword test: counts elements
/// that own a text node containing any keyword.
pub(crate) fn keyword_count_script(keywords: &[String]) -> String {
    let encoded = serde_json::to_string(keywords).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"(() => {{
    const keywords = {encoded};
    let hits = 0;
    for (const el of document.querySelectorAll('body *')) {{
        if (el.tagName === 'SCRIPT' || el.tagName === 'STYLE' || el.tagName === 'NOSCRIPT') continue;
        for (const node of el.childNodes) {{
            if (node.nodeType === Node.TEXT_NODE && keywords.some(k => node.textContent.includes(k))) {{
                hits++;
                break;
            }}
        }}
    }}
    return hits;
}})()"#
    )
}

/// Wheel-event dispatch for lists that block the default scroll behaviour.
/// Evaluates to `false` when the container is missing.
pub(crate) fn wheel_script(container: &str, delta_y: i64) -> String {
    let encoded = serde_json::to_string(container).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        r#"(() => {{
    const pane = document.querySelector({encoded});
    if (!pane) return false;
    pane.dispatchEvent(new WheelEvent('wheel', {{ deltaX: 0, deltaY: {delta_y}, cancelable: true, bubbles: true }}));
    return true;
}})()"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_kind_from_str() {
        assert_eq!(DriverKind::from_str("chromium"), Some(DriverKind::Chromium));
        assert_eq!(DriverKind::from_str("Static"), Some(DriverKind::Static));
        assert_eq!(DriverKind::from_str("selenium"), None);
    }

    #[test]
    fn test_keyword_script_embeds_escaped_keywords() {
        let script = keyword_count_script(&["Engineer".to_string(), "it's".to_string()]);
        assert!(script.contains(r#"["Engineer","it's"]"#));
    }

    #[test]
    fn test_wheel_script_quotes_selector() {
        let script = wheel_script(".paneContainer", 900);
        assert!(script.contains(r#"document.querySelector(".paneContainer")"#));
        assert!(script.contains("deltaY: 900"));
    }
}
