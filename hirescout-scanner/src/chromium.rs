//! Chromium-backed page driver using chromiumoxide.

use crate::driver::{PageDriver, keyword_count_script, parse_target, wheel_script};
use crate::error::{Result, ScanError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How often `wait_for` re-queries the DOM.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct ChromiumOptions {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub chrome_path: Option<PathBuf>,
    pub navigation_timeout: Duration,
}

impl Default for ChromiumOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 900,
            window_height: 900,
            chrome_path: None,
            navigation_timeout: Duration::from_secs(15),
        }
    }
}

/// Re-run `check` every `interval` until it holds, or fail with
/// `WaitTimeout` once `timeout` has elapsed. `check` always runs at least once.
async fn poll_until<F, Fut>(
    selector: &str,
    timeout: Duration,
    interval: Duration,
    mut check: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();
    loop {
        if check().await {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(ScanError::WaitTimeout {
                selector: selector.to_string(),
                waited_ms: timeout.as_millis() as u64,
            });
        }
        tokio::time::sleep(interval).await;
    }
}

pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    navigation_timeout: Duration,
}

impl ChromiumDriver {
    /// Launch a browser and open the single page this session drives.
    pub async fn launch(options: ChromiumOptions) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(options.window_width, options.window_height)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");

        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(path) = options.chrome_path {
            builder = builder.chrome_executable(path);
        }

        let config = builder
            .build()
            .map_err(|e| ScanError::Browser(format!("failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScanError::Browser(format!("failed to launch Chromium: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler event error: {}", e);
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        info!(
            "Chromium session started ({}x{}, headless: {})",
            options.window_width, options.window_height, options.headless
        );

        Ok(Self {
            browser,
            page,
            handler,
            navigation_timeout: options.navigation_timeout,
        })
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let target = parse_target(url)?;
        debug!("Navigating to {}", target);
        let timeout_ms = self.navigation_timeout.as_millis() as u64;

        match tokio::time::timeout(self.navigation_timeout, self.page.goto(target.as_str())).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(ScanError::Navigation(format!("{url}: {e}"))),
            Err(_) => Err(ScanError::Timeout(timeout_ms)),
        }
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        let page = &self.page;
        poll_until(selector, timeout, WAIT_POLL_INTERVAL, || async move {
            match page.find_elements(selector).await {
                Ok(elements) => !elements.is_empty(),
                Err(e) => {
                    debug!("Lookup of '{}' failed while waiting: {}", selector, e);
                    false
                }
            }
        })
        .await
    }

    async fn visible_texts(&mut self, selector: &str) -> Result<Vec<String>> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| ScanError::Lookup(format!("{selector}: {e}")))?;

        let mut texts = Vec::with_capacity(elements.len());
        for element in elements {
            // Rows can be unmounted between the query and the read.
            match element.inner_text().await {
                Ok(Some(text)) => texts.push(text),
                Ok(None) => {}
                Err(e) => debug!("Skipping detached element: {}", e),
            }
        }
        Ok(texts)
    }

    async fn read_text(&mut self, selector: &str) -> Result<Option<String>> {
        match self.page.find_element(selector).await {
            Ok(element) => element
                .inner_text()
                .await
                .map_err(|e| ScanError::Lookup(format!("{selector}: {e}"))),
            Err(_) => Ok(None),
        }
    }

    async fn scroll(&mut self, container: &str, delta_y: i64) -> Result<()> {
        let dispatched: bool = self
            .page
            .evaluate(wheel_script(container, delta_y))
            .await
            .map_err(|e| ScanError::Script(e.to_string()))?
            .into_value()
            .map_err(|e| ScanError::Script(format!("unexpected scroll result: {e}")))?;

        if dispatched {
            Ok(())
        } else {
            Err(ScanError::Script(format!(
                "scroll container '{container}' not found"
            )))
        }
    }

    async fn count_text_matches(&mut self, keywords: &[String]) -> Result<usize> {
        let count: u64 = self
            .page
            .evaluate(keyword_count_script(keywords))
            .await
            .map_err(|e| ScanError::Lookup(e.to_string()))?
            .into_value()
            .map_err(|e| ScanError::Lookup(format!("unexpected match count: {e}")))?;
        Ok(count as usize)
    }

    async fn close(&mut self) -> Result<()> {
        if let Err(e) = self.browser.close().await {
            warn!("Browser did not close cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Waiting for browser exit failed: {}", e);
        }
        self.handler.abort();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_returns_once_check_holds() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let start = Instant::now();

        let result = poll_until(".row", Duration::from_secs(2), WAIT_POLL_INTERVAL, || async move {
            counter.fetch_add(1, Ordering::SeqCst) + 1 >= 3
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), WAIT_POLL_INTERVAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_checks_before_sleeping() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let start = Instant::now();

        let result = poll_until(".row", Duration::ZERO, WAIT_POLL_INTERVAL, || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_times_out_with_wait_error() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let start = Instant::now();

        let result = poll_until(
            "[data-columnid]",
            Duration::from_millis(450),
            WAIT_POLL_INTERVAL,
            || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                false
            },
        )
        .await;

        assert!(result.as_ref().is_err_and(ScanError::is_transient));
        match result {
            Err(ScanError::WaitTimeout {
                selector,
                waited_ms,
            }) => {
                assert_eq!(selector, "[data-columnid]");
                assert_eq!(waited_ms, 450);
            }
            other => panic!("expected a wait timeout, got {:?}", other),
        }
        // Checks at 0, 100, .., 500ms; the 500ms check is the last.
        assert_eq!(calls.load(Ordering::SeqCst), 6);
        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }

    #[test]
    fn test_default_options_are_headless() {
        let options = ChromiumOptions::default();
        assert!(options.headless);
        assert_eq!((options.window_width, options.window_height), (900, 900));
        assert!(options.chrome_path.is_none());
    }
}
