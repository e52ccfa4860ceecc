use crate::driver::{PageDriver, parse_target};
use crate::error::{Result, ScanError};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::{Duration, Instant};
use tracing::debug;

/// Elements whose text never renders.
const NON_RENDERED: [&str; 3] = ["script", "style", "noscript"];

/// Page driver for server-rendered pages.
///
/// Each `navigate` fetches the document once; every query afterwards runs
/// against that snapshot. Nothing can appear later, so `wait_for` answers
/// immediately and `scroll` is unsupported.
pub struct StaticDriver {
    client: Client,
    body: Option<String>,
}

impl StaticDriver {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(10))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("Hirescout/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .connect_timeout(timeout / 2)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            body: None,
        })
    }

    fn document(&self) -> Result<&str> {
        self.body
            .as_deref()
            .ok_or_else(|| ScanError::Lookup("no page loaded".to_string()))
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ScanError::Lookup(format!("invalid selector '{selector}': {e:?}")))
}

fn select_texts(html: &str, selector: &str) -> Result<Vec<String>> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .map(|el| el.text().collect::<String>())
        .collect())
}

fn count_keyword_elements(html: &str, keywords: &[String]) -> Result<usize> {
    let selector = parse_selector("body *")?;
    let document = Html::parse_document(html);

    let count = document
        .select(&selector)
        .filter(|el| !NON_RENDERED.contains(&el.value().name()))
        .filter(|el| {
            el.children().any(|child| {
                child
                    .value()
                    .as_text()
                    .is_some_and(|text| keywords.iter().any(|k| text.contains(k.as_str())))
            })
        })
        .count();
    Ok(count)
}

#[async_trait]
impl PageDriver for StaticDriver {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.body = None;
        let target = parse_target(url)?;

        let start = Instant::now();
        let response = self.client.get(target).send().await?;
        let status = response.status();
        debug!("GET {} -> {} in {:?}", url, status, start.elapsed());

        if !status.is_success() {
            return Err(ScanError::Navigation(format!("{url} returned HTTP {status}")));
        }

        self.body = Some(response.text().await?);
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        let found = !select_texts(self.document()?, selector)?.is_empty();
        if found {
            Ok(())
        } else {
            Err(ScanError::WaitTimeout {
                selector: selector.to_string(),
                waited_ms: timeout.as_millis() as u64,
            })
        }
    }

    async fn visible_texts(&mut self, selector: &str) -> Result<Vec<String>> {
        select_texts(self.document()?, selector)
    }

    async fn read_text(&mut self, selector: &str) -> Result<Option<String>> {
        Ok(select_texts(self.document()?, selector)?.into_iter().next())
    }

    async fn scroll(&mut self, container: &str, _delta_y: i64) -> Result<()> {
        Err(ScanError::Script(format!(
            "static pages cannot scroll '{container}'"
        )))
    }

    async fn count_text_matches(&mut self, keywords: &[String]) -> Result<usize> {
        count_keyword_elements(self.document()?, keywords)
    }

    async fn close(&mut self) -> Result<()> {
        self.body = None;
        Ok(())
    }
}
