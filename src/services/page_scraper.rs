use std::time::Duration;

use fake_user_agent::get_rua;
use rand::Rng;
use reqwest::header;
use url::Url;

use crate::configuration::{ScraperSettings, WebdriverSettings};
use crate::domain::ScrapedPage;

use super::{content_extractor::ContentExtractor, droid::Droid};

#[derive(Debug, Clone, Copy)]
pub enum FetchMode {
    Static,
    Dynamic,
}

/// Fetches one page and runs content extraction over it. Every failure is
/// folded into a `success: false` record; callers never see an error.
pub struct PageScraper {
    client: reqwest::Client,
    extractor: ContentExtractor,
    webdriver_url: String,
    max_retries: u32,
    retry_delay: Duration,
    dynamic_wait: Duration,
}

impl PageScraper {
    pub fn new(scraper: &ScraperSettings, webdriver: &WebdriverSettings) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(scraper.request_timeout_seconds))
            .build()
            .expect("Failed to build reqwest client");

        PageScraper {
            client,
            extractor: ContentExtractor::new(scraper),
            webdriver_url: webdriver.url.clone(),
            max_retries: scraper.max_retries,
            retry_delay: Duration::from_secs(scraper.retry_delay_seconds),
            dynamic_wait: Duration::from_secs(scraper.dynamic_wait_seconds),
        }
    }

    /// Returns the structured page record plus the raw HTML (empty on
    /// failure) so link analysis can run over the full document.
    pub async fn fetch_and_parse(&self, url: &Url, mode: FetchMode) -> (ScrapedPage, String) {
        match mode {
            FetchMode::Static => self.fetch_static(url).await,
            FetchMode::Dynamic => self.fetch_dynamic(url).await,
        }
    }

    async fn fetch_static(&self, url: &Url) -> (ScrapedPage, String) {
        let mut last_error = String::from("no response");

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let jitter = rand::thread_rng().gen_range(0..1000);
                tokio::time::sleep(self.retry_delay + Duration::from_millis(jitter)).await;
                log::info!(
                    "Retrying {} (attempt {}/{})",
                    url,
                    attempt + 1,
                    self.max_retries + 1
                );
            }

            let response = self
                .client
                .get(url.clone())
                .header(header::USER_AGENT, get_rua())
                .send()
                .await;

            match response {
                Ok(response) => {
                    let status = response.status();
                    if status.is_server_error() {
                        last_error = format!("server error: {}", status);
                        continue;
                    }
                    if !status.is_success() {
                        return (
                            ScrapedPage::failure(
                                url,
                                false,
                                Some(status.as_u16()),
                                format!("unexpected status: {}", status),
                            ),
                            String::new(),
                        );
                    }
                    match response.text().await {
                        Ok(body) => {
                            let content = self.extractor.extract(&body, url.as_str());
                            return (
                                ScrapedPage::success(url, false, Some(status.as_u16()), content),
                                body,
                            );
                        }
                        Err(e) => {
                            last_error = format!("failed to read response body: {}", e);
                            continue;
                        }
                    }
                }
                Err(e) => {
                    last_error = format!("request failed: {}", e);
                    continue;
                }
            }
        }

        log::error!("Giving up on {}: {}", url, last_error);
        (ScrapedPage::failure(url, false, None, last_error), String::new())
    }

    async fn fetch_dynamic(&self, url: &Url) -> (ScrapedPage, String) {
        match self.render_page(url).await {
            Ok(body) => {
                let content = self.extractor.extract(&body, url.as_str());
                (ScrapedPage::success(url, true, None, content), body)
            }
            Err(e) => {
                log::error!("Dynamic fetch failed for {}: {:?}", url, e);
                (
                    ScrapedPage::failure(url, true, None, format!("dynamic fetch failed: {}", e)),
                    String::new(),
                )
            }
        }
    }

    async fn render_page(&self, url: &Url) -> anyhow::Result<String> {
        let droid = Droid::new(&self.webdriver_url).await?;
        let source = droid.page_source(url, self.dynamic_wait).await;
        if let Err(e) = droid.quit().await {
            log::warn!("Failed to shut down webdriver session cleanly: {}", e);
        }
        source
    }
}
