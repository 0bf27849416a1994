use std::time::Duration;

use thirtyfour::{ChromiumLikeCapabilities, DesiredCapabilities, WebDriver};
use url::Url;

/// Headless Chrome session used when a page needs client-side rendering.
pub struct Droid {
    pub driver: WebDriver,
}

impl Droid {
    pub async fn new(server_url: &str) -> anyhow::Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--headless=new")?;
        caps.add_arg("--no-sandbox")?;
        caps.add_arg("--disable-dev-shm-usage")?;
        caps.add_arg("--disable-gpu")?;
        caps.add_arg("--window-size=1920,1080")?;

        let driver = WebDriver::new(server_url, caps).await?;

        Ok(Droid { driver })
    }

    /// Load the page, give client-side rendering time to settle, return
    /// the rendered source.
    pub async fn page_source(&self, url: &Url, render_wait: Duration) -> anyhow::Result<String> {
        self.driver.goto(url.as_str()).await?;
        tokio::time::sleep(render_wait).await;
        Ok(self.driver.source().await?)
    }

    pub async fn quit(self) -> anyhow::Result<()> {
        self.driver.quit().await?;
        Ok(())
    }
}
