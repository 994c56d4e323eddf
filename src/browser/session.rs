use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::sync::Arc;

use crate::driver::cdp::CdpDriver;

/// One Chrome process with a single page, driven through [`CdpDriver`].
pub struct BrowserSession {
    browser: Browser,
    _handler_task: tokio::task::JoinHandle<()>,
    _profile: tempfile::TempDir,
    driver: Arc<CdpDriver>,
}

impl BrowserSession {
    /// Launch a new browser on a throwaway profile and attach to its page.
    pub async fn launch(headless: bool) -> Result<Self> {
        let profile = tempfile::tempdir().context("Failed to create profile directory")?;
        let mut builder = BrowserConfig::builder();

        if headless {
            builder = builder.arg("--headless=new");
        } else {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-client-side-phishing-detection")
            .arg("--disable-default-apps")
            .arg("--disable-extensions")
            .arg("--disable-hang-monitor")
            .arg("--disable-prompt-on-repost")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--metrics-recording-only")
            .arg("--safebrowsing-disable-auto-update")
            .user_data_dir(profile.path())
            .window_size(1280, 720);

        let config = builder.build().map_err(|e| anyhow::anyhow!("{}", e))?;

        let (browser, mut handler) =
            Browser::launch(config).await.context("Failed to launch Chrome")?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("Failed to create initial page")?;
        let driver = Arc::new(CdpDriver::attach(page).await?);

        tracing::info!("Browser session started (headless: {})", headless);

        Ok(Self {
            browser,
            _handler_task: handler_task,
            _profile: profile,
            driver,
        })
    }

    pub fn driver(&self) -> Arc<CdpDriver> {
        self.driver.clone()
    }

    /// Close the browser and remove its profile.
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await.context("Failed to close Chrome")?;
        self._handler_task.abort();
        Ok(())
    }
}
