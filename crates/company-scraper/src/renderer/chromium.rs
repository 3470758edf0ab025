// Copyright 2026 Company Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chromium-based renderer using chromiumoxide.

use super::{NavigationResult, RenderContext, Renderer};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Environment variable overriding the Chromium binary location.
pub const CHROMIUM_PATH_ENV: &str = "SCRAPER_CHROMIUM_PATH";

/// Find the Chromium binary path.
pub fn find_chromium(explicit: Option<&Path>) -> Option<PathBuf> {
    // 1. --chromium flag
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    // 2. SCRAPER_CHROMIUM_PATH env
    if let Ok(p) = std::env::var(CHROMIUM_PATH_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 3. ~/.company-scraper/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".company-scraper/chromium/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".company-scraper/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".company-scraper/chromium/chrome-linux64/chrome"),
                home.join(".company-scraper/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 4. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 5. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Launches one headless Chromium per session.
pub struct ChromiumRenderer {
    chrome_path: PathBuf,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Resolve the Chromium binary. Nothing is launched until a session is requested.
    pub fn new(explicit: Option<&Path>) -> Result<Self> {
        let chrome_path = find_chromium(explicit).with_context(|| {
            format!("Chromium not found. Pass --chromium or set {CHROMIUM_PATH_ENV}.")
        })?;

        Ok(Self {
            chrome_path,
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn chrome_path(&self) -> &Path {
        &self.chrome_path
    }

    /// Launch settings for one session. Each session gets its own profile
    /// directory so concurrent browsers never share cookies, storage or the
    /// profile lock.
    fn browser_config(&self, user_agent: &str, profile_dir: &Path) -> Result<BrowserConfig> {
        BrowserConfig::builder()
            .chrome_executable(&self.chrome_path)
            .user_data_dir(profile_dir)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg(format!("--user-agent={user_agent}"))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))
    }
}

fn session_profile_dir() -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix("company-scraper-profile-")
        .tempdir()
        .context("failed to create browser profile directory")
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_session(&self, user_agent: &str) -> Result<Box<dyn RenderContext>> {
        let profile_dir = session_profile_dir()?;
        let config = self.browser_config(user_agent, profile_dir.path())?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                bail!("failed to create new page: {e}");
            }
        };

        self.active_count.fetch_add(1, Ordering::Relaxed);
        debug!(user_agent, profile = %profile_dir.path().display(), "browser session started");

        Ok(Box::new(ChromiumContext {
            browser,
            page,
            handler,
            active_count: Arc::clone(&self.active_count),
            _profile_dir: profile_dir,
        }))
    }

    fn active_sessions(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// A single Chromium browser with one page.
///
/// Dropping it (e.g. when an attempt deadline abandons the future) kills the
/// browser process, stops the event handler and removes the profile
/// directory.
pub struct ChromiumContext {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    active_count: Arc<AtomicUsize>,
    // Declared last: removed only after the browser has been dropped.
    _profile_dir: TempDir,
}

impl Drop for ChromiumContext {
    fn drop(&mut self) {
        self.handler.abort();
        self.active_count.fetch_sub(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, deadline: Instant) -> Result<NavigationResult> {
        let start = Instant::now();

        let result = tokio::time::timeout_at(deadline, self.page.goto(url)).await;

        match result {
            Ok(Ok(_)) => {
                let _ = tokio::time::timeout_at(deadline, self.page.wait_for_navigation()).await;

                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .unwrap_or_else(|| url.to_string());

                Ok(NavigationResult {
                    final_url,
                    load_time_ms: start.elapsed().as_millis() as u64,
                })
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!(
                "navigation timed out after {}ms",
                start.elapsed().as_millis()
            ),
        }
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS execution failed")?;

        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert JS result: {e:?}"))
    }

    async fn outer_html(&self, selector: &str) -> Result<Option<String>> {
        let sel = serde_json::Value::String(selector.to_string()).to_string();
        let script = format!(
            "(() => {{ const el = document.querySelector({sel}); return el ? el.outerHTML : \"\"; }})()"
        );
        let html: String = self
            .page
            .evaluate(script)
            .await
            .context("failed to get HTML")?
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert HTML result: {e:?}"))?;

        Ok(if html.is_empty() { None } else { Some(html) })
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut this = self;
        let _ = this.browser.close().await;
        let _ = this.browser.wait().await;
        Ok(())
    }
}
