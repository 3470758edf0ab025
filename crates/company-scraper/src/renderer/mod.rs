// Copyright 2026 Company Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Renderer abstraction for browser-based page capture.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide). Every session
//! is isolated: one browser per session, one user agent per browser.

pub mod chromium;

use crate::sites::Presence;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// How often selector conditions are re-checked while waiting.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// A browser engine that can start isolated sessions.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Start a fresh session presenting `user_agent`.
    async fn new_session(&self, user_agent: &str) -> Result<Box<dyn RenderContext>>;
    /// Number of currently open sessions.
    fn active_sessions(&self) -> usize;
}

/// A single browser session (one page) for rendering a target.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL, giving up at `deadline`.
    async fn navigate(&mut self, url: &str, deadline: Instant) -> Result<NavigationResult>;
    /// Execute JavaScript in the page context and return the result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Outer HTML of the first element matching `selector`, if any.
    async fn outer_html(&self, selector: &str) -> Result<Option<String>>;
    /// Close this session.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Script evaluating to `true` once `selector` satisfies `presence`.
pub fn presence_script(selector: &str, presence: Presence) -> String {
    // JSON string literals are valid JS string literals.
    let sel = serde_json::Value::String(selector.to_string()).to_string();
    match presence {
        Presence::Visible => format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el) return false; \
             const r = el.getBoundingClientRect(); \
             return r.width > 0 && r.height > 0; }})()"
        ),
        Presence::Present => format!("document.querySelector({sel}) !== null"),
        Presence::Absent => format!("document.querySelector({sel}) === null"),
    }
}

/// Script clicking the first element matching `selector`, if there is one.
pub fn click_script(selector: &str) -> String {
    let sel = serde_json::Value::String(selector.to_string()).to_string();
    format!(
        "(() => {{ const el = document.querySelector({sel}); \
         if (el) {{ el.click(); return true; }} return false; }})()"
    )
}

/// Poll until `selector` satisfies `presence`.
///
/// Returns `Ok(false)` if `deadline` passes first. Script errors are
/// returned as-is.
pub async fn wait_for(
    ctx: &dyn RenderContext,
    selector: &str,
    presence: Presence,
    deadline: Instant,
) -> Result<bool> {
    let script = presence_script(selector, presence);
    loop {
        let satisfied = ctx.execute_js(&script).await?.as_bool().unwrap_or(false);
        if satisfied {
            return Ok(true);
        }
        if Instant::now() + POLL_INTERVAL > deadline {
            return Ok(false);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// A renderer used when Chromium is unavailable. Every session fails.
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn new_session(&self, _user_agent: &str) -> Result<Box<dyn RenderContext>> {
        Err(anyhow::anyhow!("browser not available"))
    }
    fn active_sessions(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reports the selector as satisfied on the `ready_after`-th check.
    struct CountingContext {
        checks: AtomicUsize,
        ready_after: usize,
    }

    #[async_trait]
    impl RenderContext for CountingContext {
        async fn navigate(&mut self, url: &str, _deadline: Instant) -> Result<NavigationResult> {
            Ok(NavigationResult {
                final_url: url.to_string(),
                load_time_ms: 0,
            })
        }
        async fn execute_js(&self, _script: &str) -> Result<serde_json::Value> {
            let n = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(serde_json::Value::Bool(n >= self.ready_after))
        }
        async fn outer_html(&self, _selector: &str) -> Result<Option<String>> {
            Ok(None)
        }
        async fn close(self: Box<Self>) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_presence_script_quotes_selector() {
        let script = presence_script(r#"a[data-test='x"y']"#, Presence::Present);
        assert_eq!(
            script,
            r#"document.querySelector("a[data-test='x\"y']") !== null"#
        );
        assert!(presence_script(".c", Presence::Absent).ends_with("=== null"));
        assert!(presence_script(".c", Presence::Visible).contains("getBoundingClientRect"));
    }

    #[tokio::test]
    async fn test_wait_for_polls_until_ready() {
        let ctx = CountingContext {
            checks: AtomicUsize::new(0),
            ready_after: 3,
        };
        let deadline = Instant::now() + Duration::from_secs(5);
        let ok = wait_for(&ctx, ".x", Presence::Visible, deadline).await.unwrap();
        assert!(ok);
        assert_eq!(ctx.checks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_wait_for_gives_up_at_deadline() {
        let ctx = CountingContext {
            checks: AtomicUsize::new(0),
            ready_after: usize::MAX,
        };
        let deadline = Instant::now() + Duration::from_millis(250);
        let ok = wait_for(&ctx, ".x", Presence::Visible, deadline).await.unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_noop_renderer_refuses_sessions() {
        assert!(NoopRenderer.new_session("ua").await.is_err());
        assert_eq!(NoopRenderer.active_sessions(), 0);
    }
}
