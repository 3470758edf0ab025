// Copyright 2026 Company Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! The single fetch-and-extract step run by each attempt.

use crate::error::ScrapeError;
use crate::extraction::extract_fields;
use crate::output::RecordSink;
use crate::renderer::{click_script, wait_for, RenderContext, Renderer};
use crate::sites::{Presence, SiteProfile};
use crate::types::Target;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info};

/// Per-attempt execution context. Built fresh for every attempt.
#[derive(Debug, Clone)]
pub struct AttemptContext {
    /// 0-based attempt ordinal.
    pub attempt: u32,
    /// The attempt is abandoned at this instant.
    pub deadline: Instant,
    /// Client identity presented by this attempt's browser.
    pub user_agent: String,
}

/// One fallible fetch-and-extract operation.
///
/// Success means a record reached the record sink. No partial record is
/// ever emitted on failure.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_and_extract(&self, target: &Target, ctx: &AttemptContext)
        -> Result<(), ScrapeError>;
}

/// Drives a real browser session per attempt.
pub struct BrowserFetcher {
    renderer: Arc<dyn Renderer>,
    profile: SiteProfile,
    sink: Arc<dyn RecordSink>,
}

impl BrowserFetcher {
    pub fn new(renderer: Arc<dyn Renderer>, profile: SiteProfile, sink: Arc<dyn RecordSink>) -> Self {
        Self {
            renderer,
            profile,
            sink,
        }
    }

    async fn capture(
        &self,
        session: &mut dyn RenderContext,
        target: &Target,
        ctx: &AttemptContext,
    ) -> Result<String, ScrapeError> {
        let nav = session
            .navigate(target.as_str(), ctx.deadline)
            .await
            .map_err(|e| ScrapeError::navigation(target.as_str(), e))?;
        debug!(url = %target, final_url = %nav.final_url, load_time_ms = nav.load_time_ms, "page loaded");

        let content = self.profile.content_selector;
        self.wait(session, content, self.profile.wait_for, ctx).await?;

        if let Some(expand) = &self.profile.expand {
            let clicked = session
                .execute_js(&click_script(expand.selector))
                .await
                .map_err(|e| ScrapeError::Action(format!("{e:#}")))?;
            if clicked.as_bool() != Some(true) {
                return Err(ScrapeError::Action(format!(
                    "no element matches {} to click",
                    expand.selector
                )));
            }
            self.wait(session, expand.selector, Presence::Absent, ctx).await?;
        }

        session
            .outer_html(content)
            .await
            .map_err(|e| ScrapeError::navigation(target.as_str(), e))?
            .ok_or_else(|| ScrapeError::ElementTimeout {
                selector: content.to_string(),
            })
    }

    async fn wait(
        &self,
        session: &dyn RenderContext,
        selector: &str,
        presence: Presence,
        ctx: &AttemptContext,
    ) -> Result<(), ScrapeError> {
        let met = wait_for(session, selector, presence, ctx.deadline)
            .await
            .map_err(|e| ScrapeError::Action(format!("{e:#}")))?;
        if met {
            Ok(())
        } else {
            Err(ScrapeError::ElementTimeout {
                selector: selector.to_string(),
            })
        }
    }
}

#[async_trait]
impl Fetcher for BrowserFetcher {
    async fn fetch_and_extract(
        &self,
        target: &Target,
        ctx: &AttemptContext,
    ) -> Result<(), ScrapeError> {
        info!(url = %target, attempt = ctx.attempt, "starting to scrape");

        let mut session = self
            .renderer
            .new_session(&ctx.user_agent)
            .await
            .map_err(|e| ScrapeError::Browser(format!("{e:#}")))?;

        let captured = self.capture(session.as_mut(), target, ctx).await;
        if let Err(e) = session.close().await {
            debug!(url = %target, error = %e, "failed to close browser session");
        }

        let record = extract_fields(self.profile.site, &captured?)?;
        self.sink.emit(&record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::CompanyRecord;
    use crate::output::MemorySink;
    use crate::renderer::{NavigationResult, NoopRenderer};
    use crate::sites::Site;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Page simulation: a set of selectors currently in the DOM, plus the
    /// markup returned for the content selector.
    #[derive(Clone)]
    struct FakePage {
        present: Arc<Mutex<HashSet<String>>>,
        html: String,
        fail_navigation: bool,
    }

    struct FakeRenderer {
        page: FakePage,
        user_agents: Mutex<Vec<String>>,
        open: Arc<AtomicUsize>,
    }

    struct FakeContext {
        page: FakePage,
        open: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Renderer for FakeRenderer {
        async fn new_session(&self, user_agent: &str) -> anyhow::Result<Box<dyn RenderContext>> {
            self.user_agents.lock().unwrap().push(user_agent.to_string());
            self.open.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeContext {
                page: self.page.clone(),
                open: Arc::clone(&self.open),
            }))
        }
        fn active_sessions(&self) -> usize {
            self.open.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RenderContext for FakeContext {
        async fn navigate(&mut self, url: &str, _deadline: Instant) -> anyhow::Result<NavigationResult> {
            if self.page.fail_navigation {
                anyhow::bail!("net::ERR_NAME_NOT_RESOLVED");
            }
            Ok(NavigationResult {
                final_url: url.to_string(),
                load_time_ms: 1,
            })
        }
        async fn execute_js(&self, script: &str) -> anyhow::Result<serde_json::Value> {
            let mut present = self.page.present.lock().unwrap();
            // click_script removes the clicked control from the page.
            if script.contains("el.click()") {
                let sel = present.iter().find(|s| script.contains(s.as_str())).cloned();
                if let Some(sel) = sel {
                    present.remove(&sel);
                    return Ok(serde_json::Value::Bool(true));
                }
                return Ok(serde_json::Value::Bool(false));
            }
            let found = present.iter().any(|s| script.contains(s.as_str()));
            let want_absent = script.contains("=== null");
            Ok(serde_json::Value::Bool(found != want_absent))
        }
        async fn outer_html(&self, selector: &str) -> anyhow::Result<Option<String>> {
            let present = self.page.present.lock().unwrap();
            Ok(present.contains(selector).then(|| self.page.html.clone()))
        }
        async fn close(self: Box<Self>) -> anyhow::Result<()> {
            self.open.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn renderer(present: &[&str], html: &str, fail_navigation: bool) -> Arc<FakeRenderer> {
        Arc::new(FakeRenderer {
            page: FakePage {
                present: Arc::new(Mutex::new(present.iter().map(|s| s.to_string()).collect())),
                html: html.to_string(),
                fail_navigation,
            },
            user_agents: Mutex::new(Vec::new()),
            open: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn ctx(timeout: Duration) -> AttemptContext {
        AttemptContext {
            attempt: 0,
            deadline: Instant::now() + timeout,
            user_agent: "ua-test".to_string(),
        }
    }

    const ABOUT_HTML: &str =
        r#"<body><p data-test-id="about-us__description">We build things.</p></body>"#;

    #[tokio::test]
    async fn test_linkedin_success_emits_record() {
        let r = renderer(&["body"], ABOUT_HTML, false);
        let sink = Arc::new(MemorySink::new());
        let fetcher = BrowserFetcher::new(r.clone(), Site::Linkedin.profile(), sink.clone());

        fetcher
            .fetch_and_extract(&Target::from("https://example.com/a"), &ctx(Duration::from_secs(2)))
            .await
            .unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 1);
        match &records[0] {
            CompanyRecord::About(a) => assert_eq!(a.about, "We build things."),
            other => panic!("unexpected record {other:?}"),
        }
        assert_eq!(r.user_agents.lock().unwrap().as_slice(), ["ua-test"]);
        assert_eq!(r.active_sessions(), 0);
    }

    #[tokio::test]
    async fn test_glassdoor_clicks_read_more_before_capture() {
        let container = Site::Glassdoor.profile().content_selector;
        let read_more = crate::sites::GLASSDOOR_READ_MORE;
        let html = r#"<div><h1 class="employer-overview__employer-overview-module__employerOverviewHeading">Acme</h1></div>"#;
        let r = renderer(&[container, read_more], html, false);
        let sink = Arc::new(MemorySink::new());
        let fetcher = BrowserFetcher::new(r.clone(), Site::Glassdoor.profile(), sink.clone());

        fetcher
            .fetch_and_extract(&Target::from("https://example.com/g"), &ctx(Duration::from_secs(2)))
            .await
            .unwrap();

        assert!(!r.page.present.lock().unwrap().contains(read_more));
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test]
    async fn test_glassdoor_missing_read_more_is_action_error() {
        let container = Site::Glassdoor.profile().content_selector;
        let html = r#"<div><h1 class="employer-overview__employer-overview-module__employerOverviewHeading">Acme</h1></div>"#;
        let r = renderer(&[container], html, false);
        let sink = Arc::new(MemorySink::new());
        let fetcher = BrowserFetcher::new(r.clone(), Site::Glassdoor.profile(), sink.clone());

        let err = fetcher
            .fetch_and_extract(&Target::from("https://example.com/g"), &ctx(Duration::from_secs(2)))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "action");
        assert!(sink.records().is_empty());
        assert_eq!(r.active_sessions(), 0);
    }

    #[tokio::test]
    async fn test_missing_content_is_element_timeout() {
        let r = renderer(&[], ABOUT_HTML, false);
        let sink = Arc::new(MemorySink::new());
        let fetcher = BrowserFetcher::new(r.clone(), Site::Linkedin.profile(), sink.clone());

        let err = fetcher
            .fetch_and_extract(&Target::from("https://example.com/a"), &ctx(Duration::from_millis(300)))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ScrapeError::ElementTimeout {
                selector: "body".to_string()
            }
        );
        assert!(sink.records().is_empty());
        assert_eq!(r.active_sessions(), 0);
    }

    #[tokio::test]
    async fn test_navigation_failure_maps_to_navigation_error() {
        let r = renderer(&["body"], ABOUT_HTML, true);
        let fetcher = BrowserFetcher::new(r, Site::Linkedin.profile(), Arc::new(MemorySink::new()));
        let err = fetcher
            .fetch_and_extract(&Target::from("https://nowhere.invalid"), &ctx(Duration::from_secs(1)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "navigation");
    }

    #[tokio::test]
    async fn test_cardinality_failure_emits_nothing() {
        let r = renderer(&["body"], "<body><p>no blurb</p></body>", false);
        let sink = Arc::new(MemorySink::new());
        let fetcher = BrowserFetcher::new(r, Site::Linkedin.profile(), sink.clone());
        let err = fetcher
            .fetch_and_extract(&Target::from("https://example.com/a"), &ctx(Duration::from_secs(1)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "extraction_cardinality");
        assert!(sink.records().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_browser_is_browser_error() {
        let fetcher = BrowserFetcher::new(
            Arc::new(NoopRenderer),
            Site::Linkedin.profile(),
            Arc::new(MemorySink::new()),
        );
        let err = fetcher
            .fetch_and_extract(&Target::from("https://example.com/a"), &ctx(Duration::from_secs(1)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "browser");
    }
}
