//! Shared element helpers for page objects

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tracing::debug;

use crate::error::E2eResult;
use crate::expect::{expect, Expect, DEFAULT_TIMEOUT};
use crate::page::{Locator, Page};

/// Thin wrapper around a shared [`Page`]
///
/// Every helper accepts either a raw selector or a [`Locator`].
#[derive(Clone)]
pub struct BasePage {
    page: Arc<dyn Page>,
    expect_timeout: Duration,
}

impl BasePage {
    pub fn new(page: Arc<dyn Page>) -> Self {
        Self {
            page,
            expect_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the timeout used by `expect_*` helpers
    pub fn with_expect_timeout(mut self, timeout: Duration) -> Self {
        self.expect_timeout = timeout;
        self
    }

    pub fn page(&self) -> &dyn Page {
        self.page.as_ref()
    }

    /// Assertion builder bound to this page and its timeout
    pub fn expect(&self) -> Expect<'_> {
        expect(self.page()).with_timeout(self.expect_timeout)
    }

    pub async fn goto(&self, url: &str) -> E2eResult<()> {
        debug!("goto {}", url);
        self.page.goto(url).await
    }

    pub async fn click(&self, target: impl Into<Locator>) -> E2eResult<()> {
        let locator = target.into();
        self.page.click(&locator).await
    }

    pub async fn fill(&self, target: impl Into<Locator>, text: &str) -> E2eResult<()> {
        let locator = target.into();
        self.page.fill(&locator, text).await
    }

    /// Text content of the element, empty when it has none
    pub async fn get_text(&self, target: impl Into<Locator>) -> E2eResult<String> {
        let locator = target.into();
        Ok(self.page.text_content(&locator).await?.unwrap_or_default())
    }

    pub async fn expect_url(&self, pattern: &Regex) -> E2eResult<()> {
        self.expect().to_have_url(pattern).await
    }

    pub async fn expect_text(&self, target: impl Into<Locator>, text: &str) -> E2eResult<()> {
        let locator = target.into();
        self.expect().to_contain_text(&locator, text).await
    }
}
