//! Auto-retrying assertions
//!
//! Every assertion re-reads the page until the condition holds or the
//! timeout expires. Probe errors (element not there yet, strict mode
//! violations while the DOM settles) count as "not yet".

use std::fmt::Debug;
use std::future::Future;
use std::time::{Duration, Instant};

use regex::Regex;
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::page::{Locator, Page, WaitState};

/// Default timeout for auto-waiting (5 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default polling interval for auto-waiting
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct Expect<'a> {
    page: &'a dyn Page,
    timeout: Duration,
    poll_interval: Duration,
}

pub fn expect(page: &dyn Page) -> Expect<'_> {
    Expect {
        page,
        timeout: DEFAULT_TIMEOUT,
        poll_interval: DEFAULT_POLL_INTERVAL,
    }
}

impl<'a> Expect<'a> {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub async fn to_have_url(&self, pattern: &Regex) -> E2eResult<()> {
        let page = self.page;
        self.poll(|| page.url(), |url| pattern.is_match(url))
            .await
            .map(|_| ())
            .map_err(|last| {
                E2eError::AssertionFailed(format!(
                    "expected URL matching /{}/, got {}",
                    pattern,
                    describe(&last)
                ))
            })
    }

    pub async fn to_be_visible(&self, locator: &Locator) -> E2eResult<()> {
        let page = self.page;
        self.poll(|| page.is_visible(locator), |visible| *visible)
            .await
            .map(|_| ())
            .map_err(|last| {
                E2eError::AssertionFailed(format!(
                    "expected {} to be visible, got {}",
                    locator,
                    describe(&last)
                ))
            })
    }

    pub async fn to_be_hidden(&self, locator: &Locator) -> E2eResult<()> {
        let page = self.page;
        self.poll(|| page.is_visible(locator), |visible| !*visible)
            .await
            .map(|_| ())
            .map_err(|last| {
                E2eError::AssertionFailed(format!(
                    "expected {} to be hidden, got {}",
                    locator,
                    describe(&last)
                ))
            })
    }

    pub async fn to_contain_text(&self, locator: &Locator, text: &str) -> E2eResult<()> {
        let page = self.page;
        self.poll(
            || page.text_content(locator),
            |content| content.as_deref().is_some_and(|c| c.contains(text)),
        )
        .await
        .map(|_| ())
        .map_err(|last| {
            E2eError::AssertionFailed(format!(
                "expected {} to contain {:?}, got {}",
                locator,
                text,
                describe(&last)
            ))
        })
    }

    pub async fn to_have_count(&self, locator: &Locator, expected: usize) -> E2eResult<()> {
        let page = self.page;
        self.poll(|| page.count(locator), |count| *count == expected)
            .await
            .map(|_| ())
            .map_err(|last| {
                E2eError::AssertionFailed(format!(
                    "expected {} to match {} element(s), got {}",
                    locator,
                    expected,
                    describe(&last)
                ))
            })
    }

    async fn poll<T, F, Fut>(
        &self,
        mut probe: F,
        accept: impl Fn(&T) -> bool,
    ) -> Result<T, E2eResult<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = E2eResult<T>>,
    {
        let deadline = Instant::now() + self.timeout;
        loop {
            match probe().await {
                Ok(value) if accept(&value) => return Ok(value),
                observed => {
                    if Instant::now() >= deadline {
                        return Err(observed);
                    }
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Wait until `locator` reaches `state`
pub async fn wait_for(
    page: &dyn Page,
    locator: &Locator,
    state: WaitState,
    timeout: Duration,
) -> E2eResult<()> {
    let check = expect(page).with_timeout(timeout);
    let outcome = match state {
        WaitState::Visible => check.to_be_visible(locator).await,
        WaitState::Hidden => check.to_be_hidden(locator).await,
    };
    outcome.map_err(|e| {
        debug!("wait_for {} failed: {}", locator, e);
        E2eError::Timeout(format!("{} to be {:?} within {:?}", locator, state, timeout))
    })
}

fn describe<T: Debug>(last: &E2eResult<T>) -> String {
    match last {
        Ok(value) => format!("{:?}", value),
        Err(e) => format!("error: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeHrm;
    use crate::fake::DASHBOARD_PATH;
    use crate::pages::login::DASHBOARD_HEADING;
    use crate::pages::search::{MENU_ITEM, SEARCH_PLACEHOLDER};

    const BASE: &str = "https://opensource-demo.orangehrmlive.com";

    #[tokio::test]
    async fn url_assertion_passes_on_match() {
        let page = FakeHrm::new(BASE);
        page.goto("/").await.unwrap();
        expect(&page)
            .to_have_url(&Regex::new("/auth/login").unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn url_assertion_reports_last_url() {
        let page = FakeHrm::new(BASE);
        page.goto("/").await.unwrap();
        let err = expect(&page)
            .with_timeout(Duration::from_millis(50))
            .with_poll_interval(Duration::from_millis(10))
            .to_have_url(&Regex::new("dashboard").unwrap())
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("/dashboard/"), "{}", message);
        assert!(message.contains("/web/index.php/auth/login"), "{}", message);
    }

    #[tokio::test]
    async fn count_assertion_tracks_menu_filter() {
        let page = FakeHrm::new(BASE).logged_in();
        page.goto(DASHBOARD_PATH).await.unwrap();
        let input = Locator::placeholder(SEARCH_PLACEHOLDER);
        let items = Locator::new(MENU_ITEM);

        page.fill(&input, "Payroll").await.unwrap();
        expect(&page).to_have_count(&items, 0).await.unwrap();

        page.fill(&input, "Ti").await.unwrap();
        expect(&page).to_have_count(&items, 1).await.unwrap();

        let err = expect(&page)
            .with_timeout(Duration::from_millis(50))
            .with_poll_interval(Duration::from_millis(10))
            .to_have_count(&items, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, E2eError::AssertionFailed(_)));
        assert!(err.to_string().contains("to match 2 element(s), got 1"), "{}", err);
    }

    #[tokio::test]
    async fn wait_for_times_out_on_missing_element() {
        let page = FakeHrm::new(BASE);
        page.goto("/").await.unwrap();
        let heading = Locator::new(DASHBOARD_HEADING);
        let err = wait_for(&page, &heading, WaitState::Visible, Duration::from_millis(30))
            .await
            .unwrap_err();
        assert!(matches!(err, E2eError::Timeout(_)));

        wait_for(&page, &heading, WaitState::Hidden, Duration::from_millis(30))
            .await
            .unwrap();
    }
}
