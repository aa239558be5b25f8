//! Test-case catalogue
//!
//! Every scenario is a plain function pointer plus metadata, so the catalogue
//! can be listed, filtered by tag and run without any registration step.
//! UI scenarios receive a [`UiContext`] wrapping whichever [`Page`] the runner
//! chose; API scenarios receive a client already pointed at a fresh mock.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

use crate::api::ApiClient;
use crate::config::SuiteConfig;
use crate::error::{E2eError, E2eResult};
use crate::mock::MockServer;
use crate::page::Page;
use crate::pages::{LoginPage, SearchPage};

mod api;
mod login;
mod search;

pub use api::MOCK_TOKEN;

pub type ScenarioFuture = BoxFuture<'static, E2eResult<()>>;

/// What a UI scenario gets to work with
#[derive(Clone)]
pub struct UiContext {
    pub page: Arc<dyn Page>,
    pub config: Arc<SuiteConfig>,
}

impl UiContext {
    pub fn new(page: Arc<dyn Page>, config: Arc<SuiteConfig>) -> Self {
        Self { page, config }
    }

    pub fn expect_timeout(&self) -> Duration {
        Duration::from_millis(self.config.expect_timeout_ms)
    }

    pub fn login_page(&self) -> LoginPage {
        LoginPage::new(Arc::clone(&self.page), self.config.base_url.clone())
            .with_expect_timeout(self.expect_timeout())
    }

    pub fn search_page(&self) -> SearchPage {
        SearchPage::new(Arc::clone(&self.page)).with_expect_timeout(self.expect_timeout())
    }
}

/// What an API scenario gets to work with
#[derive(Clone)]
pub struct ApiContext {
    pub client: ApiClient,
    pub mock: Arc<MockServer>,
}

#[derive(Clone, Copy)]
pub enum ScenarioBody {
    Ui(fn(UiContext) -> ScenarioFuture),
    Api(fn(ApiContext) -> ScenarioFuture),
}

#[derive(Clone)]
pub struct Scenario {
    pub id: &'static str,
    pub title: &'static str,
    pub tags: &'static [&'static str],
    pub body: ScenarioBody,
}

impl Scenario {
    pub fn ui(
        id: &'static str,
        title: &'static str,
        tags: &'static [&'static str],
        body: fn(UiContext) -> ScenarioFuture,
    ) -> Self {
        Self {
            id,
            title,
            tags,
            body: ScenarioBody::Ui(body),
        }
    }

    pub fn api(
        id: &'static str,
        title: &'static str,
        tags: &'static [&'static str],
        body: fn(ApiContext) -> ScenarioFuture,
    ) -> Self {
        Self {
            id,
            title,
            tags,
            body: ScenarioBody::Api(body),
        }
    }

    /// `"ui"` or `"api"`
    pub fn kind(&self) -> &'static str {
        match self.body {
            ScenarioBody::Ui(_) => "ui",
            ScenarioBody::Api(_) => "api",
        }
    }

    pub fn is_ui(&self) -> bool {
        matches!(self.body, ScenarioBody::Ui(_))
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("tags", &self.tags)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Login, search, then API cases, in id order
pub fn catalogue() -> Vec<Scenario> {
    let mut all = login::scenarios();
    all.extend(search::scenarios());
    all.extend(api::scenarios());
    all
}

pub fn find(id: &str) -> Option<Scenario> {
    catalogue().into_iter().find(|s| s.id.eq_ignore_ascii_case(id))
}

pub fn tagged(tag: &str) -> Vec<Scenario> {
    catalogue().into_iter().filter(|s| s.has_tag(tag)).collect()
}

pub(crate) fn ensure(condition: bool, message: impl Into<String>) -> E2eResult<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(message.into()))
    }
}
