//! OrangeHRM E2E Test Suite
//!
//! This crate provides a Rust-controlled end-to-end suite for OrangeHRM that:
//! - Drives a real browser through a Playwright bridge process
//! - Wraps each screen in a page object with auto-retrying assertions
//! - Calls the employee REST API through a typed client
//! - Replaces the API backend with a local mock during tests
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                  │
//! │    ├── run_all() / run_tagged(tag) / run_test(id)           │
//! │    ├── UI scenario  -> PlaywrightSession | FakeHrm          │
//! │    ├── API scenario -> MockServer + ApiClient               │
//! │    └── write_results() -> test-results.json                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Page objects (over dyn Page)                               │
//! │    ├── BasePage   goto, click, fill, get_text, expect_*     │
//! │    ├── LoginPage  open, login, forgot password, errors      │
//! │    └── SearchPage search, keys, dropdown, menu navigation   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenarios                                                  │
//! │    ├── TC_LOGIN_*  (ui, login)                              │
//! │    ├── TC_SRCH_*   (ui, search)                             │
//! │    └── TC_API_*    (api)                                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod expect;
pub mod fake;
pub mod helper;
pub mod mock;
pub mod models;
pub mod page;
pub mod pages;
pub mod playwright;
pub mod runner;
pub mod scenarios;

pub use api::ApiClient;
pub use config::SuiteConfig;
pub use error::{E2eError, E2eResult};
pub use expect::expect;
pub use fake::FakeHrm;
pub use mock::{Mock, MockServer};
pub use page::{Key, Locator, Page};
pub use pages::{BasePage, LoginPage, SearchPage};
pub use playwright::{PlaywrightConfig, PlaywrightSession};
pub use runner::{Outcome, Target, TestResult, TestRunner, TestSuiteResult};
pub use scenarios::{Scenario, ScenarioBody};
