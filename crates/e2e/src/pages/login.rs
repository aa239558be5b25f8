//! Login screen

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::error::E2eResult;
use crate::expect::wait_for;
use crate::page::{LoadState, Locator, Page, WaitState};
use crate::pages::BasePage;

pub const USERNAME_INPUT: &str = r#"input[name="username"]"#;
pub const PASSWORD_INPUT: &str = r#"input[name="password"]"#;
pub const SUBMIT_BUTTON: &str = r#"button[type="submit"]"#;
pub const ERROR_ALERT: &str = ".oxd-alert-content";
pub const INPUT_GROUP: &str = "div.oxd-input-group";
pub const FIELD_ERROR: &str = "span.oxd-input-field-error-message";
pub const FORGOT_PASSWORD: &str = "Forgot your password?";
pub const DASHBOARD_HEADING: &str = r#"h6:has-text("Dashboard")"#;

const REQUIRED: &str = "Required";

pub struct LoginPage {
    base: BasePage,
    base_url: String,
    pub username_input: Locator,
    pub password_input: Locator,
    pub login_button: Locator,
    pub error_message: Locator,
    pub username_error: Locator,
    pub password_error: Locator,
    pub forgot_password_link: Locator,
    pub dashboard_heading: Locator,
}

impl LoginPage {
    pub fn new(page: Arc<dyn Page>, base_url: impl Into<String>) -> Self {
        let groups = Locator::new(INPUT_GROUP);
        Self {
            base: BasePage::new(page),
            base_url: base_url.into(),
            username_input: Locator::new(USERNAME_INPUT),
            password_input: Locator::new(PASSWORD_INPUT),
            login_button: Locator::new(SUBMIT_BUTTON),
            error_message: Locator::new(ERROR_ALERT),
            username_error: Locator::new(format!("{} {}", INPUT_GROUP, FIELD_ERROR)).first(),
            password_error: groups.nth(1).locator(FIELD_ERROR),
            forgot_password_link: Locator::text(FORGOT_PASSWORD),
            dashboard_heading: Locator::new(DASHBOARD_HEADING),
        }
    }

    /// Timeout for this page's assertions
    pub fn with_expect_timeout(mut self, timeout: Duration) -> Self {
        self.base = self.base.with_expect_timeout(timeout);
        self
    }

    pub fn base(&self) -> &BasePage {
        &self.base
    }

    pub async fn open(&self) -> E2eResult<()> {
        self.base.goto(&self.base_url).await
    }

    /// Submit the form; `true` when the dashboard was reached
    pub async fn login(&self, username: &str, password: &str) -> E2eResult<bool> {
        self.base.fill(&self.username_input, username).await?;
        self.base.fill(&self.password_input, password).await?;

        self.base
            .page()
            .click_and_wait(&self.login_button, LoadState::NetworkIdle)
            .await?;

        let url = self.base.page().url().await?;
        if url.contains("/dashboard") {
            self.base.expect().to_be_visible(&self.dashboard_heading).await?;
            info!("Logged in as {:?}", username);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub async fn click_forgot_password(&self) -> E2eResult<()> {
        self.base.click(&self.forgot_password_link).await
    }

    pub async fn expect_error_message(&self, text: &str) -> E2eResult<()> {
        self.base.expect_text(&self.error_message, text).await
    }

    pub async fn expect_username_required_error(&self) -> E2eResult<()> {
        self.base.expect_text(&self.username_error, REQUIRED).await
    }

    pub async fn expect_password_required_error(&self) -> E2eResult<()> {
        wait_for(
            self.base.page(),
            &self.password_error,
            WaitState::Visible,
            Duration::from_secs(5),
        )
        .await?;
        self.base.expect_text(&self.password_error, REQUIRED).await
    }
}
