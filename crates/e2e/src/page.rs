//! Browser seam used by the page objects
//!
//! Page objects talk to a [`Page`], never to a concrete driver. The live
//! implementation is [`crate::playwright::PlaywrightSession`]; offline runs
//! use [`crate::fake::FakeHrm`].

use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::E2eResult;

/// A Playwright selector, possibly chained with `>>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    selector: String,
}

impl Locator {
    /// Locator from a raw selector (CSS, `text=...`, ...)
    pub fn new(selector: impl Into<String>) -> Self {
        Self { selector: selector.into() }
    }

    /// Input or textarea carrying the given placeholder
    pub fn placeholder(text: &str) -> Self {
        Self::new(format!(r#"input[placeholder="{}"]"#, text))
    }

    /// Element whose text matches
    pub fn text(text: &str) -> Self {
        Self::new(format!("text={}", text))
    }

    /// CSS match narrowed to elements containing `text`
    pub fn has_text(css: &str, text: &str) -> Self {
        Self::new(format!(r#"{}:has-text("{}")"#, css, text))
    }

    /// The n-th match (zero based)
    pub fn nth(&self, index: usize) -> Self {
        Self::new(format!("{} >> nth={}", self.selector, index))
    }

    pub fn first(&self) -> Self {
        self.nth(0)
    }

    /// Descendant lookup scoped to this locator
    pub fn locator(&self, child: &str) -> Self {
        Self::new(format!("{} >> {}", self.selector, child))
    }

    pub fn as_str(&self) -> &str {
        &self.selector
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.selector)
    }
}

impl From<&str> for Locator {
    fn from(selector: &str) -> Self {
        Locator::new(selector)
    }
}

impl From<String> for Locator {
    fn from(selector: String) -> Self {
        Locator::new(selector)
    }
}

impl From<&Locator> for Locator {
    fn from(locator: &Locator) -> Self {
        locator.clone()
    }
}

/// Keys the suite presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    ArrowDown,
    Backspace,
    Escape,
    Tab,
}

impl Key {
    /// Playwright key name
    pub fn as_str(&self) -> &'static str {
        match self {
            Key::Enter => "Enter",
            Key::Space => "Space",
            Key::ArrowDown => "ArrowDown",
            Key::Backspace => "Backspace",
            Key::Escape => "Escape",
            Key::Tab => "Tab",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    #[serde(rename = "load")]
    Load,
    #[serde(rename = "domcontentloaded")]
    DomContentLoaded,
    #[default]
    #[serde(rename = "networkidle")]
    NetworkIdle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
}

/// A single browser tab
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate to an absolute URL or a path relative to the base URL
    async fn goto(&self, url: &str) -> E2eResult<()>;

    /// Current URL
    async fn url(&self) -> E2eResult<String>;

    async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()>;

    async fn click(&self, locator: &Locator) -> E2eResult<()>;

    /// Click and wait for the page to settle in `state`
    async fn click_and_wait(&self, locator: &Locator, state: LoadState) -> E2eResult<()> {
        self.click(locator).await?;
        self.wait_for_load_state(state).await
    }

    async fn press(&self, locator: &Locator, key: Key) -> E2eResult<()>;

    async fn focus(&self, locator: &Locator) -> E2eResult<()>;

    /// Text content of the single element, `None` if it has none
    async fn text_content(&self, locator: &Locator) -> E2eResult<Option<String>>;

    /// Number of matching elements, zero when nothing matches
    async fn count(&self, locator: &Locator) -> E2eResult<usize>;

    async fn is_visible(&self, locator: &Locator) -> E2eResult<bool>;

    async fn wait_for_load_state(&self, state: LoadState) -> E2eResult<()>;

    async fn wait_for_timeout(&self, duration: Duration) -> E2eResult<()>;

    async fn screenshot(&self, path: &Path) -> E2eResult<()>;

    async fn close(&self) -> E2eResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chained_locators() {
        let groups = Locator::new("div.oxd-input-group");
        let error = groups.nth(1).locator("span.oxd-input-field-error-message");
        assert_eq!(
            error.as_str(),
            "div.oxd-input-group >> nth=1 >> span.oxd-input-field-error-message"
        );
        assert_eq!(groups.first().as_str(), "div.oxd-input-group >> nth=0");
    }

    #[test]
    fn helper_constructors() {
        assert_eq!(Locator::placeholder("Search").as_str(), r#"input[placeholder="Search"]"#);
        assert_eq!(Locator::text("Forgot your password?").as_str(), "text=Forgot your password?");
        assert_eq!(
            Locator::has_text("h6", "Dashboard").as_str(),
            r#"h6:has-text("Dashboard")"#
        );
    }

    #[test]
    fn load_state_wire_names() {
        assert_eq!(serde_json::to_string(&LoadState::NetworkIdle).unwrap(), r#""networkidle""#);
        assert_eq!(
            serde_json::to_string(&LoadState::DomContentLoaded).unwrap(),
            r#""domcontentloaded""#
        );
    }
}
