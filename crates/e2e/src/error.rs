//! Error types for the E2E suite

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("{operation} failed with status {status}")]
    Http { operation: &'static str, status: u16 },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Playwright not found. Install with: npm install playwright && npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Bridge process error: {0}")]
    Bridge(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Mock server error: {0}")]
    MockServer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl E2eError {
    /// Status code carried by a failed API call, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            E2eError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
