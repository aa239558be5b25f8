//! Suite configuration
//!
//! Loaded from an optional YAML file, then overridden from `ORANGEHRM_*`
//! environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::models::Credentials;
use crate::playwright::PlaywrightConfig;

pub const DEMO_URL: &str = "https://opensource-demo.orangehrmlive.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Application under test
    pub base_url: String,

    /// Employee API host
    pub api_base_url: String,

    pub credentials: Credentials,

    pub playwright: PlaywrightConfig,

    /// Timeout for auto-retrying assertions
    pub expect_timeout_ms: u64,

    /// Reports and failure screenshots
    pub output_dir: PathBuf,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEMO_URL.to_string(),
            api_base_url: DEMO_URL.to_string(),
            credentials: Credentials::default(),
            playwright: PlaywrightConfig::default(),
            expect_timeout_ms: 5000,
            output_dir: PathBuf::from("test-results"),
        }
    }
}

impl SuiteConfig {
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        serde_yaml::from_str(yaml).map_err(E2eError::from)
    }

    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// File (or defaults) plus environment overrides
    pub fn load(path: Option<&Path>) -> E2eResult<Self> {
        let mut config = match path {
            Some(path) => {
                debug!("Loading suite config from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `ORANGEHRM_*` overrides read through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> E2eResult<()> {
        if let Some(url) = lookup("ORANGEHRM_BASE_URL") {
            self.base_url = url;
        }
        if let Some(url) = lookup("ORANGEHRM_API_URL") {
            self.api_base_url = url;
        }
        if let Some(username) = lookup("ORANGEHRM_USERNAME") {
            self.credentials.username = username;
        }
        if let Some(password) = lookup("ORANGEHRM_PASSWORD") {
            self.credentials.password = password;
        }
        if let Some(browser) = lookup("ORANGEHRM_BROWSER") {
            self.playwright.browser = browser.parse()?;
        }
        if let Some(headless) = lookup("ORANGEHRM_HEADLESS") {
            self.playwright.headless = parse_bool(&headless)?;
        }
        Ok(())
    }

    /// `base_url` joined with `path`
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn parse_bool(value: &str) -> E2eResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(E2eError::Config(format!("expected a boolean, got {:?}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playwright::Browser;
    use std::collections::HashMap;

    #[test]
    fn defaults_target_demo_instance() {
        let config = SuiteConfig::default();
        assert_eq!(config.base_url, DEMO_URL);
        assert_eq!(config.credentials.username, "Admin");
        assert_eq!(config.credentials.password, "admin123");
        assert!(config.playwright.headless);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = r#"
base_url: http://localhost:8080
playwright:
  browser: webkit
  viewport_width: 1920
"#;
        let config = SuiteConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.api_base_url, DEMO_URL);
        assert_eq!(config.playwright.browser, Browser::Webkit);
        assert_eq!(config.playwright.viewport_width, 1920);
        assert_eq!(config.playwright.viewport_height, 720);
    }

    #[test]
    fn from_file_reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suite.yaml");
        std::fs::write(&path, "credentials:\n  username: hr\n  password: secret\n").unwrap();
        let config = SuiteConfig::from_file(&path).unwrap();
        assert_eq!(config.credentials, Credentials::new("hr", "secret"));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("ORANGEHRM_BASE_URL", "http://hrm.local"),
            ("ORANGEHRM_PASSWORD", "hunter2"),
            ("ORANGEHRM_BROWSER", "firefox"),
            ("ORANGEHRM_HEADLESS", "false"),
        ]
        .into_iter()
        .collect();

        let mut config = SuiteConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.base_url, "http://hrm.local");
        assert_eq!(config.credentials.username, "Admin");
        assert_eq!(config.credentials.password, "hunter2");
        assert_eq!(config.playwright.browser, Browser::Firefox);
        assert!(!config.playwright.headless);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let mut config = SuiteConfig::default();
        let err = config
            .apply_overrides(|key| (key == "ORANGEHRM_HEADLESS").then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(matches!(err, E2eError::Config(_)));
    }

    #[test]
    fn url_joins_with_single_slash() {
        let config = SuiteConfig {
            base_url: format!("{}/", DEMO_URL),
            ..Default::default()
        };
        assert_eq!(
            config.url("/web/index.php/dashboard/index"),
            "https://opensource-demo.orangehrmlive.com/web/index.php/dashboard/index"
        );
    }
}
