//! Runs catalogue scenarios against a target and collects the results

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::api::ApiClient;
use crate::config::SuiteConfig;
use crate::error::{E2eError, E2eResult};
use crate::fake::FakeHrm;
use crate::mock::MockServer;
use crate::page::Page;
use crate::playwright::PlaywrightSession;
use crate::scenarios::{self, ApiContext, Scenario, ScenarioBody, ScenarioFuture, UiContext};

/// Where UI scenarios run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// The configured site, driven through Playwright
    #[default]
    Live,
    /// The in-memory [`FakeHrm`]
    Offline,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Live => "live",
            Target::Offline => "offline",
        }
    }
}

impl std::str::FromStr for Target {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "live" => Ok(Target::Live),
            "offline" | "fake" => Ok(Target::Offline),
            other => Err(E2eError::Config(format!("unknown target: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::Skipped => "skipped",
        }
    }
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub id: String,
    pub title: String,
    pub kind: String,
    pub outcome: Outcome,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot: Option<PathBuf>,
}

impl TestResult {
    fn new(scenario: &Scenario, outcome: Outcome, error: Option<String>) -> Self {
        Self {
            id: scenario.id.to_string(),
            title: scenario.title.to_string(),
            kind: scenario.kind().to_string(),
            outcome,
            duration_ms: 0,
            error,
            screenshot: None,
        }
    }

    pub fn success(&self) -> bool {
        self.outcome != Outcome::Failed
    }
}

/// Result of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub target: Target,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Sequential scenario runner
///
/// Every UI scenario gets its own page (a Playwright session or a fresh
/// [`FakeHrm`]), and every API scenario its own [`MockServer`], so no state
/// leaks between scenarios.
pub struct TestRunner {
    config: Arc<SuiteConfig>,
    target: Target,
    output_dir: PathBuf,
}

impl TestRunner {
    pub fn new(config: SuiteConfig, target: Target) -> Self {
        let output_dir = config.output_dir.clone();
        Self {
            config: Arc::new(config),
            target,
            output_dir,
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run the whole catalogue
    pub async fn run_all(&self) -> E2eResult<TestSuiteResult> {
        self.run_scenarios(&scenarios::catalogue()).await
    }

    /// Run scenarios carrying `tag`
    pub async fn run_tagged(&self, tag: &str) -> E2eResult<TestSuiteResult> {
        self.run_scenarios(&scenarios::tagged(tag)).await
    }

    /// Run a specific scenario by id
    pub async fn run_test(&self, id: &str) -> E2eResult<TestResult> {
        let scenario =
            scenarios::find(id).ok_or_else(|| E2eError::ScenarioNotFound(id.to_string()))?;
        Ok(self.run_scenario(&scenario).await)
    }

    pub async fn run_scenarios(&self, scenarios: &[Scenario]) -> E2eResult<TestSuiteResult> {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::with_capacity(scenarios.len());

        info!(
            "Running {} scenario(s) against {} target...",
            scenarios.len(),
            self.target.as_str()
        );

        for scenario in scenarios {
            let result = self.run_scenario(scenario).await;
            match result.outcome {
                Outcome::Passed => info!("✓ {} ({} ms)", result.id, result.duration_ms),
                Outcome::Skipped => warn!(
                    "- {} skipped: {}",
                    result.id,
                    result.error.as_deref().unwrap_or("no reason given")
                ),
                Outcome::Failed => error!(
                    "✗ {} - {}",
                    result.id,
                    result.error.as_deref().unwrap_or("unknown error")
                ),
            }
            results.push(result);
        }

        let count = |outcome: Outcome| results.iter().filter(|r| r.outcome == outcome).count();
        let (passed, failed, skipped) = (
            count(Outcome::Passed),
            count(Outcome::Failed),
            count(Outcome::Skipped),
        );
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, skipped, duration_ms
        );

        Ok(TestSuiteResult {
            target: self.target,
            started_at,
            total: results.len(),
            passed,
            failed,
            skipped,
            duration_ms,
            results,
        })
    }

    /// Run one scenario; failures are captured in the result, never returned
    pub async fn run_scenario(&self, scenario: &Scenario) -> TestResult {
        let start = Instant::now();
        debug!("Running scenario: {} - {}", scenario.id, scenario.title);

        let mut result = match scenario.body {
            ScenarioBody::Ui(body) => self.run_ui(scenario, body).await,
            ScenarioBody::Api(body) => self.run_api(scenario, body).await,
        };
        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }

    async fn run_ui(&self, scenario: &Scenario, body: fn(UiContext) -> ScenarioFuture) -> TestResult {
        let page: Arc<dyn Page> = match self.target {
            Target::Offline => Arc::new(
                FakeHrm::new(&self.config.base_url).with_credentials(self.config.credentials.clone()),
            ),
            Target::Live => {
                match PlaywrightSession::launch(&self.config.playwright, &self.config.base_url).await {
                    Ok(session) => Arc::new(session),
                    Err(E2eError::PlaywrightNotFound) => {
                        return TestResult::new(
                            scenario,
                            Outcome::Skipped,
                            Some(E2eError::PlaywrightNotFound.to_string()),
                        );
                    }
                    Err(e) => {
                        return TestResult::new(
                            scenario,
                            Outcome::Failed,
                            Some(format!("browser launch failed: {}", e)),
                        );
                    }
                }
            }
        };

        let context = UiContext::new(Arc::clone(&page), Arc::clone(&self.config));
        let mut result = match body(context).await {
            Ok(()) => TestResult::new(scenario, Outcome::Passed, None),
            Err(e) => TestResult::new(scenario, Outcome::Failed, Some(e.to_string())),
        };

        if result.outcome == Outcome::Failed && self.target == Target::Live {
            result.screenshot = self.capture_failure(page.as_ref(), scenario.id).await;
        }
        if let Err(e) = page.close().await {
            warn!("Failed to close page for {}: {}", scenario.id, e);
        }
        result
    }

    async fn run_api(&self, scenario: &Scenario, body: fn(ApiContext) -> ScenarioFuture) -> TestResult {
        let context = match self.api_context().await {
            Ok(context) => context,
            Err(e) => {
                return TestResult::new(
                    scenario,
                    Outcome::Failed,
                    Some(format!("mock backend unavailable: {}", e)),
                )
            }
        };

        match body(context).await {
            Ok(()) => TestResult::new(scenario, Outcome::Passed, None),
            Err(e) => TestResult::new(scenario, Outcome::Failed, Some(e.to_string())),
        }
    }

    async fn api_context(&self) -> E2eResult<ApiContext> {
        let mock = Arc::new(MockServer::start().await?);
        let client = ApiClient::new(mock.uri())?;
        Ok(ApiContext { client, mock })
    }

    /// Best-effort full-page screenshot
    async fn capture_failure(&self, page: &dyn Page, id: &str) -> Option<PathBuf> {
        let dir = self.output_dir.join("screenshots");
        if let Err(e) = std::fs::create_dir_all(&dir) {
            warn!("Cannot create {}: {}", dir.display(), e);
            return None;
        }
        let path = dir.join(format!("{}.png", id));
        match page.screenshot(&path).await {
            Ok(()) => {
                info!("Failure screenshot: {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Screenshot for {} failed: {}", id, e);
                None
            }
        }
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_runner(dir: &Path) -> TestRunner {
        TestRunner::new(SuiteConfig::default(), Target::Offline).with_output_dir(dir)
    }

    #[test]
    fn target_parses() {
        assert_eq!("LIVE".parse::<Target>().unwrap(), Target::Live);
        assert_eq!("offline".parse::<Target>().unwrap(), Target::Offline);
        assert!("staging".parse::<Target>().is_err());
    }

    #[tokio::test]
    async fn unknown_id_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = offline_runner(dir.path()).run_test("TC_NOPE").await.unwrap_err();
        assert!(matches!(err, E2eError::ScenarioNotFound(id) if id == "TC_NOPE"));
    }

    #[tokio::test]
    async fn offline_login_suite_passes() {
        let dir = tempfile::tempdir().unwrap();
        let suite = offline_runner(dir.path()).run_tagged("login").await.unwrap();
        assert_eq!(suite.total, 8);
        assert!(suite.success(), "{:#?}", suite.results);
        assert_eq!(suite.target, Target::Offline);
    }

    #[tokio::test]
    async fn valid_login_fails_when_credentials_are_wrong() {
        let mut config = SuiteConfig::default();
        config.credentials.password = "not-the-password".into();
        config.expect_timeout_ms = 50;

        // The double keeps its own Admin/admin123 account
        let page: Arc<dyn Page> = Arc::new(FakeHrm::new(&config.base_url));
        let context = UiContext::new(page, Arc::new(config));
        let ScenarioBody::Ui(body) = scenarios::find("TC_LOGIN_01").unwrap().body else {
            panic!("TC_LOGIN_01 is a UI scenario");
        };
        let err = body(context).await.unwrap_err();
        assert!(err.to_string().contains("should succeed"));
    }

    #[tokio::test]
    async fn results_are_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let runner = offline_runner(dir.path());
        let suite = runner.run_tagged("api").await.unwrap();
        assert_eq!(suite.passed, 10, "{:#?}", suite.results);

        let path = runner.write_results(&suite).unwrap();
        assert_eq!(path, dir.path().join("test-results.json"));
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["target"], "offline");
        assert_eq!(written["results"][0]["id"], "TC_API_01");
        assert_eq!(written["results"][0]["outcome"], "passed");
        assert_eq!(written["results"][0]["kind"], "api");
        assert_eq!(written["skipped"], 0);
    }

    #[test]
    fn skipped_result_does_not_fail() {
        let scenario = scenarios::find("TC_LOGIN_01").unwrap();
        let skipped = TestResult::new(&scenario, Outcome::Skipped, Some("no browser".into()));
        assert!(skipped.success());
        assert_eq!(serde_json::to_value(&skipped).unwrap()["outcome"], "skipped");

        let failed = TestResult::new(&scenario, Outcome::Failed, None);
        assert!(!failed.success());
    }
}
