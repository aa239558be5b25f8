#![allow(dead_code)]

use orangehrm_e2e::{Outcome, SuiteConfig, Target, TestResult, TestRunner};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Run one catalogue scenario against `target`, reports going to a temp dir
pub async fn run(id: &str, target: Target) -> TestResult {
    init_tracing();
    let output = tempfile::tempdir().expect("create temp dir");
    let config = SuiteConfig::load(None).expect("load suite config");
    TestRunner::new(config, target)
        .with_output_dir(output.path())
        .run_test(id)
        .await
        .expect("scenario exists")
}

pub async fn run_offline(id: &str) -> TestResult {
    run(id, Target::Offline).await
}

/// Live run; a missing Playwright install counts as a skip
pub async fn run_live(id: &str) -> TestResult {
    let result = run(id, Target::Live).await;
    if result.outcome == Outcome::Skipped {
        eprintln!("Skipping {}: Playwright not available", id);
    }
    result
}
