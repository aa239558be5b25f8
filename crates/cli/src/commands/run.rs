//! Scenario execution

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use orangehrm_e2e::scenarios;
use orangehrm_e2e::{Outcome, SuiteConfig, Target, TestResult, TestRunner, TestSuiteResult};
use tracing::debug;

use crate::output::{
    print_error, print_item, print_list, print_success, print_warning, OutputFormat, TableDisplay,
};

#[derive(Args)]
pub struct RunArgs {
    /// Run only scenarios carrying this tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Run a single scenario by id (e.g. TC_LOGIN_01)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Where UI scenarios run (live, offline)
    #[arg(long, default_value = "live")]
    pub target: Target,

    /// Directory for test-results.json and failure screenshots
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl TableDisplay for TestResult {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Title", "Outcome", "Duration", "Error"]
    }

    fn row(&self) -> Vec<String> {
        let outcome = match self.outcome {
            Outcome::Passed => "✓ passed".green().to_string(),
            Outcome::Failed => "✗ failed".red().to_string(),
            Outcome::Skipped => "- skipped".yellow().to_string(),
        };
        vec![
            self.id.clone(),
            self.title.clone(),
            outcome,
            format!("{} ms", self.duration_ms),
            self.error.clone().unwrap_or_default(),
        ]
    }
}

impl TableDisplay for TestSuiteResult {
    fn headers() -> Vec<&'static str> {
        vec!["Target", "Started", "Total", "Passed", "Failed", "Skipped", "Duration"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.target.as_str().to_string(),
            self.started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            self.total.to_string(),
            self.passed.to_string(),
            self.failed.to_string(),
            self.skipped.to_string(),
            format!("{} ms", self.duration_ms),
        ]
    }
}

/// Returns whether every scenario passed or was skipped
pub async fn execute(args: RunArgs, config: SuiteConfig, format: OutputFormat) -> Result<bool> {
    let mut runner = TestRunner::new(config, args.target);
    if let Some(dir) = args.output {
        runner = runner.with_output_dir(dir);
    }
    debug!("Writing reports to {}", runner.output_dir().display());

    let suite = match (&args.name, &args.tag) {
        (Some(id), _) => {
            let scenario = scenarios::find(id).ok_or_else(|| anyhow!("Scenario not found: {}", id))?;
            runner.run_scenarios(std::slice::from_ref(&scenario)).await?
        }
        (None, Some(tag)) => runner.run_tagged(tag).await?,
        (None, None) => runner.run_all().await?,
    };

    if suite.total == 0 {
        print_warning("No scenarios matched");
        return Ok(true);
    }

    let report = runner.write_results(&suite)?;

    match format {
        OutputFormat::Table | OutputFormat::Plain => {
            print_list(&suite.results, format);
            print_item(&suite, format);
        }
        OutputFormat::Json | OutputFormat::Yaml => print_item(&suite, format),
    }

    for result in &suite.results {
        if let Some(path) = &result.screenshot {
            print_warning(&format!("{} screenshot: {}", result.id, path.display()));
        }
    }

    if suite.success() {
        print_success(&format!(
            "{} passed, {} skipped. Report: {}",
            suite.passed,
            suite.skipped,
            report.display()
        ));
    } else {
        print_error(&format!(
            "{} of {} scenario(s) failed. Report: {}",
            suite.failed,
            suite.total,
            report.display()
        ));
    }
    Ok(suite.success())
}
