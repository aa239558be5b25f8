//! OrangeHRM suite CLI - Main Entry Point
//!
//! Lists and runs the E2E scenarios, and calls the employee API by hand.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use orangehrm_e2e::SuiteConfig;

mod commands;
mod output;

use commands::{employees, list, run};

/// OrangeHRM E2E suite
#[derive(Parser)]
#[command(name = "orangehrm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Suite configuration file (YAML)
    #[arg(long, env = "ORANGEHRM_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List scenarios in the catalogue
    List(list::ListArgs),

    /// Run scenarios and write a JSON report
    Run(run::RunArgs),

    /// Call the employee API
    Employees(employees::EmployeesArgs),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let config = SuiteConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::List(args) => list::execute(args, cli.format)?,
        Commands::Run(args) => {
            let success = run::execute(args, config, cli.format).await?;
            if !success {
                std::process::exit(1);
            }
        }
        Commands::Employees(args) => employees::execute(args, &config, cli.format).await?,
        Commands::Version => {
            println!("OrangeHRM E2E CLI v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Target: {}", config.base_url);
            println!("Browser: {}", config.playwright.browser.as_str());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use orangehrm_e2e::Target;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_offline_target() {
        let cli = Cli::parse_from(["orangehrm", "--format", "json", "run", "--tag", "search", "--target", "offline"]);
        assert_eq!(cli.format, output::OutputFormat::Json);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.target, Target::Offline);
                assert_eq!(args.tag.as_deref(), Some("search"));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn employees_takes_api_url_before_action() {
        let cli = Cli::parse_from(["orangehrm", "employees", "--api-url", "http://127.0.0.1:9", "get", "3"]);
        match cli.command {
            Commands::Employees(args) => {
                assert_eq!(args.api_url.as_deref(), Some("http://127.0.0.1:9"));
                assert!(matches!(args.command, employees::EmployeeCommands::Get { id: 3 }));
            }
            _ => panic!("expected employees"),
        }
    }
}
