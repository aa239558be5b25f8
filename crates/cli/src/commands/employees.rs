//! Employee API Commands

use anyhow::Result;
use clap::{Args, Subcommand};
use orangehrm_e2e::models::{Employee, LoginResponse};
use orangehrm_e2e::{ApiClient, SuiteConfig};
use tracing::debug;

use crate::output::{print_item, print_list, print_success, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct EmployeesArgs {
    /// API base URL (defaults to the configured api_base_url)
    #[arg(long, env = "ORANGEHRM_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token; empty sends no Authorization header
    #[arg(long, env = "ORANGEHRM_TOKEN", default_value = "", hide_env_values = true)]
    pub token: String,

    #[command(subcommand)]
    pub command: EmployeeCommands,
}

#[derive(Subcommand)]
pub enum EmployeeCommands {
    /// Log in and print the issued token
    Login {
        /// Username (defaults to the configured one)
        #[arg(short, long)]
        username: Option<String>,

        /// Password (defaults to the configured one)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// List all employees
    List,

    /// Get employee details
    Get {
        /// Employee ID
        id: u64,
    },

    /// Search employees by name
    Search {
        /// Search text
        query: String,
    },

    /// Delete an employee
    Delete {
        /// Employee ID
        id: u64,
    },
}

impl TableDisplay for Employee {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "First Name", "Last Name", "Email"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.email.clone().unwrap_or_else(|| "-".to_string()),
        ]
    }
}

impl TableDisplay for LoginResponse {
    fn headers() -> Vec<&'static str> {
        vec!["Token", "Username", "Role"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.token.clone(),
            self.user.username.clone(),
            self.user.role.clone(),
        ]
    }
}

pub async fn execute(args: EmployeesArgs, config: &SuiteConfig, format: OutputFormat) -> Result<()> {
    let base_url = args.api_url.unwrap_or_else(|| config.api_base_url.clone());
    debug!("Employee API at {}", base_url);
    let client = ApiClient::new(base_url)?;
    let token = args.token.as_str();

    match args.command {
        EmployeeCommands::Login { username, password } => {
            let username = username.unwrap_or_else(|| config.credentials.username.clone());
            let password = password.unwrap_or_else(|| config.credentials.password.clone());
            let response = client.login(&username, &password).await?;
            print_item(&response, format);
        }

        EmployeeCommands::List => {
            let employees = client.get_employees(token).await?;
            print_list(&employees, format);
        }

        EmployeeCommands::Get { id } => {
            let employee = client.get_employee_by_id(token, id).await?;
            print_item(&employee, format);
        }

        EmployeeCommands::Search { query } => {
            let employees = client.search_employees(token, &query).await?;
            print_list(&employees, format);
        }

        EmployeeCommands::Delete { id } => {
            let status = client.delete_employee(token, id).await?;
            print_success(&format!("Employee {} deleted (status {})", id, status));
        }
    }

    Ok(())
}
