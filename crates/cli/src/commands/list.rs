//! Scenario listing

use anyhow::Result;
use clap::Args;
use orangehrm_e2e::scenarios::{self, Scenario};
use serde::Serialize;

use crate::output::{print_list, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct ListArgs {
    /// Only scenarios carrying this tag (ui, api, login, search)
    #[arg(short, long)]
    pub tag: Option<String>,
}

#[derive(Serialize)]
pub struct ScenarioDisplay {
    pub id: String,
    pub title: String,
    pub kind: String,
    pub tags: Vec<String>,
}

impl From<&Scenario> for ScenarioDisplay {
    fn from(scenario: &Scenario) -> Self {
        Self {
            id: scenario.id.to_string(),
            title: scenario.title.to_string(),
            kind: scenario.kind().to_string(),
            tags: scenario.tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl TableDisplay for ScenarioDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Title", "Kind", "Tags"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.title.clone(),
            self.kind.clone(),
            self.tags.join(", "),
        ]
    }
}

pub fn execute(args: ListArgs, format: OutputFormat) -> Result<()> {
    let selected = match &args.tag {
        Some(tag) => scenarios::tagged(tag),
        None => scenarios::catalogue(),
    };
    let displays: Vec<ScenarioDisplay> = selected.iter().map(ScenarioDisplay::from).collect();
    print_list(&displays, format);
    Ok(())
}
