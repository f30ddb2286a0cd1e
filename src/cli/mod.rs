pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::auth::roles::{AccessArea, Role};

#[derive(Parser, Debug)]
#[command(name = "casfos")]
#[command(about = "CASFOS asset and faculty management - operator commands")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Create or upgrade the Postgres document schema")]
    Migrate,

    #[command(about = "Create an approved account without the registration workflow")]
    CreateUser {
        #[arg(long, help = "Login name")]
        name: String,
        #[arg(long, help = "Initial password")]
        password: String,
        #[arg(long, value_parser = parse_role, default_value = "admin", help = "admin, asset_manager, principal, storekeeper, data_entry or viewer")]
        role: Role,
        #[arg(long, value_delimiter = ',', value_parser = parse_area, help = "Comma-separated access areas: asset, faculty")]
        access: Vec<AccessArea>,
    },

    #[command(about = "Load users, approved purchases and faculty from a YAML file")]
    Seed {
        #[arg(help = "Path to the seed file")]
        file: PathBuf,
    },

    #[command(about = "Print stock, issue, service and disposal counts per category")]
    Summary,
}

fn parse_role(s: &str) -> Result<Role, String> {
    Role::parse(s).ok_or_else(|| format!("unknown role '{}'", s))
}

fn parse_area(s: &str) -> Result<AccessArea, String> {
    AccessArea::parse(s).ok_or_else(|| format!("unknown access area '{}'", s))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::CreateUser { name, password, role, access } => {
            commands::user::handle(name, password, role, access, output_format).await
        }
        Commands::Seed { file } => commands::seed::handle(file, output_format).await,
        Commands::Summary => commands::summary::handle(output_format).await,
    }
}
