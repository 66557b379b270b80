//! HeavyShop CLI - database migrations, seeding and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply schema and session table migrations
//! hs-cli migrate
//!
//! # Load the catalog and company pages from YAML
//! hs-cli seed --file fixtures/bookstore.yaml
//!
//! # Random customers, orders and reviews for the statistics pages
//! hs-cli generate-test-data --orders 200
//!
//! # Staff accounts
//! hs-cli staff create -u manager -e manager@example.com -p manager2026
//! hs-cli staff promote -u alice
//!
//! # Daily sales snapshot (defaults to today)
//! hs-cli stats snapshot --date 2026-10-18
//! ```
//!
//! All commands read `HEAVYSHOP_DATABASE_URL` (or `DATABASE_URL`), loading
//! `.env` first.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hs-cli")]
#[command(author, version, about = "HeavyShop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load catalog and content fixtures into an empty database
    Seed {
        /// YAML fixture file
        #[arg(short, long, default_value = "fixtures/bookstore.yaml")]
        file: PathBuf,
    },
    /// Create random customers, orders and reviews
    GenerateTestData {
        /// Number of orders to place
        #[arg(short, long, default_value_t = 50)]
        orders: u32,

        /// RNG seed for repeatable data
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Manage staff accounts
    Staff {
        #[command(subcommand)]
        action: StaffAction,
    },
    /// Sales statistics maintenance
    Stats {
        #[command(subcommand)]
        action: StatsAction,
    },
}

#[derive(Subcommand)]
enum StaffAction {
    /// Create a new staff account
    Create {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Grant staff access to an existing account
    Promote {
        #[arg(short, long)]
        username: String,
    },
}

#[derive(Subcommand)]
enum StatsAction {
    /// Compute and store the daily sales snapshot
    Snapshot {
        /// Day to summarise (YYYY-MM-DD), default today
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "heavyshop_cli=info,heavyshop_storefront=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::run(&file).await?,
        Commands::GenerateTestData { orders, seed } => {
            commands::test_data::run(orders, seed).await?;
        }
        Commands::Staff { action } => match action {
            StaffAction::Create {
                username,
                email,
                password,
            } => {
                commands::staff::create(&username, &email, &password).await?;
            }
            StaffAction::Promote { username } => commands::staff::promote(&username).await?,
        },
        Commands::Stats { action } => match action {
            StatsAction::Snapshot { date } => commands::stats::snapshot(date).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_snapshot_date() {
        let cli = Cli::try_parse_from(["hs-cli", "stats", "snapshot", "--date", "2026-03-08"])
            .unwrap_or_else(|e| panic!("{e}"));
        let Commands::Stats {
            action: StatsAction::Snapshot { date },
        } = cli.command
        else {
            panic!("wrong command");
        };
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 8));
    }

    #[test]
    fn test_seed_has_default_file() {
        let cli = Cli::try_parse_from(["hs-cli", "seed"]).unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            cli.command,
            Commands::Seed { file } if file == PathBuf::from("fixtures/bookstore.yaml")
        ));
    }
}
