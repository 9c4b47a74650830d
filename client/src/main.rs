use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use client::ConfigClient;
use serde::Serialize;
use shared_types::ConfigData;
use tracing::Level;

/// Command-line client for the versioned config service
#[derive(Parser)]
#[command(name = "configctl")]
#[command(version)]
#[command(about = "Manage versioned configurations over HTTP", long_about = None)]
struct Cli {
    /// Base URL of the config server
    #[arg(long, env = "CONFIG_SERVER_URL", default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a configuration at version 1
    Create {
        name: String,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Store new data as the next version
    Update {
        name: String,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Re-publish an earlier version as the next version
    Rollback {
        name: String,

        /// Version whose data becomes current again
        #[arg(allow_negative_numbers = true)]
        target_version: i64,
    },

    /// Show the current data, or a specific version with --version
    Get {
        name: String,

        #[arg(long, allow_negative_numbers = true)]
        version: Option<i64>,
    },

    /// List the version history, newest first
    Versions { name: String },

    /// Check whether the server and its database are up
    Health,
}

#[derive(Args)]
struct DataArgs {
    #[arg(long)]
    max_limit: u64,

    /// true or false
    #[arg(long, action = ArgAction::Set)]
    enabled: bool,
}

impl From<DataArgs> for ConfigData {
    fn from(args: DataArgs) -> Self {
        ConfigData::new(args.max_limit, args.enabled)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = ConfigClient::new(cli.url)?;

    match cli.command {
        Commands::Create { name, data } => {
            print_json(&client.create_config(&name, &data.into()).await?)?;
        }
        Commands::Update { name, data } => {
            print_json(&client.update_config(&name, &data.into()).await?)?;
        }
        Commands::Rollback {
            name,
            target_version,
        } => {
            print_json(&client.rollback_config(&name, target_version).await?)?;
        }
        Commands::Get { name, version } => {
            let config = match version {
                Some(version) => client.get_config_version(&name, version).await?,
                None => client.get_config(&name).await?,
            };
            print_json(&config)?;
        }
        Commands::Versions { name } => {
            print_json(&client.list_versions(&name).await?)?;
        }
        Commands::Health => {
            let healthy = client.health_check().await?;
            println!("{}", if healthy { "healthy" } else { "unhealthy" });
            if !healthy {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_rollback_accepts_negative_version() {
        let cli = Cli::try_parse_from(["configctl", "rollback", "app", "-1"]).unwrap();

        assert!(matches!(
            cli.command,
            Commands::Rollback { ref name, target_version: -1 } if name == "app"
        ));
    }

    #[test]
    fn test_get_accepts_negative_version() {
        let cli = Cli::try_parse_from(["configctl", "get", "app", "--version", "-2"]).unwrap();

        assert!(matches!(
            cli.command,
            Commands::Get { version: Some(-2), .. }
        ));
    }

    #[test]
    fn test_create_requires_explicit_enabled() {
        let cli = Cli::try_parse_from([
            "configctl",
            "--url",
            "http://config:9000",
            "create",
            "app",
            "--max-limit",
            "10",
            "--enabled",
            "false",
        ])
        .unwrap();

        assert_eq!(cli.url, "http://config:9000");
        match cli.command {
            Commands::Create { name, data } => {
                assert_eq!(name, "app");
                assert_eq!(ConfigData::from(data), ConfigData::new(10, false));
            }
            _ => panic!("expected create"),
        }

        assert!(Cli::try_parse_from(["configctl", "create", "app", "--max-limit", "10"]).is_err());
    }
}
