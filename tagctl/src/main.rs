use clap::{Parser, Subcommand};
use std::path::PathBuf;
use storefront::Storefront;
use tagctl::{build_catalog, demo, Settings};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tagctl")]
#[command(about = "Explore generic tags on store entities")]
struct Cli {
    /// Path to a TOML settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Log filter, overrides RUST_LOG and the settings file
    #[arg(long, global = true)]
    log: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered entity kinds
    Kinds,
    /// Run the tagging walkthrough against the sample store
    Demo,
    /// Validate and print the effective settings
    CheckConfig,
}

fn init_tracing(cli_filter: Option<&str>, settings: &Settings) {
    let filter = match cli_filter {
        Some(filter) => EnvFilter::new(filter),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?;
    init_tracing(cli.log.as_deref(), &settings);
    info!(config = ?cli.config, "settings loaded");

    match cli.command {
        Commands::Kinds => {
            let catalog = build_catalog(&Storefront::new())?;
            for kind in catalog.kinds() {
                println!(
                    "{:<20} {}",
                    kind.to_string(),
                    catalog.type_name_of(kind).unwrap_or("?")
                );
            }
        }
        Commands::Demo => match demo::run(settings.tagging.clone()).await {
            Ok(steps) => {
                for (i, step) in steps.iter().enumerate() {
                    println!("{:>2}. {}", i + 1, step);
                }
            }
            Err(e) => {
                error!("demo failed: {}", e);
                return Err(e.into());
            }
        },
        Commands::CheckConfig => {
            print!("{}", settings.to_toml()?);
        }
    }

    Ok(())
}
