use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{
    ChatCommand, ConfigCommand, MealCommand, SearchCommand, SuggestCommand, SummaryCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "nutri")]
#[command(version)]
#[command(about = "Log meals and track daily calories", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search Open Food Facts
    Search(SearchCommand),

    /// Suggest foods for a meal slot
    Suggest(SuggestCommand),

    /// Log and view meals
    Meal(MealCommand),

    /// Show calorie progress for a day
    Summary(SummaryCommand),

    /// Ask NutriBot about nutrition
    Chat(ChatCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Save config path for config commands
    let cli_config_path = cli.config.clone();

    // Load configuration
    let config = Config::load(cli.config)?;
    tracing::debug!(data_dir = %config.data_dir.value.display(), "Loaded configuration");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(execute_command(&cli.command, &config, cli_config_path))
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "nutri=info,nutritrack_core=info"
    } else {
        "nutri=warn,nutritrack_core=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn execute_command(
    command: &Option<Commands>,
    config: &Config,
    cli_config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Some(Commands::Search(cmd)) => {
            cmd.run(config).await?;
        }
        Some(Commands::Suggest(cmd)) => {
            cmd.run(config).await?;
        }
        Some(Commands::Meal(cmd)) => {
            cmd.run(config).await?;
        }
        Some(Commands::Summary(cmd)) => {
            cmd.run(config).await?;
        }
        Some(Commands::Chat(cmd)) => {
            cmd.run(config).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(config, cli_config_path)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
