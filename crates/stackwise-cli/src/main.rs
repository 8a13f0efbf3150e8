mod commands;

use clap::{Parser, Subcommand};
use stackwise_engine::DEFAULT_MAX_RESULTS;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "stackwise")]
#[command(about = "Find the cheapest way to buy your shopping list with stacked savings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Price items across stores and pick the best stacked deal for each
    Analyze {
        /// Item to price; repeat for a shopping list
        #[arg(long = "item", required = true)]
        items: Vec<String>,

        /// Location to search near, e.g. "Seattle, Washington"
        #[arg(long)]
        location: String,

        /// Results requested from the price provider per item
        #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
        max_results: u32,

        /// Credit card to use instead of the profile's cards; repeatable
        #[arg(long = "card")]
        cards: Vec<String>,
    },
    /// Show the perks and gift-card deal available at one store
    Savings {
        #[arg(long)]
        store: String,

        /// Credit card to use instead of the profile's cards; repeatable
        #[arg(long = "card")]
        cards: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = stackwise_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze {
            items,
            location,
            max_results,
            cards,
        } => commands::run_analyze(&config, items, location, max_results, cards).await,
        Commands::Savings { store, cards } => commands::run_savings(&config, &store, cards).await,
    }
}
