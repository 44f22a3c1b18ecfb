mod browse;
mod filters;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::filters::{FilterArgs, SaleArg};

#[derive(Debug, Parser)]
#[command(name = "storefront-cli")]
#[command(about = "Storefront browse core command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the query parameters a filter set produces, without fetching
    Params {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Fetch products for a filter set from the product API
    Browse {
        #[command(flatten)]
        filters: FilterArgs,
        /// Price the results and rank them by discount
        #[arg(long, value_enum)]
        sale: Option<SaleArg>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Params { filters } => {
            init_tracing("warn")?;
            browse::run_params(&filters)?;
        }
        Commands::Browse {
            filters,
            sale,
            json,
        } => {
            let config = storefront_core::load_app_config_from_env()?;
            init_tracing(&config.log_level)?;
            tracing::debug!(env = %config.env, "configuration loaded");
            browse::run_browse(&config, &filters, sale.map(Into::into), json).await?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `fallback` is used as the filter directive.
fn init_tracing(fallback: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
