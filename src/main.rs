//! # LST Insight CLI (`lsti`)
//!
//! Command-line front-end for the liquid staking context pipeline.
//!
//! ## Usage
//!
//! ```bash
//! lsti --config ./config/lsti.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lsti pools` | List allow-listed pools with profile tags |
//! | `lsti protocols` | Aggregate pools into protocols |
//! | `lsti search "<query>"` | Show scored documents for a query |
//! | `lsti context "<query>"` | Print the assembled context for a query |
//! | `lsti prompt "<message>"` | Print the full system prompt for a message |
//! | `lsti serve` | Start the HTTP API |
//!
//! Logs go to stderr and are controlled by `RUST_LOG`
//! (default `lst_insight=info`).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use lst_insight::config::load_or_default;
use lst_insight::prompt::ChatMessage;
use lst_insight::server::run_server;
use lst_insight::service::InsightService;
use lst_insight_core::format::{format_change, format_currency, format_percentage};
use lst_insight_core::profile::profile;

/// LST Insight: retrieval-augmented context for liquid staking yields.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/lsti.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "lsti",
    about = "LST Insight: retrieval-augmented context for liquid staking yields",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/lsti.toml`. Built-in defaults apply when the
    /// file does not exist.
    #[arg(long, global = true, default_value = "./config/lsti.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List allow-listed pools with trend, risk and tags.
    Pools {
        /// Bypass the cache and fetch from the provider.
        #[arg(long)]
        force: bool,

        /// Maximum number of pools to print.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Aggregate pools into protocols, ordered by TVL.
    Protocols {
        /// Bypass the cache and fetch from the provider.
        #[arg(long)]
        force: bool,

        /// Skip fetching pool history.
        #[arg(long)]
        no_history: bool,
    },

    /// Show the scored documents for a query.
    Search {
        query: String,

        /// Number of documents to return.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print the assembled context for a query.
    Context { query: String },

    /// Print the system prompt built for a single user message.
    Prompt { message: String },

    /// Start the HTTP API.
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lst_insight=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let (config, found) = load_or_default(&cli.config)?;
    if !found {
        warn!(path = %cli.config.display(), "config file not found, using defaults");
    }
    let service = Arc::new(InsightService::from_config(config)?);

    match cli.command {
        Commands::Pools { force, limit } => {
            let pools = service.pools(force).await;
            if pools.is_empty() {
                println!("No pools available.");
                return Ok(());
            }
            println!("{} pools ({} shown)\n", pools.len(), limit.min(pools.len()));
            for pool in pools.iter().take(limit) {
                let p = profile(pool);
                println!(
                    "{} | {} | {} | APY {} | TVL {} | risk {} | {}",
                    p.display_name,
                    pool.symbol,
                    pool.chain,
                    format_percentage(Some(pool.apy)),
                    format_currency(pool.tvl_usd),
                    p.risk.as_str(),
                    p.tags.join(", ")
                );
            }
        }
        Commands::Protocols { force, no_history } => {
            let protocols = service.protocols(force, !no_history).await;
            if protocols.is_empty() {
                println!("No protocols available.");
                return Ok(());
            }
            for (i, proto) in protocols.iter().enumerate() {
                println!(
                    "{}. {} | TVL {} | APY {} | 24h {} | 7d {} | {} pools",
                    i + 1,
                    proto.name,
                    format_currency(proto.tvl),
                    format_percentage(Some(proto.apy)),
                    format_change(Some(proto.change_24h)),
                    format_change(Some(proto.change_7d)),
                    proto.pools.len()
                );
            }
        }
        Commands::Search { query, limit } => {
            let k = limit.unwrap_or(service.config().retrieval.top_k);
            let hits = service.search(&query, k).await?;
            if hits.iter().all(|h| h.score == 0) {
                println!("No results.");
                return Ok(());
            }
            for (i, hit) in hits.iter().filter(|h| h.score > 0).enumerate() {
                println!(
                    "{}. [{}] {} ({})",
                    i + 1,
                    hit.score,
                    hit.document.id,
                    hit.document.metadata.kind.as_str()
                );
            }
        }
        Commands::Context { query } => {
            println!("{}", service.context(&query).await);
        }
        Commands::Prompt { message } => {
            let built = service
                .prompt(vec![ChatMessage::user(message)], false)
                .await;
            println!("{}", built.system_prompt);
        }
        Commands::Serve => {
            run_server(service).await?;
        }
    }

    Ok(())
}
