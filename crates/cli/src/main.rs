//! GoMarketplace CLI - Inspect and edit the persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # List line items
//! gm-cli show
//!
//! # Add one unit of a product
//! gm-cli add --id 1234 --title "Camiseta" --image-url https://cdn.example.com/1234.png --price 49.90
//!
//! # Change quantities
//! gm-cli increment 1234
//! gm-cli decrement 1234
//!
//! # Show the floating cart totals, or simulate a tap on it
//! gm-cli summary
//! gm-cli tap
//!
//! # Empty the cart
//! gm-cli clear
//! ```
//!
//! Configuration comes from the environment; see
//! [`go_marketplace_cart::config`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use go_marketplace_cart::CartConfig;
use go_marketplace_core::ProductId;
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "gm-cli")]
#[command(author, version, about = "GoMarketplace cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the line items in the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        #[arg(short, long)]
        id: ProductId,

        /// Product title
        #[arg(short, long)]
        title: String,

        /// Product image URL
        #[arg(long)]
        image_url: String,

        /// Unit price
        #[arg(short, long)]
        price: Decimal,
    },
    /// Add one unit of a product already in the cart
    Increment {
        /// Product ID
        id: ProductId,
    },
    /// Remove one unit of a product
    Decrement {
        /// Product ID
        id: ProductId,
    },
    /// Show the floating cart's item count and total
    Summary,
    /// Tap the floating cart (opens the cart screen when not empty)
    Tap,
    /// Remove every line item
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::debug!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration errors are reported after tracing is up.
    let config = CartConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "go_marketplace_cart=info,gm_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &CartConfig) -> Result<(), Box<dyn std::error::Error>> {
    let provider = commands::cart::open(config).await;

    match cli.command {
        Commands::Show => commands::cart::show(&provider, config.currency),
        Commands::Add {
            id,
            title,
            image_url,
            price,
        } => commands::cart::add(&provider, id, title, image_url, price).await?,
        Commands::Increment { id } => commands::cart::increment(&provider, &id).await?,
        Commands::Decrement { id } => commands::cart::decrement(&provider, &id).await?,
        Commands::Summary => {
            commands::cart::summary(&provider, config.currency)?;
        }
        Commands::Tap => {
            commands::cart::tap(&provider, config.currency)?;
        }
        Commands::Clear => provider.clear().await?,
    }
    Ok(())
}
