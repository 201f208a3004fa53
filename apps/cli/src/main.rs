//! # gomarket-cli
//!
//! Command-line host for the GoMarket cart. Each invocation mounts the cart
//! from the local store, runs one command, and waits for the write to land.
//!
//! ```text
//! gomarket-cli show
//! gomarket-cli add --id p1 --title Shirt --price 10
//! gomarket-cli inc p1
//! gomarket-cli dec p1
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gomarket_cart::{use_cart, AppContext, CartConfig, CartHandle, CartProvider, LoadOutcome};
use gomarket_core::Product;
use gomarket_db::{Database, DbConfig, KvStore};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "gomarket: shopping cart for the GoMarket storefront",
    long_about = None
)]
struct Cli {
    /// Path to cart.toml (defaults to the platform config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the config.
    #[arg(long, global = true, env = "GOMARKET_DB_PATH")]
    db: Option<PathBuf>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the cart and its totals.
    Show,

    /// Add one unit of a product.
    Add {
        /// Product id.
        #[arg(long)]
        id: String,

        /// Display title.
        #[arg(long)]
        title: String,

        /// Image URL.
        #[arg(long, default_value = "")]
        image_url: String,

        /// Unit price.
        #[arg(long)]
        price: f64,
    },

    /// Add one unit to a cart entry.
    Inc {
        /// Product id.
        id: String,
    },

    /// Remove one unit from a cart entry.
    Dec {
        /// Product id.
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let mut config = CartConfig::load(cli.config.clone()).context("failed to load cart config")?;
    if let Some(db) = cli.db.clone() {
        config.storage.path = Some(db);
    }

    let db_path = config.database_path()?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .context("failed to open cart database")?;
    let store: Arc<dyn KvStore> = Arc::new(db.kv());

    let mut ctx = AppContext::new();
    CartProvider::provide(&mut ctx, CartProvider::mount(store, &config));
    let cart = use_cart(&ctx)?;

    match cart.ready().await {
        Ok(LoadOutcome::Reset { backup_key }) => {
            warn!(%backup_key, "Stored cart was unreadable and has been reset");
        }
        Ok(outcome) => info!(?outcome, "Cart ready"),
        Err(e) => warn!(error = %e, "Cart load failed, starting empty"),
    }

    let result = run(&cli, &cart).await;

    cart.shutdown().await.context("failed to persist cart")?;
    db.close().await;

    result
}

async fn run(cli: &Cli, cart: &CartHandle) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Show => {}
        Commands::Add {
            id,
            title,
            image_url,
            price,
        } => {
            let product = Product::new(id.as_str(), title.as_str(), image_url.as_str(), *price);
            cart.add_to_cart(&product).await?;
        }
        Commands::Inc { id } => cart.increment(id).await?,
        Commands::Dec { id } => cart.decrement(id).await?,
    }

    print_cart(cart, cli.json)
}

fn print_cart(cart: &CartHandle, as_json: bool) -> anyhow::Result<()> {
    let products = cart.products();
    let summary = cart.summary();

    if as_json {
        let payload = json!({ "products": products, "summary": summary });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if products.is_empty() {
        println!("Cart is empty");
        return Ok(());
    }

    for item in &products {
        println!(
            "{:<12} {:<24} x{:<4} {:>10.2}",
            item.id,
            item.title,
            item.quantity,
            item.line_total()
        );
    }
    println!(
        "{} item(s), {} unit(s), total {:.2}",
        summary.item_count, summary.total_quantity, summary.total_price
    );

    Ok(())
}

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - ERROR: Unrecoverable errors
/// - WARN: Recoverable issues (failed writes, reset carts)
/// - INFO: Lifecycle events (mount, load, shutdown)
/// - DEBUG: Per-mutation and per-write details
///
/// Set `RUST_LOG` to override, e.g. `RUST_LOG=gomarket_cart=trace`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gomarket=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
