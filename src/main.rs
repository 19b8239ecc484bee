//! Astral command line
//!
//! Evaluates a saved cart against the bundle promotions, either as the cart summary
//! the shopper sees or as the payload sent to the payment gateway.

use std::{fs, io, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use astral::{
    cart::{Cart, RawCartItem},
    catalog::Catalog,
    checkout::build_checkout_payload,
    config::PromotionConfig,
    preferences::{JsonFilePreferenceStore, PreferenceStore},
    receipt::Receipt,
    selection::{apply_promotions, evaluate_bundle_discount},
};

/// Log output format.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Bundle promotion engine for the zodiac storefront
#[derive(Debug, Parser)]
#[command(name = "astral", version)]
struct Cli {
    /// Log level used when `RUST_LOG` is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the cart summary with the headline bundle and checkout totals
    Summary(SummaryArgs),

    /// Print the payment gateway payload as JSON
    Checkout(CartArgs),
}

#[derive(Debug, Args)]
struct CartArgs {
    /// Cart JSON file
    #[arg(short, long)]
    cart: PathBuf,

    /// Catalog JSON file; cart entries then only need a SKU and a quantity
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Promotion configuration YAML file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct SummaryArgs {
    #[command(flatten)]
    cart: CartArgs,

    /// File holding the sticky bundle preference
    #[arg(short, long)]
    preferences: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_format, &cli.log_level)?;

    match cli.command {
        Command::Summary(args) => summary(&args),
        Command::Checkout(args) => checkout(&args),
    }
}

fn init_logging(format: LogFormat, level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let result = match format {
        LogFormat::Compact => tracing_subscriber::fmt()
            .compact()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init(),
    };

    result.map_err(|err| anyhow!(err))
}

fn load_config(path: Option<&PathBuf>) -> Result<PromotionConfig> {
    match path {
        Some(path) => PromotionConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(PromotionConfig::default()),
    }
}

fn load_cart(args: &CartArgs, config: &PromotionConfig) -> Result<Cart> {
    let contents = fs::read_to_string(&args.cart)
        .with_context(|| format!("reading cart {}", args.cart.display()))?;

    let mut items: Vec<RawCartItem> = serde_json::from_str(&contents)?;

    if let Some(catalog_path) = &args.catalog {
        let catalog = Catalog::from_json(
            &fs::read_to_string(catalog_path)
                .with_context(|| format!("reading catalog {}", catalog_path.display()))?,
        )
        .with_context(|| format!("loading catalog {}", catalog_path.display()))?;

        items = items
            .iter()
            .map(|entry| catalog.resolve(entry))
            .collect::<Result<_, _>>()?;
    }

    let cart = Cart::from_raw(&items, config.currency);

    info!(
        lines = cart.len(),
        units = cart.total_quantity(),
        "cart loaded"
    );

    Ok(cart)
}

fn summary(args: &SummaryArgs) -> Result<()> {
    let config = load_config(args.cart.config.as_ref())?;
    let cart = load_cart(&args.cart, &config)?;

    let mut store = args.preferences.as_ref().map(JsonFilePreferenceStore::new);

    let previous = match &store {
        Some(store) => store.load()?,
        None => None,
    };

    let evaluation = evaluate_bundle_discount(&cart, &config.promotions, previous.as_ref());

    if let Some(store) = store.as_mut() {
        store.save(evaluation.preference.as_ref())?;
    }

    let applied = apply_promotions(&cart, &config.promotions);

    Receipt::new(&cart, evaluation, applied).write_to(io::stdout().lock())?;

    Ok(())
}

fn checkout(args: &CartArgs) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    let cart = load_cart(args, &config)?;

    let applied = apply_promotions(&cart, &config.promotions);
    let payload = build_checkout_payload(
        &applied.items,
        applied.total_discount_minor,
        &config.checkout_options(),
    )?;

    info!(
        discount_minor = payload.discount_minor,
        charged_total_minor = payload.charged_total_minor,
        "checkout payload ready"
    );

    serde_json::to_writer_pretty(io::stdout().lock(), &payload)?;

    Ok(())
}
