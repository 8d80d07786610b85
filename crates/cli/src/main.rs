use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use forgecast_core::ProductId;
use forgecast_forecasting::{
    ForecastConfig, ForecastEngine, ForecastResult, ForecastValidator, PerformanceBand, RiskLevel,
    StockoutDays, ValidationResult,
};
use forgecast_infra::{CatalogFixture, InMemoryCatalog};

#[derive(Parser)]
#[command(name = "forgecast", about = "Inventory demand forecasting", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast demand and restocking thresholds for one product.
    Forecast(ForecastArgs),
    /// Score forecast accuracy on the trailing 20% of a product's history.
    Validate(ValidateArgs),
    /// List products at or below their reorder point.
    Restock(RestockArgs),
}

#[derive(Args)]
struct DataArgs {
    #[arg(long, help = "Path to a JSON catalog fixture")]
    data: PathBuf,
}

#[derive(Args)]
struct ForecastArgs {
    #[command(flatten)]
    data: DataArgs,
    #[arg(long, help = "Product id (UUID)")]
    product: ProductId,
    #[arg(long, help = "Forecast horizon in days; defaults to FORGECAST_DEFAULT_HORIZON_DAYS")]
    horizon: Option<u32>,
    #[arg(long, help = "Use the trend/season/price model when history allows")]
    multi_feature: bool,
}

#[derive(Args)]
struct ValidateArgs {
    #[command(flatten)]
    data: DataArgs,
    #[arg(long, help = "Product id (UUID)")]
    product: ProductId,
    #[arg(long, default_value_t = 7, help = "Requested holdout window in days")]
    window: u32,
}

#[derive(Args)]
struct RestockArgs {
    #[command(flatten)]
    data: DataArgs,
    #[arg(long, help = "Forecast horizon in days; defaults to FORGECAST_DEFAULT_HORIZON_DAYS")]
    horizon: Option<u32>,
}

/// Forecast plus the values derived from it.
#[derive(Serialize)]
struct ForecastView {
    #[serde(flatten)]
    forecast: ForecastResult,
    restock_needed: bool,
    recommended_order_quantity: f64,
    risk_level: RiskLevel,
    stockout_days: StockoutDays,
}

impl From<ForecastResult> for ForecastView {
    fn from(forecast: ForecastResult) -> Self {
        Self {
            restock_needed: forecast.restock_needed(),
            recommended_order_quantity: forecast.recommended_order_quantity(),
            risk_level: forecast.risk_level(),
            stockout_days: forecast.stockout_days(),
            forecast,
        }
    }
}

#[derive(Serialize)]
struct ValidationView {
    #[serde(flatten)]
    result: ValidationResult,
    performance: PerformanceBand,
}

fn main() -> Result<()> {
    forgecast_observability::init();

    let cli = Cli::parse();
    let config = ForecastConfig::from_env().context("invalid forecast configuration")?;

    match cli.command {
        Commands::Forecast(args) => {
            let engine = engine(&args.data, config)?;
            let horizon = args.horizon.unwrap_or(engine.config().default_horizon_days);
            let result = if args.multi_feature {
                engine.forecast_multi_feature(args.product, horizon)
            } else {
                engine.forecast_simple(args.product, horizon)
            };
            let forecast =
                result.with_context(|| format!("forecast failed for product {}", args.product))?;
            print_json(&ForecastView::from(forecast))?;
        }
        Commands::Validate(args) => {
            let engine = engine(&args.data, config)?;
            let result = ForecastValidator::new(&engine)
                .validate(args.product, args.window)
                .with_context(|| format!("validation failed for product {}", args.product))?;
            let performance = result.performance();
            print_json(&ValidationView { result, performance })?;
        }
        Commands::Restock(args) => {
            let engine = engine(&args.data, config)?;
            let horizon = args.horizon.unwrap_or(engine.config().default_horizon_days);
            let recommendations: Vec<ForecastView> = engine
                .restock_recommendations(horizon)
                .context("restock recommendations failed")?
                .into_iter()
                .map(ForecastView::from)
                .collect();
            print_json(&recommendations)?;
        }
    }

    Ok(())
}

fn engine(data: &DataArgs, config: ForecastConfig) -> Result<ForecastEngine<InMemoryCatalog>> {
    let catalog = CatalogFixture::from_path(&data.data)
        .and_then(CatalogFixture::into_catalog)
        .with_context(|| format!("failed to load catalog from {}", data.data.display()))?;
    tracing::debug!(path = %data.data.display(), "catalog loaded");
    Ok(ForecastEngine::new(catalog).with_config(config))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{out}");
    Ok(())
}
