//! Quanta - market data ingestion and feature alignment
//!
//! Thin command-line caller of the pipeline: it wires configuration into the
//! components and prints what they return.
//!
//! # Usage
//! ```sh
//! quanta universe
//! quanta prices --tickers AAPL,MSFT --persist
//! quanta news --category general --persist
//! quanta dataset AAPL --lookback 365
//! quanta dataset-all --persist
//! quanta headline "War fears lift defense names"
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use quanta::application::PipelineBootstrap;
use quanta::config::Config;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "quanta", version, about = "Market data ingestion and feature alignment")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the S&P 500 universe with sector and founding metadata
    Universe,
    /// Download daily prices into a wide panel
    Prices {
        /// Comma-separated tickers; defaults to the whole universe
        #[arg(long, value_delimiter = ',')]
        tickers: Option<Vec<String>>,
        /// First date (YYYY-MM-DD); defaults to PRICE_START_DATE
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Save the panel under data/raw/sp500
        #[arg(long)]
        persist: bool,
    },
    /// Fetch a news category and label each headline
    News {
        #[arg(long)]
        category: Option<String>,
        /// Save the labeled articles under data/raw/news
        #[arg(long)]
        persist: bool,
    },
    /// Align the latest price and news artifacts into training rows for one ticker
    Dataset {
        ticker: String,
        #[arg(long)]
        lookback: Option<i64>,
        /// Assign sectors from a freshly resolved universe
        #[arg(long)]
        resolve_universe: bool,
        #[arg(long)]
        persist: bool,
    },
    /// Build datasets for every ticker in the latest price artifact
    DatasetAll {
        #[arg(long)]
        lookback: Option<i64>,
        #[arg(long)]
        resolve_universe: bool,
        #[arg(long)]
        persist: bool,
    },
    /// Show the sentiment and sector signals of a headline
    Headline { text: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    let persist_default = config.pipeline.persist_artifacts;
    let pipeline = PipelineBootstrap::init(config)?;

    match cli.command {
        Command::Universe => {
            let universe = pipeline.universe.resolve().await?;
            if let Some(e) = &universe.enrichment_error {
                warn!("Metadata unavailable, sectors are unknown: {}", e);
            }
            println!("symbol,sector,founded_year");
            for record in &universe.records {
                println!("{},{},{}", record.symbol, record.sector, record.founded_year);
            }
        }
        Command::Prices {
            tickers,
            start,
            persist,
        } => {
            let start = start.unwrap_or(pipeline.config.pipeline.price_start_date);
            let snapshot = pipeline
                .snapshots
                .refresh_prices(tickers.as_deref(), start, persist || persist_default)
                .await?;
            println!(
                "{} dates x {} columns ({} tickers)",
                snapshot.panel.dates().len(),
                snapshot.panel.column_count(),
                snapshot.panel.tickers().len()
            );
            if let Some(path) = snapshot.artifact {
                println!("saved {}", path.display());
            }
        }
        Command::News { category, persist } => {
            let category =
                category.unwrap_or_else(|| pipeline.config.pipeline.news_category.clone());
            let snapshot = pipeline
                .snapshots
                .refresh_news(&category, persist || persist_default)
                .await?;
            for labeled in &snapshot.articles {
                println!(
                    "{} [{}] {}",
                    labeled.article.published_at, labeled.sentiment, labeled.article.headline
                );
            }
            if let Some(path) = snapshot.artifact {
                println!("saved {}", path.display());
            }
        }
        Command::Dataset {
            ticker,
            lookback,
            resolve_universe,
            persist,
        } => {
            let mapper = if resolve_universe {
                pipeline.mapper_for(&pipeline.universe.resolve().await?)
            } else {
                pipeline.mapper()
            };
            let lookback = lookback.unwrap_or(pipeline.config.pipeline.lookback_days);
            let aligner = pipeline.aligner(mapper, persist || persist_default);

            match aligner.build(&ticker, lookback)? {
                Some(dataset) => {
                    info!("{} rows for {}", dataset.len(), dataset.ticker);
                    println!("date,daily_sentiment,Close_Price_T,Target_Pct_Change,Sector_Name");
                    for row in &dataset.rows {
                        println!(
                            "{},{:.4},{:.2},{:.6},{}",
                            row.date,
                            row.daily_sentiment,
                            row.close_price_t,
                            row.target_pct_change,
                            row.sector_name
                        );
                    }
                    if let Some(path) = dataset.artifact {
                        println!("saved {}", path.display());
                    }
                }
                None => println!("dataset unavailable for {}", ticker),
            }
        }
        Command::DatasetAll {
            lookback,
            resolve_universe,
            persist,
        } => {
            let mapper = if resolve_universe {
                pipeline.mapper_for(&pipeline.universe.resolve().await?)
            } else {
                pipeline.mapper()
            };
            let lookback = lookback.unwrap_or(pipeline.config.pipeline.lookback_days);
            let summary = pipeline
                .aligner(mapper, persist || persist_default)
                .build_all(lookback)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Headline { text } => {
            let features = pipeline.mapper().features(&text);
            println!("{}", serde_json::to_string_pretty(&features)?);
        }
    }

    Ok(())
}
