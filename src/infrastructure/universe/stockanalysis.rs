use super::{cell_text, fetch_html};
use crate::domain::errors::IngestError;
use crate::domain::ports::SymbolListSource;
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::info;

const ORIGIN: &str = "stockanalysis";

static TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("static selector"));
static HEADER_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("thead th").expect("static selector"));
static BODY_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody tr").expect("static selector"));
static DATA_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("static selector"));

/// S&P 500 membership scraped from StockAnalysis' list page.
pub struct StockAnalysisSymbolSource {
    client: ClientWithMiddleware,
    url: String,
}

impl StockAnalysisSymbolSource {
    pub fn new(client: ClientWithMiddleware, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

/// Extract raw symbols from the first table of the page.
///
/// Uses the column headed "Symbol" when present, else the first column.
pub fn parse_symbol_table(html: &str) -> Result<Vec<String>, IngestError> {
    let document = Html::parse_document(html);

    let table = document
        .select(&TABLE)
        .next()
        .ok_or_else(|| IngestError::parse_failure(ORIGIN, "no table found on page"))?;

    let symbol_col = table
        .select(&HEADER_CELL)
        .position(|th| cell_text(th).eq_ignore_ascii_case("symbol"))
        .unwrap_or(0);

    let symbols = table
        .select(&BODY_ROW)
        .filter_map(|row| row.select(&DATA_CELL).nth(symbol_col))
        .map(cell_text)
        .filter(|s| !s.is_empty())
        .collect();

    Ok(symbols)
}

#[async_trait]
impl SymbolListSource for StockAnalysisSymbolSource {
    fn name(&self) -> &str {
        ORIGIN
    }

    async fn fetch_symbols(&self) -> Result<Vec<String>, IngestError> {
        info!("Fetching S&P 500 tickers from StockAnalysis.com...");
        let html = fetch_html(&self.client, &self.url, ORIGIN).await?;
        let symbols = parse_symbol_table(&html)?;
        info!("Fetched {} tickers from StockAnalysis.com", symbols.len());
        Ok(symbols)
    }
}
