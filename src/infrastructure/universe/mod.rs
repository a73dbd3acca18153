//! Scraped sources for the S&P 500 universe.
//!
//! - `stockanalysis`: membership list (authoritative)
//! - `wikipedia`: GICS sector and founding year (enrichment only)

pub mod stockanalysis;
pub mod wikipedia;

pub use stockanalysis::StockAnalysisSymbolSource;
pub use wikipedia::WikipediaMetadataSource;

use crate::domain::errors::IngestError;
use reqwest_middleware::ClientWithMiddleware;
use scraper::ElementRef;
use tracing::debug;

/// GET a page and return its body, mapping transport and status failures to
/// `SourceUnavailable`.
pub(crate) async fn fetch_html(
    client: &ClientWithMiddleware,
    url: &str,
    origin: &str,
) -> Result<String, IngestError> {
    debug!("Fetching {} page: {}", origin, url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| IngestError::source_unavailable(origin, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(IngestError::source_unavailable(
            origin,
            format!("HTTP {}", status),
        ));
    }

    response
        .text()
        .await
        .map_err(|e| IngestError::source_unavailable(origin, e))
}

/// Visible text of a table cell with whitespace collapsed.
pub(crate) fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .flat_map(|chunk| chunk.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}
