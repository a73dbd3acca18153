use super::{cell_text, fetch_html};
use crate::domain::errors::IngestError;
use crate::domain::ports::CompanyMetadataSource;
use crate::domain::universe::{CompanyMetadata, first_year, normalize_symbol, sector_key};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{info, warn};

const ORIGIN: &str = "wikipedia";

static CONSTITUENTS_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table#constituents").expect("static selector"));
static SORTABLE_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.wikitable.sortable").expect("static selector"));
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("static selector"));
static HEADER_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("static selector"));
static DATA_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("static selector"));

/// Fixed column positions of the constituents table.
///
/// Each position is paired with a header fragment that must appear in that
/// column's header cell; a mismatch means the page layout changed.
#[derive(Debug, Clone)]
pub struct ConstituentsLayout {
    pub symbol: (usize, &'static str),
    pub sector: (usize, &'static str),
    pub founded: (usize, &'static str),
}

impl Default for ConstituentsLayout {
    fn default() -> Self {
        Self {
            symbol: (0, "symbol"),
            sector: (2, "sector"),
            founded: (7, "founded"),
        }
    }
}

impl ConstituentsLayout {
    fn min_cells(&self) -> usize {
        self.symbol.0.max(self.sector.0).max(self.founded.0) + 1
    }

    fn check_header(&self, header: &[String]) -> Result<(), IngestError> {
        for (index, expected) in [self.symbol, self.sector, self.founded] {
            let found = header.get(index).map(|h| h.to_lowercase());
            match found {
                Some(h) if h.contains(expected) => {}
                other => {
                    return Err(IngestError::parse_failure(
                        ORIGIN,
                        format!(
                            "column {} expected '{}' header, found {:?}",
                            index, expected, other
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Sector and founding metadata scraped from Wikipedia's S&P 500 list.
pub struct WikipediaMetadataSource {
    client: ClientWithMiddleware,
    url: String,
    layout: ConstituentsLayout,
}

impl WikipediaMetadataSource {
    pub fn new(client: ClientWithMiddleware, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            layout: ConstituentsLayout::default(),
        }
    }
}

fn find_table(document: &Html) -> Option<ElementRef<'_>> {
    document
        .select(&CONSTITUENTS_TABLE)
        .next()
        .or_else(|| document.select(&SORTABLE_TABLE).next())
}

/// Parse the constituents table into `normalized symbol → metadata`.
///
/// Rows with too few cells are skipped. A missing table, a header that no
/// longer matches the layout, or a table with no usable rows is a
/// `ParseFailure`.
pub fn parse_constituents(
    html: &str,
    layout: &ConstituentsLayout,
) -> Result<HashMap<String, CompanyMetadata>, IngestError> {
    let document = Html::parse_document(html);

    let table = find_table(&document)
        .ok_or_else(|| IngestError::parse_failure(ORIGIN, "could not find S&P 500 table"))?;

    let mut rows = table.select(&ROW);

    let header: Vec<String> = rows
        .next()
        .map(|tr| tr.select(&HEADER_CELL).map(cell_text).collect())
        .unwrap_or_default();
    layout.check_header(&header)?;

    let min_cells = layout.min_cells();
    let mut metadata = HashMap::new();
    let mut skipped = 0usize;

    for row in rows {
        let cells: Vec<String> = row.select(&DATA_CELL).map(cell_text).collect();
        if cells.len() < min_cells {
            skipped += 1;
            continue;
        }

        let symbol = normalize_symbol(&cells[layout.symbol.0]);
        if symbol.is_empty() {
            skipped += 1;
            continue;
        }

        metadata.insert(
            symbol,
            CompanyMetadata {
                sector: sector_key(&cells[layout.sector.0]),
                founded_year: first_year(&cells[layout.founded.0]),
            },
        );
    }

    if skipped > 0 {
        warn!("Skipped {} constituent rows with missing columns", skipped);
    }

    if metadata.is_empty() {
        return Err(IngestError::parse_failure(
            ORIGIN,
            format!("table has no rows with at least {} cells", min_cells),
        ));
    }

    Ok(metadata)
}

#[async_trait]
impl CompanyMetadataSource for WikipediaMetadataSource {
    fn name(&self) -> &str {
        ORIGIN
    }

    async fn fetch_metadata(&self) -> Result<HashMap<String, CompanyMetadata>, IngestError> {
        info!("Fetching founding years and sectors from Wikipedia...");
        let html = fetch_html(&self.client, &self.url, ORIGIN).await?;
        let metadata = parse_constituents(&html, &self.layout)?;
        info!("Parsed metadata for {} constituents", metadata.len());
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "<tr><th>Symbol</th><th>Security</th><th>GICS Sector</th>\
        <th>GICS Sub-Industry</th><th>Headquarters Location</th><th>Date added</th>\
        <th>CIK</th><th>Founded</th></tr>";

    fn page(rows: &str) -> String {
        format!(
            r#"<html><body><table class="wikitable sortable" id="constituents">
            <tbody>{}{}</tbody></table></body></html>"#,
            HEADER, rows
        )
    }

    #[test]
    fn test_parse_constituents() {
        let html = page(
            "<tr><td><a>MMM</a></td><td>3M</td><td>Industrials</td><td>Conglomerates</td>\
             <td>Saint Paul</td><td>1957-03-04</td><td>0000066740</td><td>1902</td></tr>\
             <tr><td>BRK.B</td><td>Berkshire</td><td>Financials</td><td>Insurance</td>\
             <td>Omaha</td><td>2010-02-16</td><td>0001067983</td><td>1839</td></tr>\
             <tr><td>AAPL</td><td>Apple</td><td>Information Technology</td><td>Hardware</td>\
             <td>Cupertino</td><td>1982-11-30</td><td>0000320193</td><td>unknown</td></tr>\
             <tr><td>SHORT</td><td>Too few cells</td></tr>",
        );

        let meta = parse_constituents(&html, &ConstituentsLayout::default()).unwrap();
        assert_eq!(meta.len(), 3);
        assert_eq!(meta["MMM"].sector, "industrials");
        assert_eq!(meta["MMM"].founded_year, "1902");
        assert_eq!(meta["BRK-B"].sector, "financials");
        assert_eq!(meta["AAPL"].sector, "information");
        assert_eq!(meta["AAPL"].founded_year, "N/A");
        assert!(!meta.contains_key("SHORT"));
    }

    #[test]
    fn test_missing_table_is_parse_failure() {
        let err = parse_constituents("<html><body></body></html>", &ConstituentsLayout::default())
            .unwrap_err();
        assert!(matches!(err, IngestError::ParseFailure { .. }));
    }

    #[test]
    fn test_header_drift_is_parse_failure() {
        let html = r#"<table id="constituents"><tbody>
            <tr><th>Symbol</th><th>Security</th><th>Headquarters</th><th>GICS Sector</th>
                <th>Sub</th><th>Added</th><th>CIK</th><th>Founded</th></tr>
            <tr><td>MMM</td><td>3M</td><td>Saint Paul</td><td>Industrials</td>
                <td>x</td><td>x</td><td>x</td><td>1902</td></tr>
            </tbody></table>"#;
        let err = parse_constituents(html, &ConstituentsLayout::default()).unwrap_err();
        assert!(matches!(err, IngestError::ParseFailure { .. }));
    }

    #[test]
    fn test_no_usable_rows_is_parse_failure() {
        let html = page("<tr><td>MMM</td><td>3M</td></tr>");
        let err = parse_constituents(&html, &ConstituentsLayout::default()).unwrap_err();
        assert!(matches!(err, IngestError::ParseFailure { .. }));
    }
}
