use crate::domain::errors::StorageError;
use crate::domain::news::{LabeledArticle, NewsArticle};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

pub const NEWS_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const ALT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Serialize)]
struct NewsRow<'a> {
    published_at: String,
    headline: &'a str,
    summary: &'a str,
    source: &'a str,
    sentiment: String,
}

pub(crate) fn write_articles(
    articles: &[LabeledArticle],
    out: &mut Vec<u8>,
) -> Result<usize, csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for labeled in articles {
        let a = &labeled.article;
        writer.serialize(NewsRow {
            published_at: a.published_at.format(NEWS_TIMESTAMP_FORMAT).to_string(),
            headline: &a.headline,
            summary: &a.summary,
            source: &a.source,
            sentiment: labeled.sentiment.to_string(),
        })?;
    }
    // An empty table still gets its header
    if articles.is_empty() {
        writer.write_record(["published_at", "headline", "summary", "source", "sentiment"])?;
    }
    writer.flush()?;
    Ok(articles.len())
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, NEWS_TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, ALT_TIMESTAMP_FORMAT))
        .ok()
}

/// Read a news artifact back as articles.
///
/// `published_at` and `headline` are required columns; their absence is a
/// layout change and reported as `Malformed`. Rows whose timestamp does not
/// parse are dropped.
pub fn read_articles(path: &Path) -> Result<Vec<NewsArticle>, StorageError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| StorageError::csv(path, e))?;
    let headers = reader.headers().map_err(|e| StorageError::csv(path, e))?.clone();

    let position = |name: &str| headers.iter().position(|h| h.trim() == name);
    let (Some(ts_idx), Some(headline_idx)) = (position("published_at"), position("headline")) else {
        return Err(StorageError::malformed(
            path,
            format!("expected published_at and headline columns, found {:?}", headers),
        ));
    };
    let summary_idx = position("summary");
    let source_idx = position("source");

    let mut articles = Vec::new();
    let mut dropped = 0usize;

    for record in reader.records() {
        let record = record.map_err(|e| StorageError::csv(path, e))?;
        let Some(published_at) = record.get(ts_idx).and_then(parse_timestamp) else {
            dropped += 1;
            continue;
        };
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .unwrap_or_default()
                .to_string()
        };
        articles.push(NewsArticle {
            headline: cell(Some(headline_idx)),
            summary: cell(summary_idx),
            source: cell(source_idx),
            published_at,
        });
    }

    if dropped > 0 {
        warn!("Dropped {} news rows with unparseable timestamps in {:?}", dropped, path);
    }

    Ok(articles)
}
