use super::latest::latest;
use super::manifest::{self, ManifestEntry};
use super::{dataset_csv, news_csv, price_csv};
use crate::config::StorageEnvConfig;
use crate::domain::artifact::ArtifactKind;
use crate::domain::errors::StorageError;
use crate::domain::features::FeatureDataset;
use crate::domain::market::PricePanel;
use crate::domain::news::LabeledArticle;
use chrono::Local;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A table that can be written as a CSV artifact.
pub trait CsvArtifact {
    /// Serialize into `out`, returning the number of data rows written.
    fn write_csv(&self, out: &mut Vec<u8>) -> Result<usize, csv::Error>;
}

impl CsvArtifact for PricePanel {
    fn write_csv(&self, out: &mut Vec<u8>) -> Result<usize, csv::Error> {
        price_csv::write_panel(self, out)
    }
}

impl CsvArtifact for [LabeledArticle] {
    fn write_csv(&self, out: &mut Vec<u8>) -> Result<usize, csv::Error> {
        news_csv::write_articles(self, out)
    }
}

impl CsvArtifact for FeatureDataset {
    fn write_csv(&self, out: &mut Vec<u8>) -> Result<usize, csv::Error> {
        dataset_csv::write_dataset(self, out)
    }
}

/// Writes timestamped artifacts into the configured data directories.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    storage: StorageEnvConfig,
}

impl ArtifactStore {
    pub fn new(storage: StorageEnvConfig) -> Self {
        Self { storage }
    }

    pub fn directory_for(&self, kind: &ArtifactKind) -> PathBuf {
        match kind {
            ArtifactKind::Prices => self.storage.price_dir(),
            ArtifactKind::News => self.storage.news_dir(),
            ArtifactKind::Dataset { .. } => self.storage.processed_dir(),
        }
    }

    /// Save under `<kind>_<local timestamp>.csv` in the kind's directory.
    pub fn save_timestamped<T: CsvArtifact + ?Sized>(
        &self,
        table: &T,
        kind: &ArtifactKind,
    ) -> Result<PathBuf, StorageError> {
        let filename = kind.filename(Local::now().naive_local());
        self.save(table, kind, &filename, &self.directory_for(kind))
    }

    /// Write `table` to `directory/filename`.
    ///
    /// Creates the directory if needed and never overwrites: an existing
    /// target is `AlreadyExists`. Contents go to a hidden temp file first and
    /// are linked into place, then a manifest entry is appended.
    pub fn save<T: CsvArtifact + ?Sized>(
        &self,
        table: &T,
        kind: &ArtifactKind,
        filename: &str,
        directory: &Path,
    ) -> Result<PathBuf, StorageError> {
        fs::create_dir_all(directory).map_err(|e| StorageError::io(directory, e))?;

        let target = directory.join(filename);
        if target.exists() {
            return Err(StorageError::AlreadyExists(target));
        }

        let mut buffer = Vec::new();
        let rows = table
            .write_csv(&mut buffer)
            .map_err(|e| StorageError::csv(&target, e))?;

        // Atomic write: write to temp file then link into place
        let temp_path = directory.join(format!(".{}.tmp", filename));
        fs::write(&temp_path, &buffer).map_err(|e| StorageError::io(&temp_path, e))?;
        publish_no_clobber(&temp_path, &target)?;

        manifest::append(
            directory,
            &ManifestEntry {
                kind: kind.prefix(),
                file: filename.to_string(),
                sha256: manifest::sha256_hex(&buffer),
                rows,
                written_at: Local::now().naive_local(),
            },
        )?;

        info!("Saved {} rows to {:?}", rows, target);
        Ok(target)
    }
}

/// Move `temp` to `target` unless `target` already exists.
///
/// `fs::rename` replaces an existing file on Unix, so the temp file is
/// hard-linked instead; linking fails when the name is taken. The temp file
/// is removed on every path.
fn publish_no_clobber(temp: &Path, target: &Path) -> Result<(), StorageError> {
    let linked = fs::hard_link(temp, target);
    if let Err(e) = fs::remove_file(temp) {
        warn!("Could not remove temp file {:?}: {}", temp, e);
    }
    match linked {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            Err(StorageError::AlreadyExists(target.to_path_buf()))
        }
        Err(e) => Err(StorageError::io(target, e)),
    }
}

/// Resolves the current artifact of a kind.
#[derive(Debug, Clone)]
pub struct LatestArtifactCache {
    store: ArtifactStore,
}

impl LatestArtifactCache {
    pub fn new(storage: StorageEnvConfig) -> Self {
        Self {
            store: ArtifactStore::new(storage),
        }
    }

    /// Newest manifest entry of `kind` whose file verifies, else the newest
    /// matching file by modification time, else `None`.
    pub fn resolve(&self, kind: &ArtifactKind) -> Result<Option<PathBuf>, StorageError> {
        let directory = self.store.directory_for(kind);
        let prefix = kind.prefix();

        let entries = manifest::read(&directory)?;
        for entry in entries.iter().rev().filter(|e| e.kind == prefix) {
            if manifest::verify(&directory, entry) {
                debug!("Resolved {} from manifest: {}", kind, entry.file);
                return Ok(Some(entry.path_in(&directory)));
            }
            warn!("Manifest entry {} for {} failed verification", entry.file, kind);
        }

        latest(&directory, &kind.pattern())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::DailyBar;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn panel() -> PricePanel {
        let mut bars = HashMap::new();
        bars.insert(
            "AAPL".to_string(),
            vec![DailyBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                open: Some(1.0),
                high: Some(1.0),
                low: Some(1.0),
                close: Some(1.0),
                volume: Some(10.0),
            }],
        );
        PricePanel::from_bars(bars)
    }

    #[test]
    fn test_save_creates_directory_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(StorageEnvConfig::with_data_dir(dir.path()));

        let path = store
            .save_timestamped(&panel(), &ArtifactKind::Prices)
            .unwrap();
        assert!(path.starts_with(dir.path().join("raw").join("sp500")));
        assert!(path.is_file());

        let entries = manifest::read(&store.directory_for(&ArtifactKind::Prices)).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, "sp500_prices_web_pull");
        assert_eq!(entries[0].rows, 1);
    }

    #[test]
    fn test_save_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(StorageEnvConfig::with_data_dir(dir.path()));
        let target_dir = dir.path().join("custom");

        store
            .save(&panel(), &ArtifactKind::Prices, "p.csv", &target_dir)
            .unwrap();
        let err = store
            .save(&panel(), &ArtifactKind::Prices, "p.csv", &target_dir)
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
        assert!(!target_dir.join(".p.csv.tmp").exists());
    }

    #[test]
    fn test_publish_keeps_file_written_after_the_existence_check() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("p.csv");
        let temp = dir.path().join(".p.csv.tmp");
        fs::write(&target, b"other run").unwrap();
        fs::write(&temp, b"this run").unwrap();

        let err = publish_no_clobber(&temp, &target).unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
        assert_eq!(fs::read(&target).unwrap(), b"other run");
        assert!(!temp.exists());
    }

    #[test]
    fn test_publish_moves_temp_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("p.csv");
        let temp = dir.path().join(".p.csv.tmp");
        fs::write(&temp, b"rows").unwrap();

        publish_no_clobber(&temp, &target).unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"rows");
        assert!(!temp.exists());
    }

    #[test]
    fn test_resolve_prefers_verified_manifest_entry() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageEnvConfig::with_data_dir(dir.path());
        let store = ArtifactStore::new(storage.clone());
        let cache = LatestArtifactCache::new(storage);
        let price_dir = store.directory_for(&ArtifactKind::Prices);

        let first = store
            .save(&panel(), &ArtifactKind::Prices, "sp500_prices_web_pull_20240101_000000.csv", &price_dir)
            .unwrap();
        let second = store
            .save(&panel(), &ArtifactKind::Prices, "sp500_prices_web_pull_20240102_000000.csv", &price_dir)
            .unwrap();
        assert_eq!(cache.resolve(&ArtifactKind::Prices).unwrap(), Some(second.clone()));

        // A truncated newest file no longer verifies
        fs::write(&second, b"Ticker,AAPL\n").unwrap();
        assert_eq!(cache.resolve(&ArtifactKind::Prices).unwrap(), Some(first));
    }

    #[test]
    fn test_resolve_falls_back_to_glob() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageEnvConfig::with_data_dir(dir.path());
        let news_dir = storage.news_dir();
        fs::create_dir_all(&news_dir).unwrap();
        let path = news_dir.join("market_news_sentiment_20240101_000000.csv");
        fs::write(&path, "published_at,headline\n").unwrap();

        let cache = LatestArtifactCache::new(storage);
        assert_eq!(cache.resolve(&ArtifactKind::News).unwrap(), Some(path));
        assert_eq!(
            cache
                .resolve(&ArtifactKind::Dataset { ticker: "AAPL".into() })
                .unwrap(),
            None
        );
    }
}
