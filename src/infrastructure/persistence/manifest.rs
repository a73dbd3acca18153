//! Append-only artifact manifest.
//!
//! Each artifact directory carries a `manifest.jsonl`: one JSON object per
//! saved artifact, in write order, with the SHA-256 of the file contents.
//! Readers use it to find the newest complete artifact of a kind without
//! trusting file modification times.

use crate::domain::errors::StorageError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const MANIFEST_FILE: &str = "manifest.jsonl";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Artifact kind prefix, e.g. `sp500_prices_web_pull` or `ml_data_AAPL`.
    pub kind: String,
    /// File name relative to the manifest's directory.
    pub file: String,
    pub sha256: String,
    pub rows: usize,
    pub written_at: NaiveDateTime,
}

impl ManifestEntry {
    pub fn path_in(&self, directory: &Path) -> PathBuf {
        directory.join(&self.file)
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

pub fn append(directory: &Path, entry: &ManifestEntry) -> Result<(), StorageError> {
    let path = directory.join(MANIFEST_FILE);
    let mut line = serde_json::to_string(entry)
        .map_err(|e| StorageError::malformed(&path, e))?;
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| StorageError::io(&path, e))?;
    file.write_all(line.as_bytes())
        .map_err(|e| StorageError::io(&path, e))
}

/// All entries in write order. A missing manifest is empty; lines that do not
/// parse (e.g. a torn final line) are skipped.
pub fn read(directory: &Path) -> Result<Vec<ManifestEntry>, StorageError> {
    let path = directory.join(MANIFEST_FILE);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StorageError::io(&path, e)),
    };

    let mut entries = Vec::new();
    for (n, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ManifestEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!("Ignoring manifest line {} in {:?}: {}", n + 1, path, e),
        }
    }
    Ok(entries)
}

/// True when the entry's file exists and still hashes to the recorded digest.
pub fn verify(directory: &Path, entry: &ManifestEntry) -> bool {
    match fs::read(entry.path_in(directory)) {
        Ok(bytes) => sha256_hex(&bytes) == entry.sha256,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(file: &str, content: &[u8]) -> ManifestEntry {
        ManifestEntry {
            kind: "market_news_sentiment".to_string(),
            file: file.to_string(),
            sha256: sha256_hex(content),
            rows: 1,
            written_at: NaiveDate::from_ymd_opt(2024, 1, 3)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_sha256_known_value() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_append_read_and_verify() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), b"x\n").unwrap();
        let a = entry("a.csv", b"x\n");
        let b = entry("b.csv", b"missing");
        append(dir.path(), &a).unwrap();
        append(dir.path(), &b).unwrap();

        let entries = read(dir.path()).unwrap();
        assert_eq!(entries, vec![a.clone(), b.clone()]);
        assert!(verify(dir.path(), &a));
        assert!(!verify(dir.path(), &b));

        fs::write(dir.path().join("a.csv"), b"tampered\n").unwrap();
        assert!(!verify(dir.path(), &a));
    }

    #[test]
    fn test_torn_line_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        append(dir.path(), &entry("a.csv", b"")).unwrap();
        let mut file = OpenOptions::new()
            .append(true)
            .open(dir.path().join(MANIFEST_FILE))
            .unwrap();
        file.write_all(b"{\"kind\":\"mark").unwrap();

        assert_eq!(read(dir.path()).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_manifest_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read(dir.path()).unwrap().is_empty());
    }
}
