use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while pulling data from external sources.
///
/// The variants separate "nothing is available" (`NoData`, `ArtifactNotFound`)
/// from "something upstream is broken" (`SourceUnavailable`, `ParseFailure`),
/// so schema drift never looks like an empty but valid result.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum IngestError {
    #[error("Source {origin} unavailable: {reason}")]
    SourceUnavailable { origin: String, reason: String },

    #[error("Failed to parse {origin}: {reason}")]
    ParseFailure { origin: String, reason: String },

    #[error("No usable data: {reason}")]
    NoData { reason: String },

    #[error("Provider {provider} not configured: {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    #[error("No artifact matching '{pattern}' in {directory:?}")]
    ArtifactNotFound { directory: PathBuf, pattern: String },
}

impl IngestError {
    pub fn source_unavailable(origin: &str, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            origin: origin.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn parse_failure(origin: &str, reason: impl ToString) -> Self {
        Self::ParseFailure {
            origin: origin.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn no_data(reason: impl ToString) -> Self {
        Self::NoData {
            reason: reason.to_string(),
        }
    }

    /// True when the failure points at a broken upstream rather than an empty one.
    pub fn is_upstream_fault(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. } | Self::ParseFailure { .. }
        )
    }
}

/// Errors related to reading and writing artifacts on disk
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Artifact already exists: {0:?}")]
    AlreadyExists(PathBuf),

    #[error("Malformed artifact {path:?}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors that make a training dataset impossible to build (as opposed to
/// merely unavailable, which is reported as `Ok(None)`).
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Artifact {artifact:?} does not match the expected layout: {reason}")]
    Schema { artifact: PathBuf, reason: String },
}

/// Errors from a fetch-then-maybe-persist refresh.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_error_formatting() {
        let err = IngestError::source_unavailable("stockanalysis", "HTTP 503");
        let msg = err.to_string();
        assert!(msg.contains("stockanalysis"));
        assert!(msg.contains("HTTP 503"));
    }

    #[test]
    fn test_upstream_fault_classification() {
        assert!(IngestError::parse_failure("wikipedia", "no table").is_upstream_fault());
        assert!(IngestError::source_unavailable("yahoo", "timeout").is_upstream_fault());
        assert!(!IngestError::no_data("empty panel").is_upstream_fault());
        assert!(
            !IngestError::ProviderUnavailable {
                provider: "finnhub".into(),
                reason: "missing key".into(),
            }
            .is_upstream_fault()
        );
    }

    #[test]
    fn test_storage_error_formatting() {
        let err = StorageError::malformed("data/raw/x.csv", "missing header");
        let msg = err.to_string();
        assert!(msg.contains("x.csv"));
        assert!(msg.contains("missing header"));
    }
}
