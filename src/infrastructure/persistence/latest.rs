use crate::domain::errors::StorageError;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// The file in `directory` matching `pattern` with the greatest modification time.
///
/// Returns `Ok(None)` when the directory does not exist or nothing matches.
/// Equal modification times are broken by the larger path so the choice is
/// stable. Nothing prevents another run from writing a newer file right after
/// this returns.
pub fn latest(directory: &Path, pattern: &str) -> Result<Option<PathBuf>, StorageError> {
    if !directory.is_dir() {
        debug!("Artifact directory {:?} does not exist", directory);
        return Ok(None);
    }

    let escaped = glob::Pattern::escape(&directory.to_string_lossy());
    let full = Path::new(&escaped).join(pattern);
    let paths = glob::glob(&full.to_string_lossy()).map_err(|e| StorageError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let mut best: Option<(SystemTime, PathBuf)> = None;
    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("Skipping unreadable artifact entry: {}", e);
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }

        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| StorageError::io(&path, e))?;

        if best
            .as_ref()
            .is_none_or(|(t, p)| (modified, &path) > (*t, p))
        {
            best = Some((modified, path));
        }
    }

    Ok(best.map(|(_, path)| path))
}
