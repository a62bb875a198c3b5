use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::CoreError;

/// Parses the run's list of portfolio files: one path per line.
///
/// Blank lines, lines starting with `#`, and paths that do not exist are
/// skipped.
pub struct RunDriver;

impl RunDriver {
    pub fn read_list_file(path: &Path) -> Result<Vec<PathBuf>, CoreError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CoreError::FileIO(format!("{}: {e}", path.display())))?;
        Ok(Self::parse_list(&text))
    }

    pub fn parse_list(text: &str) -> Vec<PathBuf> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(PathBuf::from)
            .filter(|path| {
                let exists = path.exists();
                if !exists {
                    debug!(path = %path.display(), "skipping missing portfolio file");
                }
                exists
            })
            .collect()
    }
}
