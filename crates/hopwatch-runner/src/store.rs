//! Store — the output directory that receives one file per capture.
//!
//! Files are written whole, once, and never touched again. Two captures of the
//! same destination within the same second share a name; the later one wins.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use hopwatch_core::naming::capture_file_name;
use hopwatch_core::Normalized;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write capture {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot encode capture: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Handle to the capture directory.
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    /// Create `dir` (and its parents) if needed. Failing here means nothing
    /// can ever be persisted, so callers treat it as fatal.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StoreError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where a capture of `destination` taken at `captured_at` is stored.
    pub fn path_for(&self, captured_at: &DateTime<Utc>, destination: &str) -> PathBuf {
        self.dir.join(capture_file_name(captured_at, destination))
    }

    /// Render `result` and write it to its capture file.
    pub async fn write(
        &self,
        captured_at: &DateTime<Utc>,
        destination: &str,
        result: &Normalized,
    ) -> Result<PathBuf, StoreError> {
        let contents = result.render()?;
        let path = self.path_for(captured_at, destination);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}
