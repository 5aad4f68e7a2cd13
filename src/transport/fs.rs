use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Component, Path, PathBuf};

use super::{FetchedAsset, Transport};
use crate::errors::LoadError;

/// Filesystem transport that resolves asset names under a root directory.
pub struct FileTransport {
    root: PathBuf,
}

impl FileTransport {
    /// Create a transport rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory assets are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an asset name, rejecting names that escape the root.
    pub fn resolve(&self, asset: &str) -> Result<PathBuf, LoadError> {
        let relative = Path::new(asset);
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if asset.trim().is_empty() || escapes {
            return Err(LoadError::FetchFailure {
                asset: asset.to_string(),
                reason: "asset name must be a relative path inside the data root".to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl Transport for FileTransport {
    fn fetch_text(&self, asset: &str) -> Result<FetchedAsset, LoadError> {
        let path = self.resolve(asset)?;
        let text = fs::read_to_string(&path).map_err(|err| LoadError::FetchFailure {
            asset: asset.to_string(),
            reason: format!("{}: {err}", path.display()),
        })?;
        Ok(FetchedAsset {
            name: asset.to_string(),
            text,
            modified_at: file_mtime(&path),
        })
    }
}

/// Best-effort file modified time.
pub fn file_mtime(path: &Path) -> Option<DateTime<Utc>> {
    let metadata = fs::metadata(path).ok()?;
    let modified = metadata.modified().ok()?;
    Some(system_time_to_utc(modified))
}

fn system_time_to_utc(time: std::time::SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}
