//! Asset transports that fetch the raw text of static data files.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::errors::LoadError;
use crate::types::AssetName;

/// Filesystem-backed transport.
pub mod fs;

pub use fs::FileTransport;

/// Raw text of one fetched asset.
#[derive(Clone, Debug)]
pub struct FetchedAsset {
    /// Asset name as requested.
    pub name: AssetName,
    /// Full document text.
    pub text: String,
    /// Last modification time when the transport knows it.
    pub modified_at: Option<DateTime<Utc>>,
}

/// One-shot fetch of static assets by name.
///
/// Transport problems map to `LoadError::FetchFailure`; callers decide whether
/// to surface or retry (the session never retries).
pub trait Transport: Send + Sync {
    /// Fetch the complete text of `asset`.
    fn fetch_text(&self, asset: &str) -> Result<FetchedAsset, LoadError>;
}

/// Transport over assets held in memory; used by tests and embedding hosts.
#[derive(Default)]
pub struct InMemoryTransport {
    assets: RwLock<HashMap<AssetName, String>>,
}

impl InMemoryTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an asset.
    pub fn with_asset(self, name: impl Into<AssetName>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    /// Register (or replace) an asset in place.
    pub fn insert(&self, name: impl Into<AssetName>, text: impl Into<String>) {
        if let Ok(mut assets) = self.assets.write() {
            assets.insert(name.into(), text.into());
        }
    }

    /// Remove an asset so later fetches fail.
    pub fn remove(&self, name: &str) {
        if let Ok(mut assets) = self.assets.write() {
            assets.remove(name);
        }
    }
}

impl Transport for InMemoryTransport {
    fn fetch_text(&self, asset: &str) -> Result<FetchedAsset, LoadError> {
        let assets = self.assets.read().map_err(|_| LoadError::FetchFailure {
            asset: asset.to_string(),
            reason: "asset table lock poisoned".to_string(),
        })?;
        let text = assets
            .get(asset)
            .cloned()
            .ok_or_else(|| LoadError::FetchFailure {
                asset: asset.to_string(),
                reason: "asset not found".to_string(),
            })?;
        Ok(FetchedAsset {
            name: asset.to_string(),
            text,
            modified_at: None,
        })
    }
}
