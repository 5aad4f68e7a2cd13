use std::io;

use thiserror::Error;

use crate::types::AssetName;

/// Failure loading a static data asset into memory.
///
/// Row-level problems inside a tabular source are recovered per line and
/// never surface here; only whole-asset failures do.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("asset '{asset}' could not be fetched: {reason}")]
    FetchFailure { asset: AssetName, reason: String },
    #[error("asset '{asset}' could not be parsed: {details}")]
    ParseFailure { asset: AssetName, details: String },
}

impl LoadError {
    /// Asset name the failure refers to.
    pub fn asset(&self) -> &str {
        match self {
            LoadError::FetchFailure { asset, .. } | LoadError::ParseFailure { asset, .. } => asset,
        }
    }
}

/// Invalid filter construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("column '{column}' does not support {mode} filtering")]
    ModeMismatch {
        column: &'static str,
        mode: &'static str,
    },
}

/// Failures reported by an identity provider.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("an email address is required")]
    MissingEmail,
    #[error("identity provider error: {0}")]
    Provider(String),
}

/// Failures reported by a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

/// Top-level error used by application entry points.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Cli(#[from] clap::Error),
    #[error("data could not be loaded: {0}")]
    Unloaded(String),
}
