//! In-memory stores populated from static assets.
//!
//! Ownership model:
//! - `RowStore` owns the parsed demographic rows and their annotations.
//! - `SimilarityIndex` owns the precomputed ZIP similarity entries.
//! - Both are built in one shot from a `FetchedAsset` and replaced wholesale
//!   on reload; neither holds a transport or any other external resource.

use crate::errors::LoadError;
use crate::transport::{FetchedAsset, Transport};

/// Demographic row store.
pub mod rows;
/// ZIP similarity index.
pub mod similarity;

pub use rows::{LoadReport, RowStore};
pub use similarity::SimilarityIndex;

/// A store that can be built from the text of one fetched asset.
pub trait AssetStore: Sized {
    /// Load-time options (for rows, the column layout).
    type Options;

    /// Build the store from fetched text.
    fn from_asset(asset: &FetchedAsset, options: &Self::Options) -> Result<Self, LoadError>;

    /// Fetch `asset` through `transport` and build the store.
    fn load(
        transport: &dyn Transport,
        asset: &str,
        options: &Self::Options,
    ) -> Result<Self, LoadError> {
        let fetched = transport.fetch_text(asset)?;
        Self::from_asset(&fetched, options)
    }
}
