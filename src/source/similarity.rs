use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::{debug, info};

use super::AssetStore;
use crate::data::{SimilarityEntry, ZipCode};
use crate::errors::LoadError;
use crate::transport::FetchedAsset;

/// Read-only ZIP similarity lookup, in source order.
///
/// A miss from `lookup` means "no similarity data for this ZIP code" and is
/// not an error; load failures surface from `parse`/`load` instead.
#[derive(Clone, Debug, Default)]
pub struct SimilarityIndex {
    entries: IndexMap<ZipCode, SimilarityEntry>,
}

impl SimilarityIndex {
    /// Index with no entries, used before the first load completes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an index from entries; the first entry wins for duplicate ZIP codes.
    pub fn from_entries(entries: impl IntoIterator<Item = SimilarityEntry>) -> Self {
        let mut map = IndexMap::new();
        for entry in entries {
            match map.entry(entry.zip_code.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(entry);
                }
                Entry::Occupied(slot) => {
                    debug!(zip = slot.key().as_str(), "ignoring duplicate similarity entry");
                }
            }
        }
        Self { entries: map }
    }

    /// Parse a JSON array of similarity entries.
    pub fn parse(asset: &str, text: &str) -> Result<Self, LoadError> {
        let entries: Vec<SimilarityEntry> =
            serde_json::from_str(text).map_err(|err| LoadError::ParseFailure {
                asset: asset.to_string(),
                details: err.to_string(),
            })?;
        let index = Self::from_entries(entries);
        info!(asset, entries = index.len(), "loaded zip similarity index");
        Ok(index)
    }

    /// Exact-match lookup.
    pub fn lookup(&self, zip_code: &str) -> Option<&SimilarityEntry> {
        self.entries.get(zip_code)
    }

    /// Similar ZIP codes for `zip_code`, most similar first; empty on a miss.
    pub fn similar_zip_codes(&self, zip_code: &str) -> Vec<&str> {
        self.lookup(zip_code)
            .map(|entry| {
                entry
                    .similar_zips
                    .iter()
                    .map(|similar| similar.zip_code.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Entries in source order.
    pub fn entries(&self) -> impl Iterator<Item = &SimilarityEntry> + '_ {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AssetStore for SimilarityIndex {
    type Options = ();

    fn from_asset(asset: &FetchedAsset, _options: &()) -> Result<Self, LoadError> {
        Self::parse(&asset.name, &asset.text)
    }
}
