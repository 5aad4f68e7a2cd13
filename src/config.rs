use std::path::PathBuf;

use crate::constants::{assets, chart, map};
use crate::layout::ColumnLayout;
use crate::types::{AssetName, BasemapId};

/// Top-level dashboard configuration.
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    /// Directory that static assets are resolved against.
    pub data_root: PathBuf,
    /// Tabular demographic rows asset.
    pub rows_asset: AssetName,
    /// JSON ZIP similarity asset.
    pub similarity_asset: AssetName,
    /// Column mapping used for the rows asset.
    pub layout: ColumnLayout,
    /// File name suggested for exports.
    pub export_filename: String,
    /// Slice limit for category distributions.
    pub chart_max_slices: usize,
    /// Basemap published before any user choice.
    pub default_basemap: BasemapId,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from(assets::DEFAULT_DATA_ROOT),
            rows_asset: assets::DEFAULT_ROWS_ASSET.to_string(),
            similarity_asset: assets::DEFAULT_SIMILARITY_ASSET.to_string(),
            layout: ColumnLayout::enrollment_v1(),
            export_filename: assets::DEFAULT_EXPORT_FILENAME.to_string(),
            chart_max_slices: chart::DEFAULT_MAX_SLICES,
            default_basemap: map::DEFAULT_BASEMAP.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Defaults with the data root taken from `CITYSCOPE_DATA_ROOT` when set.
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var(assets::DATA_ROOT_ENV) {
            Ok(root) if !root.trim().is_empty() => config.with_data_root(root),
            _ => config,
        }
    }

    /// Override the asset root directory.
    pub fn with_data_root(mut self, data_root: impl Into<PathBuf>) -> Self {
        self.data_root = data_root.into();
        self
    }

    /// Override the rows asset name.
    pub fn with_rows_asset(mut self, asset: impl Into<AssetName>) -> Self {
        self.rows_asset = asset.into();
        self
    }

    /// Override the similarity asset name.
    pub fn with_similarity_asset(mut self, asset: impl Into<AssetName>) -> Self {
        self.similarity_asset = asset.into();
        self
    }

    /// Override the column layout.
    pub fn with_layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Override the export file name.
    pub fn with_export_filename(mut self, name: impl Into<String>) -> Self {
        self.export_filename = name.into();
        self
    }

    /// Override the category distribution slice limit.
    pub fn with_chart_max_slices(mut self, max_slices: usize) -> Self {
        self.chart_max_slices = max_slices;
        self
    }
}
