/// Constants used by the delimited-text codec and export header.
pub mod csv {
    /// Field delimiter for tabular sources and exports.
    pub const DELIMITER: char = ',';
    /// Quote character used for RFC4180-style escaping.
    pub const QUOTE: char = '"';
    /// Header line written by exports; also identifies re-imported exports.
    pub const EXPORT_HEADER: &str =
        "City,State,Zip Code,Term,Population,Income,Bachelor Degree,Median Age,Annotation";
    /// Number of fields in a row.
    pub const ROW_FIELD_COUNT: usize = 9;
}

/// Constants naming default static assets.
pub mod assets {
    /// Default directory holding static data assets.
    pub const DEFAULT_DATA_ROOT: &str = "assets/data";
    /// Environment variable overriding the data root.
    pub const DATA_ROOT_ENV: &str = "CITYSCOPE_DATA_ROOT";
    /// Default demographic rows asset.
    pub const DEFAULT_ROWS_ASSET: &str = "merged_enrollment_demographics.csv";
    /// Default ZIP similarity asset.
    pub const DEFAULT_SIMILARITY_ASSET: &str = "zip_code_similarities.json";
    /// Default download name for exported rows.
    pub const DEFAULT_EXPORT_FILENAME: &str = "filtered_data.csv";
}

/// Constants used by chart aggregation.
pub mod chart {
    /// Maximum slices shown before the remainder folds into `OTHER_LABEL`.
    pub const DEFAULT_MAX_SLICES: usize = 10;
    /// Label of the folded remainder slice.
    pub const OTHER_LABEL: &str = "Other";
}

/// Constants shared by the map-facing pieces.
pub mod map {
    /// Basemap published before any user choice.
    pub const DEFAULT_BASEMAP: &str = "streets-vector";
}

/// Constants used by persisted annotation snapshots.
pub mod store {
    /// Collection holding annotation snapshots keyed by user email.
    pub const ANNOTATIONS_COLLECTION: &str = "annotations";
}

/// Constants used by the session controller notices.
pub mod session {
    /// Prefix of the warning emitted when a selected ZIP has no similarity entry.
    pub const NO_SIMILAR_PREFIX: &str = "No similar zip codes found for";
}
