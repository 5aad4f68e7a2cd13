#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line runners shared by the `cityscope` binary.
pub mod apps;
/// Identity provider port and signed-in session.
pub mod auth;
/// Single-writer shared values (basemap selection, signed-in user).
pub mod bus;
/// Dashboard configuration types.
pub mod config;
/// Centralized constants grouped by concern.
pub mod constants;
/// Row, similarity and view model types.
pub mod data;
/// Document store port and annotation snapshots.
pub mod documents;
/// CSV export and table view models.
pub mod export;
/// Column filters.
pub mod filter;
/// Map highlight membership.
pub mod highlight;
/// Source column layouts.
pub mod layout;
/// Category distribution helpers.
pub mod metrics;
/// Page controller tying stores, filters and selection together.
pub mod session;
/// Row store and similarity index.
pub mod source;
/// Asset transports (filesystem and in-memory).
pub mod transport;
/// Shared type aliases.
pub mod types;
/// Delimited-text helpers.
pub mod utils;

mod errors;

pub use auth::{AuthProvider, AuthSession, InMemoryAuthProvider, User};
pub use bus::{BasemapBus, BusReader, BusWriter, Subscription, ValueBus};
pub use config::DashboardConfig;
pub use data::{
    CategoryShare, Column, Notice, NoticeLevel, Row, RowId, SimilarZip, SimilarityEntry,
    TableRowView,
};
pub use documents::{AnnotationSnapshot, DocumentStore, InMemoryDocumentStore, SavedAnnotation};
pub use errors::{AuthError, DashboardError, FilterError, LoadError, StoreError};
pub use export::{export_csv, table_view};
pub use filter::{Criterion, FilterMode, FilterSpec, apply, numeric_bounds};
pub use highlight::{FeatureStyle, HighlightSet, compute_highlight};
pub use layout::ColumnLayout;
pub use metrics::category_distribution;
pub use session::{DashboardSession, LoadKind, LoadOutcome, LoadTicket, Selection};
pub use source::{AssetStore, LoadReport, RowStore, SimilarityIndex};
pub use transport::{FetchedAsset, FileTransport, InMemoryTransport, Transport};
pub use types::{AssetName, BasemapId, CategoryLabel, CellValue, Email, ZipCode};
