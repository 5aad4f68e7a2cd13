//! Versioned mapping from raw source columns to row fields.
//!
//! Source files and rows order their columns differently, and the mapping is
//! positional only: reordering columns at the source silently shifts fields.
//! Keep each layout versioned alongside the file it describes.

use std::borrow::Cow;

use crate::constants::csv::{EXPORT_HEADER, ROW_FIELD_COUNT};
use crate::data::Row;
use crate::types::CellValue;

/// Positional mapping from source columns into the nine row fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnLayout {
    name: Cow<'static, str>,
    /// Source column index per row field, in export order; `None` leaves it empty.
    sources: [Option<usize>; ROW_FIELD_COUNT],
}

impl ColumnLayout {
    /// Build a custom layout.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        sources: [Option<usize>; ROW_FIELD_COUNT],
    ) -> Self {
        Self {
            name: name.into(),
            sources,
        }
    }

    /// Layout of `merged_enrollment_demographics.csv`.
    ///
    /// City←0, State←1, Zip←2, Term←4, Population←6, Income←7,
    /// Bachelor Degree←9, Median Age←8; annotations start empty.
    pub fn enrollment_v1() -> Self {
        Self::new(
            "enrollment_v1",
            [
                Some(0),
                Some(1),
                Some(2),
                Some(4),
                Some(6),
                Some(7),
                Some(9),
                Some(8),
                None,
            ],
        )
    }

    /// Identity layout over the export header, annotation included.
    pub fn export() -> Self {
        Self::new(
            "export",
            [
                Some(0),
                Some(1),
                Some(2),
                Some(3),
                Some(4),
                Some(5),
                Some(6),
                Some(7),
                Some(8),
            ],
        )
    }

    /// Layout name, recorded in load reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pick the layout for a source given its header fields.
    ///
    /// Sources whose header is exactly the export header are always read with
    /// the export layout so exported files load back unchanged.
    pub fn resolve_for_header(&self, header: &[CellValue]) -> ColumnLayout {
        if is_export_header(header) {
            ColumnLayout::export()
        } else {
            self.clone()
        }
    }

    /// Map one record's fields into a row; absent columns become empty.
    pub fn map_row(&self, fields: &[CellValue]) -> Row {
        Row::from_cells(self.sources.iter().map(|source| {
            source
                .and_then(|idx| fields.get(idx))
                .cloned()
                .unwrap_or_default()
        }))
    }
}

fn is_export_header(header: &[CellValue]) -> bool {
    let expected = EXPORT_HEADER.split(',');
    header.len() == ROW_FIELD_COUNT
        && header
            .iter()
            .zip(expected)
            .all(|(found, expected)| found.trim() == expected)
}
