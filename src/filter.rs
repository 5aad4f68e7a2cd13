//! Column filters over rows.
//!
//! Filtering never mutates rows and never re-sorts them: output keeps the
//! input's relative order, so the same `(rows, spec)` always yields the same
//! sequence.

use serde::{Deserialize, Serialize};

use crate::data::{Column, Row};
use crate::errors::FilterError;
use crate::utils::coerce_number;

/// How a filter compares a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterMode {
    Text,
    NumericRange,
}

impl FilterMode {
    fn label(self) -> &'static str {
        match self {
            FilterMode::Text => "text",
            FilterMode::NumericRange => "numeric range",
        }
    }
}

/// Search criterion of a filter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Criterion {
    /// Case-insensitive substring match.
    Text(String),
    /// Inclusive numeric range.
    NumericRange { min: f64, max: f64 },
}

/// A column plus the criterion applied to it.
///
/// Constructors enforce that numeric columns use ranges and text columns use
/// text search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    column: Column,
    criterion: Criterion,
}

impl FilterSpec {
    /// Text search on a text column.
    pub fn text(column: Column, text: impl Into<String>) -> Result<Self, FilterError> {
        Self::new(column, Criterion::Text(text.into()))
    }

    /// Inclusive range on a numeric column.
    pub fn range(column: Column, min: f64, max: f64) -> Result<Self, FilterError> {
        Self::new(column, Criterion::NumericRange { min, max })
    }

    /// Validate a column/criterion pair.
    pub fn new(column: Column, criterion: Criterion) -> Result<Self, FilterError> {
        let spec = Self { column, criterion };
        if column.is_numeric() != (spec.mode() == FilterMode::NumericRange) {
            return Err(FilterError::ModeMismatch {
                column: column.label(),
                mode: spec.mode().label(),
            });
        }
        Ok(spec)
    }

    pub fn column(&self) -> Column {
        self.column
    }

    pub fn criterion(&self) -> &Criterion {
        &self.criterion
    }

    pub fn mode(&self) -> FilterMode {
        match self.criterion {
            Criterion::Text(_) => FilterMode::Text,
            Criterion::NumericRange { .. } => FilterMode::NumericRange,
        }
    }

    /// True when the spec keeps every row (empty search text).
    pub fn is_noop(&self) -> bool {
        matches!(&self.criterion, Criterion::Text(text) if text.is_empty())
    }

    /// Whether one row passes the filter.
    pub fn matches(&self, row: &Row) -> bool {
        let value = row.field(self.column);
        match &self.criterion {
            Criterion::Text(text) => {
                text.is_empty() || value.to_lowercase().contains(&text.to_lowercase())
            }
            Criterion::NumericRange { min, max } => {
                let parsed = coerce_number(value);
                *min <= parsed && parsed <= *max
            }
        }
    }
}

/// Apply an optional filter, keeping input order.
///
/// `None` (no selected column) and empty search text both return every row.
pub fn apply<'a, I>(rows: I, spec: Option<&FilterSpec>) -> Vec<&'a Row>
where
    I: IntoIterator<Item = &'a Row>,
{
    match spec {
        Some(spec) if !spec.is_noop() => rows.into_iter().filter(|row| spec.matches(row)).collect(),
        _ => rows.into_iter().collect(),
    }
}

/// Minimum and maximum of a numeric column, for slider bounds.
///
/// Unparsable cells count as `0.0`, matching filter coercion.
pub fn numeric_bounds<'a, I>(rows: I, column: Column) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a Row>,
{
    if !column.is_numeric() {
        return None;
    }
    rows.into_iter()
        .map(|row| coerce_number(row.field(column)))
        .fold(None, |bounds, value| match bounds {
            None => Some((value, value)),
            Some((lo, hi)) => Some((f64::min(lo, value), f64::max(hi, value))),
        })
}
