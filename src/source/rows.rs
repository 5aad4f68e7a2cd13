use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::AssetStore;
use crate::data::{Row, RowId};
use crate::errors::LoadError;
use crate::layout::ColumnLayout;
use crate::transport::FetchedAsset;
use crate::types::{AnnotationText, AssetName};
use crate::utils::records;

/// Summary of one row load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Asset the rows came from; empty for stores built in memory.
    pub asset: AssetName,
    /// Name of the column layout applied.
    pub layout: String,
    /// Rows kept.
    pub rows: usize,
    /// 0-based physical lines rejected as malformed.
    pub skipped_lines: Vec<usize>,
    /// Asset modification time, when known.
    pub modified_at: Option<DateTime<Utc>>,
}

/// Parsed demographic rows in source order.
///
/// Rows are never removed during a session; only their annotation changes.
#[derive(Clone, Debug, Default)]
pub struct RowStore {
    rows: Vec<Row>,
    report: LoadReport,
}

impl RowStore {
    /// Store with no rows, used before the first load completes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Store over rows that were built in memory.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let report = LoadReport {
            rows: rows.len(),
            ..LoadReport::default()
        };
        Self { rows, report }
    }

    /// Parse delimited text with a header line into rows.
    ///
    /// Malformed lines are skipped and recorded in the report; missing fields
    /// default to empty. Only a source without a header fails.
    pub fn parse(asset: &str, text: &str, layout: &ColumnLayout) -> Result<Self, LoadError> {
        let mut iter = records(text);
        let header = loop {
            match iter.next() {
                Some(record) => match record.fields {
                    Ok(fields) => break fields,
                    Err(malformed) => {
                        return Err(LoadError::ParseFailure {
                            asset: asset.to_string(),
                            details: format!(
                                "header line {} is malformed: {}",
                                malformed.line, malformed.reason
                            ),
                        });
                    }
                },
                None => {
                    return Err(LoadError::ParseFailure {
                        asset: asset.to_string(),
                        details: "source has no header line".to_string(),
                    });
                }
            }
        };
        let layout = layout.resolve_for_header(&header);
        iter.expect_fields(header.len());

        let mut rows = Vec::new();
        let mut skipped_lines = Vec::new();
        for record in iter {
            match record.fields {
                Ok(fields) => rows.push(layout.map_row(&fields)),
                Err(malformed) => {
                    warn!(
                        asset,
                        line = malformed.line,
                        reason = malformed.reason,
                        "skipping malformed row"
                    );
                    skipped_lines.push(malformed.line);
                }
            }
        }

        info!(
            asset,
            layout = layout.name(),
            rows = rows.len(),
            skipped = skipped_lines.len(),
            "loaded demographic rows"
        );
        let report = LoadReport {
            asset: asset.to_string(),
            layout: layout.name().to_string(),
            rows: rows.len(),
            skipped_lines,
            modified_at: None,
        };
        Ok(Self { rows, report })
    }

    /// Full unfiltered row set in source order.
    pub fn all(&self) -> &[Row] {
        &self.rows
    }

    /// Rows paired with their stable ids.
    pub fn entries(&self) -> impl Iterator<Item = (RowId, &Row)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (RowId(idx), row))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: RowId) -> Option<&Row> {
        self.rows.get(id.0)
    }

    /// Replace a row's annotation in place. Returns `false` for unknown ids.
    pub fn set_annotation(&mut self, id: RowId, text: impl Into<AnnotationText>) -> bool {
        match self.rows.get_mut(id.0) {
            Some(row) => {
                row.annotation = text.into();
                true
            }
            None => false,
        }
    }

    /// Every row for an exact ZIP code, in source order.
    pub fn find_by_zip(&self, zip_code: &str) -> Vec<(RowId, &Row)> {
        self.entries()
            .filter(|(_, row)| row.zip_code == zip_code)
            .collect()
    }

    /// Sparse annotation overlay: rows whose annotation is non-empty.
    pub fn annotations(&self) -> Vec<(RowId, &str)> {
        self.entries()
            .filter(|(_, row)| !row.annotation.is_empty())
            .map(|(id, row)| (id, row.annotation.as_str()))
            .collect()
    }

    /// Summary of the load that produced this store.
    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}

impl AssetStore for RowStore {
    type Options = ColumnLayout;

    fn from_asset(asset: &FetchedAsset, layout: &ColumnLayout) -> Result<Self, LoadError> {
        let mut store = Self::parse(&asset.name, &asset.text, layout)?;
        store.report.modified_at = asset.modified_at;
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::csv::EXPORT_HEADER;
    use crate::transport::{InMemoryTransport, Transport};

    const SOURCE: &str = "\
City,State,Zip,Extra,Term,Extra2,Population,Income,Age,Bachelor
Troy,NY,12180,x,Fall 2021,y,50000,61000,31.5,44.2
Albany,NY,12207,x,Fall 2022,y,98000,45000,35.0,38.1
";

    #[test]
    fn parse_maps_enrollment_columns_in_source_order() {
        let store = RowStore::parse("rows.csv", SOURCE, &ColumnLayout::enrollment_v1()).unwrap();
        assert_eq!(store.len(), 2);
        let troy = &store.all()[0];
        assert_eq!(troy.city, "Troy");
        assert_eq!(troy.term, "Fall 2021");
        assert_eq!(troy.bachelor_degree_pct, "44.2");
        assert_eq!(troy.median_age, "31.5");
        assert_eq!(store.all()[1].city, "Albany");
        assert_eq!(store.report().layout, "enrollment_v1");
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let text = format!("{SOURCE}\"Broken,NY,12000\nCohoes,NY,12047\n");
        let store = RowStore::parse("rows.csv", &text, &ColumnLayout::enrollment_v1()).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.all()[2].city, "Cohoes");
        assert_eq!(store.all()[2].population, "");
        assert_eq!(store.report().skipped_lines, vec![3]);
    }

    #[test]
    fn stray_quote_does_not_swallow_following_rows() {
        let text = format!(
            "{SOURCE}\"Broken,NY,12000,x,Fall 2021,y,1,2,3,4\n\
             Cohoes,NY,12047,x,Fall 2021,y,16000,52000,38.0,30.1\n\
             Troy,NY,12180,x,Fall 2023,y,\"50000\",61000,31.5,44.2\n\
             Schenectady,NY,12305,x,Fall 2021,y,66000,48000,36.2,28.4\n"
        );
        let store = RowStore::parse("rows.csv", &text, &ColumnLayout::enrollment_v1()).unwrap();
        let cities: Vec<_> = store.all().iter().map(|row| row.city.as_str()).collect();
        assert_eq!(cities, vec!["Troy", "Albany", "Cohoes", "Troy", "Schenectady"]);
        assert_eq!(store.all()[3].population, "50000");
        assert_eq!(store.report().skipped_lines, vec![3]);
    }

    #[test]
    fn source_without_header_is_a_parse_failure() {
        let err =
            RowStore::parse("rows.csv", "\n  \n", &ColumnLayout::enrollment_v1()).unwrap_err();
        assert!(matches!(err, LoadError::ParseFailure { .. }));
    }

    #[test]
    fn export_header_loads_annotations_back() {
        let text =
            format!("{EXPORT_HEADER}\nTroy,NY,12180,Fall 2021,50000,61000,44.2,31.5,call back\n");
        let store = RowStore::parse("export.csv", &text, &ColumnLayout::enrollment_v1()).unwrap();
        assert_eq!(store.report().layout, "export");
        assert_eq!(store.all()[0].annotation, "call back");
        assert_eq!(store.all()[0].median_age, "31.5");
    }

    #[test]
    fn annotations_mutate_in_place_and_form_a_sparse_overlay() {
        let mut store =
            RowStore::parse("rows.csv", SOURCE, &ColumnLayout::enrollment_v1()).unwrap();
        assert!(store.annotations().is_empty());
        assert!(store.set_annotation(RowId(1), "visit campus"));
        assert!(!store.set_annotation(RowId(9), "nowhere"));
        assert_eq!(store.get(RowId(1)).unwrap().annotation, "visit campus");
        assert_eq!(store.annotations(), vec![(RowId(1), "visit campus")]);
    }

    #[test]
    fn find_by_zip_returns_every_term() {
        let text = format!("{SOURCE}Troy,NY,12180,x,Fall 2022,y,50500,62000,31.9,44.0\n");
        let store = RowStore::parse("rows.csv", &text, &ColumnLayout::enrollment_v1()).unwrap();
        let matches = store.find_by_zip("12180");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].0, RowId(0));
        assert_eq!(matches[1].0, RowId(2));
        assert!(store.find_by_zip("99999").is_empty());
    }

    #[test]
    fn load_through_transport_records_asset_name() {
        let transport = InMemoryTransport::new().with_asset("rows.csv", SOURCE);
        let layout = ColumnLayout::enrollment_v1();
        let store = RowStore::load(&transport as &dyn Transport, "rows.csv", &layout).unwrap();
        assert_eq!(store.report().asset, "rows.csv");
        assert_eq!(store.report().rows, 2);
    }
}
