//! Row serialization for downloads and table views.

use crate::constants::csv::EXPORT_HEADER;
use crate::data::{Row, RowId, TableRowView};
use crate::utils::join_record;

/// Serialize rows, annotations included, as delimited text with the fixed
/// export header. Every line, header included, ends with `\n`.
pub fn export_csv<'a, I>(rows: I) -> String
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut out = String::with_capacity(EXPORT_HEADER.len() + 1);
    out.push_str(EXPORT_HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(&join_record(row.cells()));
        out.push('\n');
    }
    out
}

/// Pure view model for a table of rows.
pub fn table_view<'a, I>(rows: I) -> Vec<TableRowView>
where
    I: IntoIterator<Item = (RowId, &'a Row)>,
{
    rows.into_iter()
        .map(|(row_id, row)| TableRowView {
            row_id,
            cells: row.cells().iter().map(|cell| cell.to_string()).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_writes_header_and_escapes_fields() {
        let rows = vec![Row {
            city: "Troy, NY".into(),
            state: "NY".into(),
            zip_code: "12180".into(),
            annotation: "said \"maybe\"".into(),
            ..Row::default()
        }];
        let text = export_csv(&rows);
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("City,State,Zip Code,Term,Population,Income,Bachelor Degree,Median Age,Annotation")
        );
        assert_eq!(
            lines.next(),
            Some("\"Troy, NY\",NY,12180,,,,,,\"said \"\"maybe\"\"\"")
        );
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn empty_export_is_header_only() {
        assert_eq!(export_csv(&Vec::<Row>::new()).lines().count(), 1);
    }

    #[test]
    fn table_view_keeps_row_ids_and_cells() {
        let rows = vec![Row::from_cells(["Troy", "NY", "12180"])];
        let view = table_view(rows.iter().enumerate().map(|(idx, row)| (RowId(idx + 4), row)));
        assert_eq!(view[0].row_id, RowId(4));
        assert_eq!(view[0].cells.len(), 9);
        assert_eq!(view[0].cells[2], "12180");
    }
}
