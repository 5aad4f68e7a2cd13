use std::collections::HashMap;

use crate::constants::chart::OTHER_LABEL;
use crate::data::{CategoryShare, Column, Row};

/// Category counts for a pie-style chart.
///
/// Cells are trimmed before counting. Categories are ordered by count
/// (descending) then label; the first `max_slices` are kept and the remaining
/// counts fold into a trailing `"Other"` slice.
pub fn category_distribution<'a, I>(
    rows: I,
    column: Column,
    max_slices: usize,
) -> Vec<CategoryShare>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        *counts.entry(row.field(column).trim()).or_insert(0) += 1;
    }
    if counts.is_empty() {
        return Vec::new();
    }
    let total: usize = counts.values().sum();

    let mut ordered: Vec<(&str, usize)> = counts.into_iter().collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let other: usize = ordered.iter().skip(max_slices).map(|(_, count)| count).sum();
    let mut shares: Vec<CategoryShare> = ordered
        .into_iter()
        .take(max_slices)
        .map(|(label, count)| CategoryShare {
            label: label.to_string(),
            count,
            share: count as f64 / total as f64,
        })
        .collect();
    if other > 0 {
        shares.push(CategoryShare {
            label: OTHER_LABEL.to_string(),
            count: other,
            share: other as f64 / total as f64,
        });
    }
    shares
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(cities: &[&str]) -> Vec<Row> {
        cities
            .iter()
            .map(|city| Row {
                city: city.to_string(),
                ..Row::default()
            })
            .collect()
    }

    #[test]
    fn distribution_orders_by_count_then_label() {
        let rows = rows(&["Troy", "Albany", " Troy ", "Cohoes", "Albany", "Troy"]);
        let shares = category_distribution(&rows, Column::City, 10);
        let labels: Vec<_> = shares.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Troy", "Albany", "Cohoes"]);
        assert_eq!(shares[0].count, 3);
        assert!((shares[0].share - 0.5).abs() < 1e-9);
    }

    #[test]
    fn remainder_folds_into_other() {
        let rows = rows(&["A", "A", "B", "C", "D"]);
        let shares = category_distribution(&rows, Column::City, 2);
        assert_eq!(shares.len(), 3);
        assert_eq!(shares[0].label, "A");
        assert_eq!(shares[1].label, "B");
        assert_eq!(shares[2].label, "Other");
        assert_eq!(shares[2].count, 2);
        let total: f64 = shares.iter().map(|s| s.share).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_has_no_slices() {
        assert!(category_distribution(&Vec::<Row>::new(), Column::State, 10).is_empty());
    }
}
