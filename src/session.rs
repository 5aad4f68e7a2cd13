//! Page controller tying the stores, filter and selection together.
//!
//! Loads are split into `begin_*` (issue a ticket) and `finish_*` (apply a
//! result) so hosts can run fetches however they like. Only the most recently
//! initiated load of each kind may replace a store; older completions are
//! discarded. Until a load lands every read returns empty results.

use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::constants::session::NO_SIMILAR_PREFIX;
use crate::data::{
    CategoryShare, Column, Notice, Row, RowId, SimilarityEntry, TableRowView, ZipCode,
};
use crate::documents::AnnotationSnapshot;
use crate::errors::LoadError;
use crate::export::{export_csv, table_view};
use crate::filter::{FilterSpec, numeric_bounds};
use crate::highlight::{HighlightSet, compute_highlight};
use crate::metrics::category_distribution;
use crate::source::{AssetStore, RowStore, SimilarityIndex};
use crate::transport::Transport;
use crate::types::AnnotationText;

/// Which store a load targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadKind {
    Rows,
    Similarity,
}

/// Token identifying one initiated load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    kind: LoadKind,
    generation: u64,
}

impl LoadTicket {
    pub fn kind(&self) -> LoadKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a completed load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The store was replaced.
    Applied,
    /// A newer load was initiated meanwhile; the result was dropped.
    Stale,
    /// The load failed; the previous store stays in place.
    Failed,
}

#[derive(Default)]
struct Generation {
    initiated: u64,
    applied: Option<u64>,
}

impl Generation {
    fn begin(&mut self, kind: LoadKind) -> LoadTicket {
        self.initiated += 1;
        LoadTicket {
            kind,
            generation: self.initiated,
        }
    }

    fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.initiated
    }
}

/// Result of selecting a ZIP code on the map.
#[derive(Clone, Debug)]
pub struct Selection {
    pub zip_code: ZipCode,
    /// ZIP codes the map should emphasize.
    pub highlight: HighlightSet,
    /// Matching demographic rows for the side panel.
    pub rows: Vec<(RowId, Row)>,
    /// Similarity entry, when one exists.
    pub similarity: Option<SimilarityEntry>,
}

/// Dashboard state for one page session.
pub struct DashboardSession {
    config: DashboardConfig,
    rows: RowStore,
    similarity: SimilarityIndex,
    rows_generation: Generation,
    similarity_generation: Generation,
    filter: Option<FilterSpec>,
    selected: Option<ZipCode>,
    highlight: HighlightSet,
    notices: Vec<Notice>,
}

impl DashboardSession {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            rows: RowStore::empty(),
            similarity: SimilarityIndex::empty(),
            rows_generation: Generation::default(),
            similarity_generation: Generation::default(),
            filter: None,
            selected: None,
            highlight: HighlightSet::empty(),
            notices: Vec::new(),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Start a rows load.
    pub fn begin_rows_load(&mut self) -> LoadTicket {
        self.rows_generation.begin(LoadKind::Rows)
    }

    /// Start a similarity index load.
    pub fn begin_similarity_load(&mut self) -> LoadTicket {
        self.similarity_generation.begin(LoadKind::Similarity)
    }

    /// Apply a completed rows load.
    pub fn finish_rows_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<RowStore, LoadError>,
    ) -> LoadOutcome {
        if ticket.kind != LoadKind::Rows || !self.rows_generation.is_current(ticket) {
            debug!(generation = ticket.generation, "discarding stale rows load");
            return LoadOutcome::Stale;
        }
        match result {
            Ok(store) => {
                self.rows = store;
                self.rows_generation.applied = Some(ticket.generation);
                LoadOutcome::Applied
            }
            Err(err) => self.record_failure(err),
        }
    }

    /// Apply a completed similarity index load.
    ///
    /// A current selection is re-highlighted against the new index.
    pub fn finish_similarity_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<SimilarityIndex, LoadError>,
    ) -> LoadOutcome {
        if ticket.kind != LoadKind::Similarity || !self.similarity_generation.is_current(ticket) {
            debug!(generation = ticket.generation, "discarding stale similarity load");
            return LoadOutcome::Stale;
        }
        match result {
            Ok(index) => {
                self.similarity = index;
                self.similarity_generation.applied = Some(ticket.generation);
                if let Some(zip) = &self.selected {
                    self.highlight = compute_highlight(zip, &self.similarity);
                }
                LoadOutcome::Applied
            }
            Err(err) => self.record_failure(err),
        }
    }

    /// Fetch and apply the configured rows asset.
    pub fn load_rows(&mut self, transport: &dyn Transport) -> LoadOutcome {
        let ticket = self.begin_rows_load();
        let result = RowStore::load(transport, &self.config.rows_asset, &self.config.layout);
        self.finish_rows_load(ticket, result)
    }

    /// Fetch and apply the configured similarity asset.
    pub fn load_similarity(&mut self, transport: &dyn Transport) -> LoadOutcome {
        let ticket = self.begin_similarity_load();
        let result = SimilarityIndex::load(transport, &self.config.similarity_asset, &());
        self.finish_similarity_load(ticket, result)
    }

    fn record_failure(&mut self, err: LoadError) -> LoadOutcome {
        warn!(asset = err.asset(), error = %err, "load failed; keeping previous data");
        self.notices.push(Notice::error(err.to_string()));
        LoadOutcome::Failed
    }

    pub fn rows_loaded(&self) -> bool {
        self.rows_generation.applied.is_some()
    }

    pub fn similarity_loaded(&self) -> bool {
        self.similarity_generation.applied.is_some()
    }

    pub fn rows(&self) -> &RowStore {
        &self.rows
    }

    pub fn similarity(&self) -> &SimilarityIndex {
        &self.similarity
    }

    /// Replace the active filter; `None` shows every row.
    pub fn set_filter(&mut self, filter: Option<FilterSpec>) {
        self.filter = filter;
    }

    pub fn filter(&self) -> Option<&FilterSpec> {
        self.filter.as_ref()
    }

    /// Rows passing the active filter, in source order.
    pub fn visible_rows(&self) -> Vec<(RowId, &Row)> {
        match self.filter.as_ref().filter(|spec| !spec.is_noop()) {
            Some(spec) => self
                .rows
                .entries()
                .filter(|(_, row)| spec.matches(row))
                .collect(),
            None => self.rows.entries().collect(),
        }
    }

    pub fn table_view(&self) -> Vec<TableRowView> {
        table_view(self.visible_rows())
    }

    /// Export of the visible rows, annotations included.
    pub fn export_visible_csv(&self) -> String {
        export_csv(self.visible_rows().into_iter().map(|(_, row)| row))
    }

    /// Category distribution of the visible rows.
    pub fn chart(&self, column: Column) -> Vec<CategoryShare> {
        category_distribution(
            self.visible_rows().into_iter().map(|(_, row)| row),
            column,
            self.config.chart_max_slices,
        )
    }

    /// Slider bounds over every loaded row.
    pub fn slider_bounds(&self, column: Column) -> Option<(f64, f64)> {
        numeric_bounds(self.rows.all(), column)
    }

    /// Select a ZIP code from the map.
    pub fn select_zip(&mut self, zip_code: &str) -> Selection {
        let zip_code = zip_code.trim().to_string();
        let highlight = compute_highlight(&zip_code, &self.similarity);
        let similarity = self.similarity.lookup(&zip_code).cloned();
        if similarity.is_none() {
            debug!(zip = zip_code.as_str(), "no similarity entry");
            self.notices
                .push(Notice::warning(format!("{NO_SIMILAR_PREFIX} {zip_code}")));
        }
        let rows = self
            .rows
            .find_by_zip(&zip_code)
            .into_iter()
            .map(|(id, row)| (id, row.clone()))
            .collect();
        info!(zip = zip_code.as_str(), highlighted = highlight.len(), "zip selected");

        self.selected = Some(zip_code.clone());
        self.highlight = highlight.clone();
        Selection {
            zip_code,
            highlight,
            rows,
            similarity,
        }
    }

    /// Drop the selection; nothing is emphasized afterwards.
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.highlight = HighlightSet::empty();
    }

    pub fn selected_zip(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn highlight(&self) -> &HighlightSet {
        &self.highlight
    }

    /// Highlight members the renderer has no feature for; logged as a warning.
    pub fn check_rendered_features<'a, I>(&self, known: I) -> Vec<ZipCode>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let missing: Vec<ZipCode> = self
            .highlight
            .missing_from(known)
            .into_iter()
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            warn!(missing = ?missing, "highlighted zip codes not found on the map");
        }
        missing
    }

    /// Edit a row annotation. Returns `false` for unknown rows.
    pub fn set_annotation(&mut self, row_id: RowId, text: impl Into<AnnotationText>) -> bool {
        self.rows.set_annotation(row_id, text)
    }

    pub fn annotation_snapshot(&self) -> AnnotationSnapshot {
        AnnotationSnapshot::capture(&self.rows)
    }

    /// Restore saved annotations onto the loaded rows.
    pub fn restore_annotations(&mut self, snapshot: &AnnotationSnapshot) -> usize {
        let applied = snapshot.apply_to(&mut self.rows);
        if applied > 0 {
            self.notices
                .push(Notice::info(format!("Restored {applied} annotations")));
        }
        applied
    }

    /// Take every pending notice.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::NoticeLevel;
    use crate::layout::ColumnLayout;

    fn rows(cities: &[(&str, &str)]) -> RowStore {
        RowStore::from_rows(
            cities
                .iter()
                .map(|(city, zip)| Row::from_cells([*city, "NY", *zip]))
                .collect(),
        )
    }

    #[test]
    fn reads_before_any_load_are_empty() {
        let mut session = DashboardSession::new(DashboardConfig::default());
        assert!(session.visible_rows().is_empty());
        assert!(session.table_view().is_empty());
        assert_eq!(session.export_visible_csv().lines().count(), 1);
        let selection = session.select_zip("12180");
        assert_eq!(selection.highlight.len(), 1);
        assert!(selection.rows.is_empty());
        assert!(!session.rows_loaded());
    }

    #[test]
    fn last_initiated_load_wins() {
        let mut session = DashboardSession::new(DashboardConfig::default());
        let first = session.begin_rows_load();
        let second = session.begin_rows_load();

        assert_eq!(
            session.finish_rows_load(second, Ok(rows(&[("Albany", "12207")]))),
            LoadOutcome::Applied
        );
        assert_eq!(
            session.finish_rows_load(first, Ok(rows(&[("Troy", "12180")]))),
            LoadOutcome::Stale
        );
        assert_eq!(session.rows().all()[0].city, "Albany");
    }

    #[test]
    fn stale_completion_is_dropped_even_if_it_lands_first() {
        let mut session = DashboardSession::new(DashboardConfig::default());
        let first = session.begin_rows_load();
        let second = session.begin_rows_load();
        assert_eq!(
            session.finish_rows_load(first, Ok(rows(&[("Troy", "12180")]))),
            LoadOutcome::Stale
        );
        assert!(!session.rows_loaded());
        assert_eq!(
            session.finish_rows_load(second, Ok(rows(&[("Albany", "12207")]))),
            LoadOutcome::Applied
        );
    }

    #[test]
    fn tickets_are_not_interchangeable_between_stores() {
        let mut session = DashboardSession::new(DashboardConfig::default());
        let rows_ticket = session.begin_rows_load();
        session.begin_similarity_load();
        assert_eq!(
            session.finish_similarity_load(rows_ticket, Ok(SimilarityIndex::empty())),
            LoadOutcome::Stale
        );
    }

    #[test]
    fn failed_load_keeps_previous_rows_and_emits_notice() {
        let mut session = DashboardSession::new(DashboardConfig::default());
        let ticket = session.begin_rows_load();
        session.finish_rows_load(ticket, Ok(rows(&[("Troy", "12180")])));

        let ticket = session.begin_rows_load();
        let outcome = session.finish_rows_load(
            ticket,
            Err(LoadError::FetchFailure {
                asset: "rows.csv".into(),
                reason: "offline".into(),
            }),
        );
        assert_eq!(outcome, LoadOutcome::Failed);
        assert_eq!(session.rows().len(), 1);
        let notices = session.drain_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(session.drain_notices().is_empty());
    }

    #[test]
    fn selection_miss_warns_and_similarity_load_rehighlights() {
        let mut session = DashboardSession::new(DashboardConfig::default());
        let selection = session.select_zip(" 12180 ");
        assert_eq!(selection.zip_code, "12180");
        let notices = session.drain_notices();
        assert_eq!(notices[0].message, "No similar zip codes found for 12180");

        let index = SimilarityIndex::parse(
            "sims.json",
            r#"[{"zip_code":"12180","count":1,"similar_zips":[{"zip_code":"12207","population":null,"median_income":null,"similarity":1.0}]}]"#,
        )
        .unwrap();
        let ticket = session.begin_similarity_load();
        session.finish_similarity_load(ticket, Ok(index));
        assert!(session.highlight().contains("12207"));

        session.clear_selection();
        assert!(session.highlight().is_empty());
        assert!(session.selected_zip().is_none());
    }

    #[test]
    fn filter_and_annotation_flow_through_views() {
        let mut session = DashboardSession::new(
            DashboardConfig::default().with_layout(ColumnLayout::enrollment_v1()),
        );
        let ticket = session.begin_rows_load();
        session.finish_rows_load(ticket, Ok(rows(&[("Troy", "12180"), ("Albany", "12207")])));

        session.set_filter(Some(FilterSpec::text(Column::City, "alb").unwrap()));
        let view = session.table_view();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].row_id, RowId(1));

        assert!(session.set_annotation(view[0].row_id, "priority"));
        let export = session.export_visible_csv();
        assert!(export.lines().nth(1).unwrap().ends_with(",priority"));

        session.set_filter(None);
        assert_eq!(session.visible_rows().len(), 2);
        assert_eq!(session.chart(Column::State)[0].count, 2);
    }

    #[test]
    fn rendered_feature_check_lists_missing_members() {
        let mut session = DashboardSession::new(DashboardConfig::default());
        session.select_zip("12180");
        assert_eq!(session.check_rendered_features(["12180"]), Vec::<String>::new());
        assert_eq!(session.check_rendered_features(["10001"]), vec!["12180"]);
    }
}
