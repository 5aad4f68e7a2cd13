use serde::{Deserialize, Serialize};

pub use crate::types::{AnnotationText, CategoryLabel, CellValue, NoticeMessage, ZipCode};

/// Stable position of a row inside a loaded store (0-based data line order).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub usize);

/// One demographic/enrollment record.
///
/// All fields are kept as source text; numeric columns are parsed on demand
/// by the filter engine so malformed cells never fail a load.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub city: CellValue,
    pub state: CellValue,
    pub zip_code: ZipCode,
    pub term: CellValue,
    pub population: CellValue,
    pub income: CellValue,
    pub bachelor_degree_pct: CellValue,
    pub median_age: CellValue,
    /// User annotation; empty until edited.
    pub annotation: AnnotationText,
}

impl Row {
    /// Text of the given filterable column.
    pub fn field(&self, column: Column) -> &str {
        match column {
            Column::City => &self.city,
            Column::State => &self.state,
            Column::ZipCode => &self.zip_code,
            Column::Term => &self.term,
            Column::Population => &self.population,
            Column::Income => &self.income,
            Column::BachelorDegree => &self.bachelor_degree_pct,
            Column::MedianAge => &self.median_age,
        }
    }

    /// All fields in export order, annotation last.
    pub fn cells(&self) -> [&str; 9] {
        [
            &self.city,
            &self.state,
            &self.zip_code,
            &self.term,
            &self.population,
            &self.income,
            &self.bachelor_degree_pct,
            &self.median_age,
            &self.annotation,
        ]
    }

    /// Build a row from cells in export order; missing cells default to empty.
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut slots: [String; 9] = Default::default();
        for (slot, value) in slots.iter_mut().zip(cells) {
            *slot = value.into();
        }
        let [
            city,
            state,
            zip_code,
            term,
            population,
            income,
            bachelor_degree_pct,
            median_age,
            annotation,
        ] = slots;
        Self {
            city,
            state,
            zip_code,
            term,
            population,
            income,
            bachelor_degree_pct,
            median_age,
            annotation,
        }
    }
}

/// Filterable row column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    City,
    State,
    ZipCode,
    Term,
    Population,
    Income,
    BachelorDegree,
    MedianAge,
}

impl Column {
    /// Every column in export order.
    pub const ALL: [Column; 8] = [
        Column::City,
        Column::State,
        Column::ZipCode,
        Column::Term,
        Column::Population,
        Column::Income,
        Column::BachelorDegree,
        Column::MedianAge,
    ];

    /// Header label used in exports.
    pub fn label(self) -> &'static str {
        match self {
            Column::City => "City",
            Column::State => "State",
            Column::ZipCode => "Zip Code",
            Column::Term => "Term",
            Column::Population => "Population",
            Column::Income => "Income",
            Column::BachelorDegree => "Bachelor Degree",
            Column::MedianAge => "Median Age",
        }
    }

    /// True for columns that only accept numeric range filters.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Column::Population | Column::Income | Column::BachelorDegree | Column::MedianAge
        )
    }
}

/// One precomputed similar ZIP code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimilarZip {
    pub zip_code: ZipCode,
    /// Raw census figure; may be fractional or a negative sentinel.
    #[serde(default)]
    pub population: Option<f64>,
    #[serde(default)]
    pub median_income: Option<f64>,
    /// Inverse-distance score; larger is more similar.
    #[serde(rename = "similarity")]
    pub similarity_score: f64,
}

/// Precomputed similarity record for one ZIP code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEntry {
    pub zip_code: ZipCode,
    /// Enrollment count that ranked this ZIP code.
    #[serde(default)]
    pub count: u64,
    /// Similar ZIP codes, most similar first.
    #[serde(default)]
    pub similar_zips: Vec<SimilarZip>,
}

/// Render-ready table row; rendering itself belongs to the UI layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableRowView {
    /// Row reference used for annotation edits.
    pub row_id: RowId,
    /// Display cells in export order, annotation last.
    pub cells: Vec<CellValue>,
}

/// Share of one category in a distribution.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryShare {
    pub label: CategoryLabel,
    pub count: usize,
    pub share: f64,
}

/// Severity of a user-visible notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Non-blocking message surfaced to the user interface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: NoticeMessage,
}

impl Notice {
    pub fn info(message: impl Into<NoticeMessage>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<NoticeMessage>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<NoticeMessage>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
