use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TimetableError;

/// A single grid cell; `None` is an empty cell.
pub type Cell = Option<String>;

/// Rectangular grid of raw cell values. Row 0 is the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGrid {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl RawGrid {
    /// Builds a grid, padding ragged rows with empty cells.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { rows, width }
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .and_then(Option::as_deref)
    }

    /// Copy of the grid grown to at least `height` x `width`.
    pub(crate) fn expanded(&self, height: usize, width: usize) -> Self {
        let width = width.max(self.width);
        let mut rows = self.rows.clone();
        rows.resize_with(height.max(self.rows.len()), Vec::new);
        for row in &mut rows {
            row.resize(width, None);
        }
        Self { rows, width }
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: Cell) {
        if let Some(slot) = self.rows.get_mut(row).and_then(|cells| cells.get_mut(col)) {
            *slot = value;
        }
    }
}

/// Inclusive, 0-based bounds of a merged region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionBounds {
    pub min_row: usize,
    pub min_col: usize,
    pub max_row: usize,
    pub max_col: usize,
}

impl RegionBounds {
    pub(crate) fn cells(self) -> impl Iterator<Item = (usize, usize)> {
        (self.min_row..=self.max_row)
            .flat_map(move |row| (self.min_col..=self.max_col).map(move |col| (row, col)))
    }
}

/// A merged span together with the anchor value that fills it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRegion {
    pub bounds: RegionBounds,
    pub value: Cell,
}

impl MergedRegion {
    /// Reads the anchor (top-left) value of `bounds` from `grid`.
    #[must_use]
    pub fn capture(grid: &RawGrid, bounds: RegionBounds) -> Self {
        Self {
            bounds,
            value: grid.cell(bounds.min_row, bounds.min_col).map(str::to_string),
        }
    }
}

/// Column whose header is still the raw header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HeaderedColumn {
    pub name: Cell,
    pub cells: Vec<Cell>,
}

/// Header promoted, body not yet normalized. Column 0 is the row-label column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HeaderedTable {
    pub columns: Vec<HeaderedColumn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

/// Canonical timetable: first column holds row labels, column names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Column>", into = "Vec<Column>")]
pub struct NormalizedTable {
    columns: Vec<Column>,
}

impl NormalizedTable {
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    #[must_use]
    pub fn row_label_column(&self) -> &Column {
        &self.columns[0]
    }

    #[must_use]
    pub fn data_columns(&self) -> &[Column] {
        &self.columns[1..]
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns[0].cells.len()
    }

    #[must_use]
    pub fn row_labels(&self) -> &[Cell] {
        &self.columns[0].cells
    }

    /// Non-empty row labels, each once, in first-occurrence order.
    #[must_use]
    pub fn distinct_row_labels(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.row_labels()
            .iter()
            .flatten()
            .map(String::as_str)
            .filter(|label| seen.insert(*label))
            .collect()
    }
}

impl TryFrom<Vec<Column>> for NormalizedTable {
    type Error = TimetableError;

    fn try_from(columns: Vec<Column>) -> Result<Self, Self::Error> {
        let Some(first) = columns.first() else {
            return Err(TimetableError::MalformedSource(
                "table has no row-label column".to_string(),
            ));
        };

        let height = first.cells.len();
        if let Some(ragged) = columns.iter().find(|column| column.cells.len() != height) {
            return Err(TimetableError::MalformedSource(format!(
                "column '{}' has {} cells, expected {height}",
                ragged.name,
                ragged.cells.len()
            )));
        }

        let mut names = HashSet::new();
        if let Some(duplicate) = columns
            .iter()
            .find(|column| !names.insert(column.name.as_str()))
        {
            return Err(TimetableError::MalformedSource(format!(
                "duplicate column name '{}'",
                duplicate.name
            )));
        }

        Ok(Self { columns })
    }
}

impl From<NormalizedTable> for Vec<Column> {
    fn from(table: NormalizedTable) -> Self {
        table.columns
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalRow {
    pub label: String,
    /// One entry per data column; empty string when nothing matched.
    pub cells: Vec<String>,
}

/// Filtered timetable with one row per distinct row label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalTable {
    pub columns: Vec<String>,
    pub rows: Vec<PersonalRow>,
}

impl PersonalTable {
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.label.as_str()).collect()
    }

    /// Cell text by row label and column name, `None` when either is unknown.
    #[must_use]
    pub fn cell(&self, label: &str, column: &str) -> Option<&str> {
        let index = self
            .columns
            .iter()
            .skip(1)
            .position(|name| name == column)?;
        self.rows
            .iter()
            .find(|row| row.label == label)
            .and_then(|row| row.cells.get(index))
            .map(String::as_str)
    }
}
