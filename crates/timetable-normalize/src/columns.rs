use std::collections::HashSet;

use crate::error::TimetableError;
use crate::model::{Cell, HeaderedColumn, HeaderedTable, RawGrid};

/// Promotes row 0 to column names and transposes the body into columns.
pub(crate) fn promote_header(grid: &RawGrid) -> Result<HeaderedTable, TimetableError> {
    let Some((header, body)) = grid.rows().split_first() else {
        return Err(TimetableError::MalformedSource(
            "sheet has no header row".to_string(),
        ));
    };
    if header.is_empty() {
        return Err(TimetableError::MalformedSource(
            "header row has no columns".to_string(),
        ));
    }

    let columns = header
        .iter()
        .enumerate()
        .map(|(index, name)| HeaderedColumn {
            name: name.clone(),
            cells: body.iter().map(|row| row[index].clone()).collect(),
        })
        .collect();

    Ok(HeaderedTable { columns })
}

/// Drops redundant columns, then names the first column `row_label_name`.
///
/// Columns repeating an earlier `(name, values)` pair go first; of the rest,
/// any column whose values repeat an earlier kept column goes too, whatever
/// its name. The first occurrence always wins.
pub(crate) fn dedupe_columns(table: &HeaderedTable, row_label_name: &str) -> HeaderedTable {
    let mut seen_named = HashSet::new();
    let named_unique = table
        .columns
        .iter()
        .filter(|column| seen_named.insert((&column.name, column.cells.as_slice())))
        .collect::<Vec<_>>();

    let mut seen_values: HashSet<&[Cell]> = HashSet::new();
    let mut columns = named_unique
        .into_iter()
        .filter(|column| seen_values.insert(column.cells.as_slice()))
        .cloned()
        .collect::<Vec<_>>();

    if let Some(first) = columns.first_mut() {
        first.name = Some(row_label_name.to_string());
    }

    tracing::debug!(
        before = table.columns.len(),
        after = columns.len(),
        "deduplicated columns"
    );

    HeaderedTable { columns }
}

#[cfg(test)]
mod tests {
    use super::{dedupe_columns, promote_header};
    use crate::model::{HeaderedColumn, HeaderedTable, RawGrid};

    fn text(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    fn column(name: Option<&str>, cells: &[Option<&str>]) -> HeaderedColumn {
        HeaderedColumn {
            name: name.map(str::to_string),
            cells: cells.iter().map(|cell| cell.map(str::to_string)).collect(),
        }
    }

    fn names(table: &HeaderedTable) -> Vec<Option<&str>> {
        table
            .columns
            .iter()
            .map(|column| column.name.as_deref())
            .collect()
    }

    #[test]
    fn promotes_first_row_to_names() {
        let grid = RawGrid::from_rows(vec![
            vec![text("Day"), text("Mon")],
            vec![text("9am"), text("ES-1")],
        ]);
        let table = promote_header(&grid).expect("header should promote");
        assert_eq!(names(&table), vec![Some("Day"), Some("Mon")]);
        assert_eq!(table.columns[1].cells, vec![text("ES-1")]);
    }

    #[test]
    fn empty_grid_is_malformed() {
        let err = promote_header(&RawGrid::default()).expect_err("no header row");
        assert!(err.to_string().contains("no header row"));
    }

    #[test]
    fn header_only_sheet_has_empty_columns() {
        let grid = RawGrid::from_rows(vec![vec![text("Day"), text("Mon")]]);
        let table = promote_header(&grid).expect("header should promote");
        assert!(table.columns.iter().all(|column| column.cells.is_empty()));
    }

    #[test]
    fn drops_same_name_same_values_then_same_values() {
        let table = HeaderedTable {
            columns: vec![
                column(Some("Time"), &[Some("9am"), Some("10am")]),
                column(Some("Mon"), &[Some("ES-1"), None]),
                column(Some("Mon"), &[Some("ES-1"), None]),
                column(Some("Time "), &[Some("9am"), Some("10am")]),
                column(Some("Mon"), &[Some("MA-1"), None]),
            ],
        };

        let out = dedupe_columns(&table, "Day/time");
        assert_eq!(names(&out), vec![Some("Day/time"), Some("Mon"), Some("Mon")]);
        assert_eq!(out.columns[2].cells, vec![text("MA-1"), None]);
    }

    #[test]
    fn renames_first_column_even_without_header() {
        let table = HeaderedTable {
            columns: vec![column(None, &[Some("Mon-9am")])],
        };
        let out = dedupe_columns(&table, "Day/time");
        assert_eq!(names(&out), vec![Some("Day/time")]);
    }

    #[test]
    fn deduplication_is_idempotent() {
        let table = HeaderedTable {
            columns: vec![
                column(Some("Day"), &[Some("Mon"), Some("Mon")]),
                column(Some("A"), &[Some("x"), None]),
                column(Some("B"), &[Some("x"), None]),
                column(Some("A"), &[None, Some("y")]),
                column(Some("C"), &[Some("Mon"), Some("Mon")]),
            ],
        };

        let once = dedupe_columns(&table, "Day/time");
        let twice = dedupe_columns(&once, "Day/time");
        assert_eq!(once, twice);
        assert_eq!(once.columns.len(), 3);
    }
}
