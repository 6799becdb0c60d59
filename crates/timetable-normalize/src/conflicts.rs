use std::collections::HashSet;

use crate::error::TimetableError;
use crate::model::{Column, HeaderedTable};

/// Identity of a cell for repeat suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SeenCell<'a> {
    column: &'a str,
    row_label: Option<&'a str>,
    value: Option<&'a str>,
}

/// Blanks repeated `(column name, row label, value)` cells and drops columns
/// left without content.
///
/// Names are coerced to text first (a missing header becomes `""`), so
/// same-named columns share one seen set. `empty_markers` are cleared in every
/// column after suppression. The row-label column is never dropped, but must
/// hold at least one label when the table has rows.
pub(crate) fn resolve_conflicts(
    table: &HeaderedTable,
    empty_markers: &[String],
) -> Result<Vec<Column>, TimetableError> {
    let names = table
        .columns
        .iter()
        .map(|column| column.name.clone().unwrap_or_default())
        .collect::<Vec<_>>();

    let mut columns = table
        .columns
        .iter()
        .zip(&names)
        .map(|(column, name)| Column::new(name.clone(), column.cells.clone()))
        .collect::<Vec<_>>();

    let Some(labels) = table.columns.first().map(|column| &column.cells) else {
        return Err(TimetableError::MalformedSource(
            "table has no row-label column".to_string(),
        ));
    };

    let mut seen = HashSet::new();
    let mut blanked = 0_usize;
    for (index, column) in table.columns.iter().enumerate().skip(1) {
        for (row, value) in column.cells.iter().enumerate() {
            let key = SeenCell {
                column: &names[index],
                row_label: labels[row].as_deref(),
                value: value.as_deref(),
            };
            if !seen.insert(key) && value.is_some() {
                columns[index].cells[row] = None;
                blanked += 1;
            }
        }
    }

    for column in &mut columns {
        for cell in &mut column.cells {
            if cell
                .as_deref()
                .is_some_and(|text| empty_markers.iter().any(|marker| marker == text))
            {
                *cell = None;
            }
        }
    }

    let before = columns.len();
    let mut index = 0_usize;
    columns.retain(|column| {
        let keep = index == 0 || !column.is_blank();
        index += 1;
        keep
    });

    if !columns[0].cells.is_empty() && columns[0].is_blank() {
        return Err(TimetableError::MalformedSource(
            "row-label column has no values".to_string(),
        ));
    }

    tracing::debug!(
        blanked,
        dropped = before - columns.len(),
        "resolved repeated cells"
    );

    Ok(columns)
}
