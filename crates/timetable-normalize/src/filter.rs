use std::collections::HashMap;

use crate::model::{NormalizedTable, PersonalRow, PersonalTable};
use crate::selection::Selection;

/// Keeps the cells matching `selection` and collapses rows by label.
///
/// Every distinct non-empty row label of `table` yields exactly one row, in
/// first-occurrence order, whether or not anything matched. Matching cells of
/// rows sharing a label are space-joined per column in source order. Returns
/// `None` for an empty selection.
#[must_use]
pub fn filter_timetable(table: &NormalizedTable, selection: &Selection) -> Option<PersonalTable> {
    if selection.is_empty() {
        return None;
    }

    let labels = table.distinct_row_labels();
    let slots = labels
        .iter()
        .enumerate()
        .map(|(slot, label)| (*label, slot))
        .collect::<HashMap<_, _>>();

    let data_columns = table.data_columns();
    let mut rows = labels
        .iter()
        .map(|label| PersonalRow {
            label: (*label).to_string(),
            cells: vec![String::new(); data_columns.len()],
        })
        .collect::<Vec<_>>();

    let mut matched = 0_usize;
    for (row_index, label) in table.row_labels().iter().enumerate() {
        let Some(label) = label.as_deref() else {
            continue;
        };
        let row = &mut rows[slots[label]];

        for (cell, column) in row.cells.iter_mut().zip(data_columns) {
            let Some(text) = column.cells[row_index].as_deref() else {
                continue;
            };
            if !selection.matches(text) {
                continue;
            }
            if !cell.is_empty() {
                cell.push(' ');
            }
            cell.push_str(text);
            matched += 1;
        }
    }

    tracing::debug!(
        selected = selection.len(),
        matched,
        rows = rows.len(),
        "filtered timetable"
    );

    Some(PersonalTable {
        columns: table.column_names().into_iter().map(str::to_string).collect(),
        rows,
    })
}
