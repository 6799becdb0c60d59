use std::collections::HashSet;

use crate::model::Column;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnRole {
    Regular,
    /// Repeat of an earlier name; its text folds into column `target`.
    Fragment { target: usize },
}

/// First occurrence of a name is regular; later ones are fragments of the
/// nearest regular column on their left.
fn assign_roles(columns: &[Column]) -> Vec<ColumnRole> {
    let mut seen = HashSet::new();
    let mut last_regular = 0_usize;
    columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            if seen.insert(column.name.as_str()) {
                last_regular = index;
                ColumnRole::Regular
            } else {
                ColumnRole::Fragment {
                    target: last_regular,
                }
            }
        })
        .collect()
}

/// Folds fragment columns into their target, space-joined, left to right,
/// then drops them.
pub(crate) fn merge_fragments(columns: &[Column]) -> Vec<Column> {
    let roles = assign_roles(columns);
    let mut out = columns.to_vec();

    for (index, role) in roles.iter().enumerate() {
        let ColumnRole::Fragment { target } = *role else {
            continue;
        };

        for (row, fragment) in columns[index].cells.iter().enumerate() {
            let Some(fragment) = fragment else {
                continue;
            };
            let cell = &mut out[target].cells[row];
            if let Some(existing) = cell {
                existing.push(' ');
                existing.push_str(fragment);
            } else {
                *cell = Some(fragment.clone());
            }
        }
    }

    let fragments = roles
        .iter()
        .filter(|role| matches!(role, ColumnRole::Fragment { .. }))
        .count();
    tracing::debug!(fragments, "folded fragment columns");

    out.into_iter()
        .zip(roles)
        .filter_map(|(column, role)| (role == ColumnRole::Regular).then_some(column))
        .collect()
}
