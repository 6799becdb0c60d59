use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::NormalizedTable;

/// Sorted set of selectable subject tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectUniverse(BTreeSet<String>);

impl SubjectUniverse {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0.into_iter().collect()
    }
}

/// Collects the first whitespace token of every non-empty data cell.
#[must_use]
pub fn extract_subjects(table: &NormalizedTable) -> SubjectUniverse {
    let tokens = table
        .data_columns()
        .iter()
        .flat_map(|column| column.cells.iter().flatten())
        .filter_map(|text| text.split_whitespace().next())
        .map(str::to_string)
        .collect();
    SubjectUniverse(tokens)
}
