mod columns;
mod conflicts;
mod csv_out;
mod error;
mod export;
mod filter;
mod fragments;
mod grid;
mod model;
mod options;
mod selection;
mod subjects;
mod warning;

use std::path::Path;

use crate::columns::{dedupe_columns, promote_header};
use crate::conflicts::resolve_conflicts;
use crate::csv_out::{write_csv, write_csv_to_string};
use crate::export::{write_personal_workbook, write_personal_workbook_to_path};
use crate::fragments::merge_fragments;
use crate::grid::{LoadedGrid, load_grid_from_bytes, load_grid_from_path};
use crate::warning::WarningCode;

pub use error::TimetableError;
pub use export::{XLSX_MIME_TYPE, download_file_name};
pub use filter::filter_timetable;
pub use grid::apply_merged_regions;
pub use model::{
    Cell, Column, MergedRegion, NormalizedTable, PersonalRow, PersonalTable, RawGrid,
    RegionBounds,
};
pub use options::{DEFAULT_ROW_LABEL, DEFAULT_SHEET_NAME, ExportOptions, NormalizeOptions};
pub use selection::Selection;
pub use subjects::{SubjectUniverse, extract_subjects};
pub use warning::{PipelineWarning, WarningCode as PipelineWarningCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationReport {
    pub row_count: usize,
    pub column_count: usize,
    pub merged_region_count: usize,
    pub subject_count: usize,
    pub warnings: Vec<PipelineWarning>,
}

/// Outcome of applying a selection to a normalized table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Personalized {
    NothingSelected(PipelineWarning),
    Table(PersonalTable),
}

/// Runs header promotion, column deduplication, repeat suppression and
/// fragment folding over an already merge-propagated grid.
pub fn normalize_grid(
    grid: &RawGrid,
    options: &NormalizeOptions,
) -> Result<NormalizedTable, TimetableError> {
    options.validate()?;

    let headered = promote_header(grid)?;
    let deduped = dedupe_columns(&headered, &options.row_label_name);
    let resolved = resolve_conflicts(&deduped, &options.empty_markers)?;
    let merged = merge_fragments(&resolved);
    NormalizedTable::try_from(merged)
}

fn finish_normalization(
    loaded: LoadedGrid,
    options: &NormalizeOptions,
) -> Result<(NormalizedTable, NormalizationReport), TimetableError> {
    let LoadedGrid {
        grid,
        merged_region_count,
        mut warnings,
    } = loaded;

    let table = normalize_grid(&grid, options)?;
    let subjects = extract_subjects(&table);
    if subjects.is_empty() {
        warnings.push(PipelineWarning::new(
            WarningCode::EmptySubjectUniverse,
            "no subject tokens found; subjects must be entered manually",
        ));
    }

    tracing::debug!(
        rows = table.row_count(),
        columns = table.columns().len(),
        subjects = subjects.len(),
        "normalized timetable"
    );

    let report = NormalizationReport {
        row_count: table.row_count(),
        column_count: table.columns().len(),
        merged_region_count,
        subject_count: subjects.len(),
        warnings,
    };
    Ok((table, report))
}

pub fn normalize_workbook_bytes(
    input_xlsx: &[u8],
    options: &NormalizeOptions,
) -> Result<(NormalizedTable, NormalizationReport), TimetableError> {
    let loaded = load_grid_from_bytes(input_xlsx)?;
    finish_normalization(loaded, options)
}

pub fn normalize_workbook(
    input_xlsx: &Path,
    options: &NormalizeOptions,
) -> Result<(NormalizedTable, NormalizationReport), TimetableError> {
    let loaded = load_grid_from_path(input_xlsx)?;
    finish_normalization(loaded, options)
}

/// Applies `selection`; an empty selection is reported, not computed.
#[must_use]
pub fn personalize(table: &NormalizedTable, selection: &Selection) -> Personalized {
    match filter_timetable(table, selection) {
        Some(personal) => Personalized::Table(personal),
        None => Personalized::NothingSelected(PipelineWarning::new(
            WarningCode::EmptySelection,
            "select at least one subject to generate a timetable",
        )),
    }
}

pub fn export_personal_timetable(
    table: &PersonalTable,
    options: &ExportOptions,
) -> Result<Vec<u8>, TimetableError> {
    write_personal_workbook(table, options)
}

pub fn export_personal_timetable_to_path(
    table: &PersonalTable,
    output_xlsx: &Path,
    options: &ExportOptions,
) -> Result<(), TimetableError> {
    write_personal_workbook_to_path(table, output_xlsx, options)
}

pub fn normalized_table_to_csv(
    table: &NormalizedTable,
    output_csv: &Path,
    delimiter: u8,
) -> Result<(), TimetableError> {
    write_csv(output_csv, table, delimiter)
}

pub fn personal_table_to_csv_string(
    table: &PersonalTable,
    delimiter: u8,
) -> Result<String, TimetableError> {
    write_csv_to_string(table, delimiter)
}

#[cfg(test)]
mod tests {
    use super::{NormalizeOptions, Personalized, normalize_grid, personalize};
    use crate::model::RawGrid;
    use crate::selection::Selection;
    use crate::warning::WarningCode;

    fn text(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    /// Two sub-columns per day, the second holding room numbers, plus a
    /// replicated time column and a stale repeat from an unmerged block.
    fn messy_grid() -> RawGrid {
        RawGrid::from_rows(vec![
            vec![text("Slot"), text("Mon"), text("Mon"), text("Slot copy"), text("Tue")],
            vec![text("9am"), text("ES-1"), text("CR-17"), text("9am"), text("MA-1 CR-5")],
            vec![text("9am"), text("ES-1"), text("CR-17"), text("9am"), text("None")],
            vec![text("10am"), None, text("CR-18"), text("10am"), text("ES-10 CR-2")],
        ])
    }

    #[test]
    fn normalizes_messy_grid() {
        let table = normalize_grid(&messy_grid(), &NormalizeOptions::default()).expect("normalize");

        assert_eq!(table.column_names(), vec!["Day/time", "Mon", "Tue"]);
        assert_eq!(
            table.columns()[1].cells,
            vec![text("ES-1 CR-17"), None, text("CR-18")]
        );
        assert_eq!(
            table.columns()[2].cells,
            vec![text("MA-1 CR-5"), None, text("ES-10 CR-2")]
        );
    }

    #[test]
    fn personalizes_with_exact_tokens() {
        let table = normalize_grid(&messy_grid(), &NormalizeOptions::default()).expect("normalize");

        let Personalized::Table(personal) = personalize(&table, &Selection::parse_list("ES-1"))
        else {
            panic!("selection is not empty");
        };
        assert_eq!(personal.labels(), vec!["9am", "10am"]);
        assert_eq!(personal.cell("9am", "Mon"), Some("ES-1 CR-17"));
        assert_eq!(personal.cell("10am", "Tue"), Some(""));
    }

    #[test]
    fn empty_selection_is_a_warning() {
        let table = normalize_grid(&messy_grid(), &NormalizeOptions::default()).expect("normalize");
        let Personalized::NothingSelected(warning) = personalize(&table, &Selection::default())
        else {
            panic!("empty selection must not generate");
        };
        assert_eq!(warning.code, WarningCode::EmptySelection);
    }

    #[test]
    fn custom_row_label_name() {
        let options = NormalizeOptions {
            row_label_name: "Slot".to_string(),
            ..NormalizeOptions::default()
        };
        let table = normalize_grid(&messy_grid(), &options).expect("normalize");
        assert_eq!(table.row_label_column().name, "Slot");
    }
}
