use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{Data, Dimensions, ExcelDateTime, Range, Reader, Xlsx, open_workbook};

use crate::error::TimetableError;
use crate::model::{Cell, MergedRegion, RawGrid, RegionBounds};
use crate::warning::{PipelineWarning, WarningCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedGrid {
    pub grid: RawGrid,
    pub merged_region_count: usize,
    pub warnings: Vec<PipelineWarning>,
}

pub(crate) fn load_grid_from_bytes(bytes: &[u8]) -> Result<LoadedGrid, TimetableError> {
    let workbook = Xlsx::new(Cursor::new(bytes))?;
    load_first_sheet(workbook)
}

pub(crate) fn load_grid_from_path(path: &Path) -> Result<LoadedGrid, TimetableError> {
    let workbook: Xlsx<_> = open_workbook(path)?;
    load_first_sheet(workbook)
}

fn load_first_sheet<RS>(mut workbook: Xlsx<RS>) -> Result<LoadedGrid, TimetableError>
where
    RS: Read + Seek,
{
    workbook.load_merged_regions()?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Err(TimetableError::MalformedSource(
            "workbook has no worksheet".to_string(),
        ));
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    let merges = workbook
        .worksheet_merge_cells(&sheet_name)
        .transpose()?
        .unwrap_or_default();

    let grid = grid_from_range(&range);
    let bounds = merges.iter().map(region_bounds).collect::<Vec<_>>();
    let (grid, warnings) = apply_merged_regions(&grid, &bounds);

    tracing::debug!(
        sheet = %sheet_name,
        rows = grid.height(),
        cols = grid.width(),
        merged_regions = bounds.len(),
        "loaded worksheet grid"
    );

    Ok(LoadedGrid {
        grid,
        merged_region_count: bounds.len(),
        warnings,
    })
}

fn region_bounds(dimensions: &Dimensions) -> RegionBounds {
    RegionBounds {
        min_row: dimensions.start.0 as usize,
        min_col: dimensions.start.1 as usize,
        max_row: dimensions.end.0 as usize,
        max_col: dimensions.end.1 as usize,
    }
}

/// Grid anchored at A1 so row and column indices match sheet coordinates.
fn grid_from_range(range: &Range<Data>) -> RawGrid {
    let Some((end_row, end_col)) = range.end() else {
        return RawGrid::default();
    };

    let rows = (0..=end_row)
        .map(|row| {
            (0..=end_col)
                .map(|col| range.get_value((row, col)).and_then(cell_text))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    RawGrid::from_rows(rows)
}

fn cell_text(value: &Data) -> Cell {
    let text = match value {
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => text.clone(),
        Data::Float(number) => number.to_string(),
        Data::Int(number) => number.to_string(),
        Data::Bool(flag) => if *flag { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(datetime) => datetime_text(datetime),
        Data::Error(error) => error.to_string(),
        _ => return None,
    };

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Time-only serials render as `%H:%M:%S`, dated ones as `%Y-%m-%d %H:%M:%S`.
fn datetime_text(datetime: &ExcelDateTime) -> String {
    if datetime.is_duration() {
        return datetime.as_f64().to_string();
    }
    let Some(value) = datetime.as_datetime() else {
        return datetime.as_f64().to_string();
    };

    if datetime.as_f64() < 1.0 {
        value.format("%H:%M:%S").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Fills every merged span with its anchor value.
///
/// Anchor values are captured for all regions before any cell is written, so
/// the result does not depend on region order. An empty anchor blanks its span
/// and is reported as [`WarningCode::NullMergeAnchor`].
pub fn apply_merged_regions(
    grid: &RawGrid,
    bounds: &[RegionBounds],
) -> (RawGrid, Vec<PipelineWarning>) {
    if bounds.is_empty() {
        return (grid.clone(), Vec::new());
    }

    let regions = bounds
        .iter()
        .map(|bounds| MergedRegion::capture(grid, *bounds))
        .collect::<Vec<_>>();

    let height = bounds.iter().map(|b| b.max_row + 1).max().unwrap_or(0);
    let width = bounds.iter().map(|b| b.max_col + 1).max().unwrap_or(0);
    let mut out = grid.expanded(height, width);

    let mut warnings = Vec::new();
    for region in regions {
        if region.value.is_none() {
            warnings.push(
                PipelineWarning::new(
                    WarningCode::NullMergeAnchor,
                    "merged region has an empty anchor cell; its span is left empty",
                )
                .with_region(region.bounds),
            );
        }

        for (row, col) in region.bounds.cells() {
            out.set(row, col, region.value.clone());
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "merged regions with empty anchors");
    }

    (out, warnings)
}

#[cfg(test)]
mod tests {
    use calamine::{Data, ExcelDateTime, ExcelDateTimeType};

    use super::{apply_merged_regions, cell_text};
    use crate::model::{RawGrid, RegionBounds};
    use crate::warning::WarningCode;

    fn text(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    fn bounds(min_row: usize, min_col: usize, max_row: usize, max_col: usize) -> RegionBounds {
        RegionBounds {
            min_row,
            min_col,
            max_row,
            max_col,
        }
    }

    #[test]
    fn fills_horizontal_and_vertical_spans() {
        let grid = RawGrid::from_rows(vec![
            vec![text("Day"), text("Mon"), text("stale")],
            vec![text("9am"), text("ES-1"), None],
            vec![None, None, None],
        ]);

        let (out, warnings) =
            apply_merged_regions(&grid, &[bounds(0, 1, 0, 2), bounds(1, 0, 2, 0)]);

        assert!(warnings.is_empty());
        assert_eq!(out.cell(0, 2), Some("Mon"));
        assert_eq!(out.cell(2, 0), Some("9am"));
        assert_eq!(out.cell(1, 2), None);
    }

    #[test]
    fn single_cell_region_keeps_its_value() {
        let grid = RawGrid::from_rows(vec![vec![text("a"), text("b")]]);
        let (out, _) = apply_merged_regions(&grid, &[bounds(0, 1, 0, 1)]);
        assert_eq!(out, grid);
    }

    #[test]
    fn every_cell_of_a_block_matches_the_anchor() {
        let grid = RawGrid::from_rows(vec![
            vec![text("x"), text("y"), text("z")],
            vec![text("p"), text("q"), text("r")],
        ]);
        let region = bounds(0, 0, 1, 2);
        let (out, _) = apply_merged_regions(&grid, &[region]);
        assert!(region.cells().all(|(row, col)| out.cell(row, col) == Some("x")));
    }

    #[test]
    fn empty_anchor_propagates_null_and_warns() {
        let grid = RawGrid::from_rows(vec![vec![None, text("leftover")]]);
        let region = bounds(0, 0, 0, 1);
        let (out, warnings) = apply_merged_regions(&grid, &[region]);

        assert_eq!(out.cell(0, 1), None);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, WarningCode::NullMergeAnchor);
        assert_eq!(warnings[0].region, Some(region));
    }

    #[test]
    fn region_past_the_used_range_grows_the_grid() {
        let grid = RawGrid::from_rows(vec![vec![text("Mon")]]);
        let (out, _) = apply_merged_regions(&grid, &[bounds(0, 0, 0, 2)]);
        assert_eq!(out.width(), 3);
        assert_eq!(out.cell(0, 2), Some("Mon"));
    }

    #[test]
    fn grid_without_regions_passes_through() {
        let grid = RawGrid::from_rows(vec![vec![text("a")], vec![text("b")]]);
        let (out, warnings) = apply_merged_regions(&grid, &[]);
        assert_eq!(out, grid);
        assert!(warnings.is_empty());
    }

    #[test]
    fn renders_cell_values_as_text() {
        assert_eq!(cell_text(&Data::Float(9.0)), text("9"));
        assert_eq!(cell_text(&Data::Float(9.5)), text("9.5"));
        assert_eq!(cell_text(&Data::Int(12)), text("12"));
        assert_eq!(cell_text(&Data::Bool(true)), text("TRUE"));
        assert_eq!(cell_text(&Data::String("  ".to_string())), None);
        assert_eq!(cell_text(&Data::Empty), None);
    }

    #[test]
    fn renders_time_and_date_cells_like_clock_text() {
        let nine = ExcelDateTime::new(0.375, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell_text(&Data::DateTime(nine)), text("09:00:00"));

        let half_past_one = ExcelDateTime::new(0.5625, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell_text(&Data::DateTime(half_past_one)), text("13:30:00"));

        let new_year_noon = ExcelDateTime::new(45658.5, ExcelDateTimeType::DateTime, false);
        assert_eq!(
            cell_text(&Data::DateTime(new_year_noon)),
            text("2025-01-01 12:00:00")
        );
    }
}
