use std::path::Path;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::error::TimetableError;
use crate::model::PersonalTable;
use crate::options::ExportOptions;

pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// `personal_timetable_<label>.xlsx`, label lower-cased with spaces as `_`.
#[must_use]
pub fn download_file_name(context_label: &str) -> String {
    let slug = context_label.trim().to_lowercase().replace(' ', "_");
    format!("personal_timetable_{slug}.xlsx")
}

pub(crate) fn write_personal_workbook(
    table: &PersonalTable,
    options: &ExportOptions,
) -> Result<Vec<u8>, TimetableError> {
    let mut workbook = build_workbook(table, options)?;
    Ok(workbook.save_to_buffer()?)
}

pub(crate) fn write_personal_workbook_to_path(
    table: &PersonalTable,
    path: &Path,
    options: &ExportOptions,
) -> Result<(), TimetableError> {
    let mut workbook = build_workbook(table, options)?;
    workbook.save(path)?;
    Ok(())
}

fn build_workbook(
    table: &PersonalTable,
    options: &ExportOptions,
) -> Result<Workbook, TimetableError> {
    options.validate()?;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&options.sheet_name)?;
    write_table(worksheet, table, options)?;
    Ok(workbook)
}

fn cell_format() -> Format {
    Format::new()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

/// Header row and row-label column are bold; every cell is bordered.
fn write_table(
    worksheet: &mut Worksheet,
    table: &PersonalTable,
    options: &ExportOptions,
) -> Result<(), TimetableError> {
    let body = cell_format();
    let bold = cell_format().set_bold();

    for (col, name) in table.columns.iter().enumerate() {
        write_cell(worksheet, 0, col, name, &bold)?;
    }

    for (index, row) in table.rows.iter().enumerate() {
        let row_idx = index + 1;
        write_cell(worksheet, row_idx, 0, &row.label, &bold)?;
        for (offset, text) in row.cells.iter().enumerate() {
            write_cell(worksheet, row_idx, offset + 1, text, &body)?;
        }
    }

    for row_idx in 0..=table.rows.len() {
        worksheet.set_row_height(row_num(row_idx)?, options.row_height)?;
    }
    for col in 0..table.columns.len() {
        worksheet.set_column_width(col_num(col)?, options.column_width)?;
    }

    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    text: &str,
    format: &Format,
) -> Result<(), TimetableError> {
    if text.is_empty() {
        worksheet.write_blank(row_num(row_idx)?, col_num(col_idx)?, format)?;
    } else {
        worksheet.write_string_with_format(row_num(row_idx)?, col_num(col_idx)?, text, format)?;
    }
    Ok(())
}

fn row_num(value: usize) -> Result<u32, TimetableError> {
    u32::try_from(value)
        .map_err(|_| TimetableError::InvalidOption(format!("row index overflow: {value}")))
}

fn col_num(value: usize) -> Result<u16, TimetableError> {
    u16::try_from(value)
        .map_err(|_| TimetableError::InvalidOption(format!("column index overflow: {value}")))
}

#[cfg(test)]
mod tests {
    use super::{download_file_name, write_personal_workbook};
    use crate::model::{PersonalRow, PersonalTable};
    use crate::options::ExportOptions;

    #[test]
    fn file_name_is_slugged_context_label() {
        assert_eq!(
            download_file_name("New Delhi"),
            "personal_timetable_new_delhi.xlsx"
        );
        assert_eq!(download_file_name("Gurgaon"), "personal_timetable_gurgaon.xlsx");
    }

    #[test]
    fn writes_zip_container() {
        let table = PersonalTable {
            columns: vec!["Day/time".to_string(), "Mon".to_string()],
            rows: vec![PersonalRow {
                label: "Mon-9am".to_string(),
                cells: vec!["ES-1 CR-17".to_string()],
            }],
        };
        let bytes = write_personal_workbook(&table, &ExportOptions::default()).expect("export");
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn invalid_sheet_name_is_rejected_before_writing() {
        let table = PersonalTable {
            columns: vec!["Day/time".to_string()],
            rows: Vec::new(),
        };
        let options = ExportOptions {
            sheet_name: String::new(),
            ..ExportOptions::default()
        };
        assert!(write_personal_workbook(&table, &options).is_err());
    }
}
