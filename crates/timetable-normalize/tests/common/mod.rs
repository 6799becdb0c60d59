use std::path::Path;

use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

/// Inclusive `(first_row, first_col, last_row, last_col)` merge span.
pub type Merge = (u32, u16, u32, u16);

fn inside(merges: &[Merge], row: u32, col: u16) -> bool {
    merges
        .iter()
        .any(|&(r1, c1, r2, c2)| (r1..=r2).contains(&row) && (c1..=c2).contains(&col))
}

/// Writes a single-sheet workbook; merge spans take the text of their anchor
/// cell in `rows`. Empty strings are left unwritten.
pub fn create_test_xlsx(
    path: &Path,
    rows: &[&[&str]],
    merges: &[Merge],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let format = Format::new();

    for (row_idx, cells) in rows.iter().enumerate() {
        let row = u32::try_from(row_idx)?;
        for (col_idx, text) in cells.iter().enumerate() {
            let col = u16::try_from(col_idx)?;
            if text.is_empty() || inside(merges, row, col) {
                continue;
            }
            worksheet.write_string(row, col, *text)?;
        }
    }

    for &(r1, c1, r2, c2) in merges {
        let anchor = rows[r1 as usize][c1 as usize];
        worksheet.merge_range(r1, c1, r2, c2, anchor, &format)?;
    }

    workbook.save(path)?;
    Ok(())
}

/// Header merged across two sub-columns for 9:00, a day label merged down two
/// rows, and one activity merged across both 9:00 sub-columns.
pub fn create_campus_timetable(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    create_test_xlsx(
        path,
        &[
            &["Day", "9:00", "", "10:00"],
            &["Mon", "ES-1", "CR-17", "MA-1 CR-5"],
            &["", "FIN-2", "CR-3", ""],
            &["Tue", "ES-1", "", "ES-10 CR-2"],
        ],
        &[(0, 1, 0, 2), (1, 0, 2, 0), (3, 1, 3, 2)],
    )
}

/// Time-slot headers stored as clock times formatted `hh:mm`, the way
/// spreadsheet editors save a typed `9:00`.
pub fn create_time_header_timetable(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let clock = Format::new().set_num_format("hh:mm");

    worksheet.write_string(0, 0, "Day")?;
    worksheet.write_datetime_with_format(0, 1, &ExcelDateTime::from_hms(9, 0, 0)?, &clock)?;
    worksheet.write_datetime_with_format(0, 2, &ExcelDateTime::from_hms(10, 30, 0)?, &clock)?;
    worksheet.write_string(1, 0, "Mon")?;
    worksheet.write_string(1, 1, "ES-1 CR-17")?;
    worksheet.write_string(1, 2, "MA-1 CR-5")?;

    workbook.save(path)?;
    Ok(())
}
