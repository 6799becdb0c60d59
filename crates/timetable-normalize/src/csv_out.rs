use std::path::Path;

use csv::WriterBuilder;

use crate::error::TimetableError;
use crate::model::{NormalizedTable, PersonalTable};

/// Header plus row records, empty cells as empty fields.
pub(crate) trait CsvRecords {
    fn header(&self) -> Vec<&str>;
    fn records(&self) -> Vec<Vec<&str>>;
}

impl CsvRecords for NormalizedTable {
    fn header(&self) -> Vec<&str> {
        self.column_names()
    }

    fn records(&self) -> Vec<Vec<&str>> {
        (0..self.row_count())
            .map(|row| {
                self.columns()
                    .iter()
                    .map(|column| column.cells[row].as_deref().unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}

impl CsvRecords for PersonalTable {
    fn header(&self) -> Vec<&str> {
        self.columns.iter().map(String::as_str).collect()
    }

    fn records(&self) -> Vec<Vec<&str>> {
        self.rows
            .iter()
            .map(|row| {
                std::iter::once(row.label.as_str())
                    .chain(row.cells.iter().map(String::as_str))
                    .collect()
            })
            .collect()
    }
}

pub(crate) fn write_csv<T: CsvRecords>(
    path: &Path,
    table: &T,
    delimiter: u8,
) -> Result<(), TimetableError> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    writer.write_record(table.header())?;
    for record in table.records() {
        writer.write_record(record)?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn write_csv_to_string<T: CsvRecords>(
    table: &T,
    delimiter: u8,
) -> Result<String, TimetableError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::<u8>::new());
    writer.write_record(table.header())?;
    for record in table.records() {
        writer.write_record(record)?;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|error| TimetableError::Csv(error.into_error().into()))?;
    String::from_utf8(bytes)
        .map_err(|error| TimetableError::InvalidOption(format!("invalid utf-8 csv output: {error}")))
}

#[cfg(test)]
mod tests {
    use super::write_csv_to_string;
    use crate::model::{Column, NormalizedTable, PersonalRow, PersonalTable};

    #[test]
    fn renders_normalized_table_with_empty_fields() {
        let table = NormalizedTable::try_from(vec![
            Column::new("Day/time", vec![Some("Mon".to_string()), Some("Tue".to_string())]),
            Column::new("9am", vec![Some("ES-1 CR-17".to_string()), None]),
        ])
        .expect("valid table");

        let csv = write_csv_to_string(&table, b',').expect("csv");
        assert_eq!(csv, "Day/time,9am\nMon,ES-1 CR-17\nTue,\n");
    }

    #[test]
    fn renders_personal_table_with_custom_delimiter() {
        let table = PersonalTable {
            columns: vec!["Day/time".to_string(), "9am".to_string()],
            rows: vec![PersonalRow {
                label: "Mon".to_string(),
                cells: vec!["ES-1".to_string()],
            }],
        };

        let csv = write_csv_to_string(&table, b';').expect("csv");
        assert_eq!(csv, "Day/time;9am\nMon;ES-1\n");
    }
}
