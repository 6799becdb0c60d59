use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimetableError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read workbook: {0}")]
    WorkbookRead(#[from] calamine::XlsxError),

    #[error("failed to write workbook: {0}")]
    WorkbookWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("malformed timetable source: {0}")]
    MalformedSource(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),
}
