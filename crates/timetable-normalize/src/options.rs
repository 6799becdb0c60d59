use crate::error::TimetableError;

/// Canonical name given to the row-label column.
pub const DEFAULT_ROW_LABEL: &str = "Day/time";
pub const DEFAULT_SHEET_NAME: &str = "Personal Timetable";

const SHEET_NAME_MAX_LEN: usize = 31;
const SHEET_NAME_ILLEGAL: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub row_label_name: String,
    /// Cell texts treated as empty once repeats are suppressed.
    pub empty_markers: Vec<String>,
}

impl NormalizeOptions {
    pub fn validate(&self) -> Result<(), TimetableError> {
        if self.row_label_name.trim().is_empty() {
            return Err(TimetableError::InvalidOption(
                "row label name must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            row_label_name: DEFAULT_ROW_LABEL.to_string(),
            empty_markers: vec!["None".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub sheet_name: String,
    pub row_height: f64,
    pub column_width: f64,
}

impl ExportOptions {
    pub fn validate(&self) -> Result<(), TimetableError> {
        let name = self.sheet_name.as_str();
        if name.is_empty() || name.chars().count() > SHEET_NAME_MAX_LEN {
            return Err(TimetableError::InvalidOption(format!(
                "sheet name must be 1..={SHEET_NAME_MAX_LEN} characters"
            )));
        }
        if let Some(ch) = name.chars().find(|ch| SHEET_NAME_ILLEGAL.contains(ch)) {
            return Err(TimetableError::InvalidOption(format!(
                "sheet name contains illegal character '{ch}'"
            )));
        }
        if self.row_height <= 0.0 || self.column_width <= 0.0 {
            return Err(TimetableError::InvalidOption(
                "row height and column width must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            row_height: 32.4,
            column_width: 20.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ExportOptions, NormalizeOptions};

    #[test]
    fn defaults_are_valid() {
        NormalizeOptions::default().validate().expect("normalize defaults");
        ExportOptions::default().validate().expect("export defaults");
    }

    #[test]
    fn rejects_blank_row_label() {
        let options = NormalizeOptions {
            row_label_name: "  ".to_string(),
            ..NormalizeOptions::default()
        };
        let err = options.validate().expect_err("blank label");
        assert!(err.to_string().contains("row label name"));
    }

    #[test]
    fn rejects_illegal_sheet_names() {
        let options = ExportOptions {
            sheet_name: "Week 1/2".to_string(),
            ..ExportOptions::default()
        };
        let err = options.validate().expect_err("slash is illegal");
        assert!(err.to_string().contains("illegal character '/'"));

        let options = ExportOptions {
            sheet_name: "x".repeat(32),
            ..ExportOptions::default()
        };
        assert!(options.validate().is_err());
    }
}
