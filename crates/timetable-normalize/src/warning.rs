use crate::model::RegionBounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCode {
    /// No subject was selected; nothing was generated.
    EmptySelection,
    /// Normalization left no token to offer; callers fall back to manual entry.
    EmptySubjectUniverse,
    /// A merged region had an empty anchor and blanked its whole span.
    NullMergeAnchor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineWarning {
    pub code: WarningCode,
    pub message: String,
    pub region: Option<RegionBounds>,
}

impl PipelineWarning {
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            region: None,
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: RegionBounds) -> Self {
        self.region = Some(region);
        self
    }
}
