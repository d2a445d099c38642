use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failures that abort one validate, filter and calculate cycle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// Required columns are absent from the header.
    #[error("Dataset is missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// The input could not be decoded as a table.
    #[error("Unable to read the file as a table: {0}")]
    Parse(String),

    /// A value could not be used while building or filtering the dataset.
    #[error("Error processing the file: {0}")]
    Computation(String),
}

impl PipelineError {
    /// Every pipeline failure leaves the session usable; the user re-runs with a fixed input.
    pub fn is_recoverable(&self) -> bool {
        match self {
            PipelineError::Schema { .. } | PipelineError::Parse(_) | PipelineError::Computation(_) => {
                true
            }
        }
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        PipelineError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_message_lists_missing_columns() {
        let err = PipelineError::Schema {
            missing: vec!["teamlead".to_string(), "Campaign".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Dataset is missing required columns: teamlead, Campaign"
        );
    }

    #[test]
    fn all_kinds_are_recoverable() {
        assert!(PipelineError::Parse("bad".into()).is_recoverable());
        assert!(PipelineError::Computation("bad".into()).is_recoverable());
        assert!(PipelineError::Schema { missing: vec![] }.is_recoverable());
    }
}
