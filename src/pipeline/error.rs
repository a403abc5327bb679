/// Failures that stop a pipeline run before a series is produced.
///
/// Individual rows whose date/time text cannot be parsed are not errors: they
/// are dropped and counted (see [`crate::pipeline::TimeIndexOutcome`]).
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to parse CSV payload: {0}")]
    Parse(String),

    #[error("Dataset must contain 'Date' and 'Time' columns (missing: {})", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("No data available ({dropped_rows} rows dropped)")]
    EmptyResult { dropped_rows: usize },
}

impl PipelineError {
    /// Empty results are a valid outcome that callers render as "no data available",
    /// not a processing fault.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, PipelineError::EmptyResult { .. })
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        PipelineError::Parse(err.to_string())
    }
}
