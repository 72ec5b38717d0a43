use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VizError>;

/// Fatal errors. Anything recoverable is a [`DataWarning`] instead.
#[derive(Error, Debug)]
pub enum VizError {
    /// The input file could not be read.
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but does not have the expected shape.
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// The schema configuration is invalid.
    #[error("Invalid schema configuration: {0}")]
    Config(String),

    /// Writing an exported table failed.
    #[error("Export failed: {0}")]
    Export(String),
}

impl VizError {
    /// Whether this error belongs to the data-format family (bad input file).
    pub fn is_data_format(&self) -> bool {
        matches!(self, VizError::Io { .. } | VizError::Json(_) | VizError::DataFormat(_))
    }
}

impl From<csv::Error> for VizError {
    fn from(e: csv::Error) -> Self {
        VizError::Export(e.to_string())
    }
}

/// Non-fatal conditions found while building a dataset. The pipeline keeps
/// going and produces empty series so the UI can show an empty state.
#[derive(Debug, Clone, PartialEq)]
pub enum DataWarning {
    NoTimeColumns,
    NoMemoryColumns,
    NoRowsAfterFiltering,
    MissingResultsKey(String),
    MissingConfiguredColumn { algorithm: String, column: String },
    SkippedRow { row: usize, reason: String },
}

impl std::fmt::Display for DataWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataWarning::NoTimeColumns => write!(f, "No time columns (*_time_s) found"),
            DataWarning::NoMemoryColumns => write!(f, "No memory columns (*_rss_kB) found"),
            DataWarning::NoRowsAfterFiltering => {
                write!(f, "No rows left after removing the warm-up pass")
            }
            DataWarning::MissingResultsKey(key) => {
                write!(f, "Document has no \"{key}\" list, treating it as empty")
            }
            DataWarning::MissingConfiguredColumn { algorithm, column } => {
                write!(f, "Column \"{column}\" configured for {algorithm} is not in the data")
            }
            DataWarning::SkippedRow { row, reason } => write!(f, "Skipped row {row}: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_format_family() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(VizError::Json(json_err).is_data_format());
        assert!(VizError::DataFormat("x".into()).is_data_format());
        assert!(!VizError::Config("x".into()).is_data_format());
    }

    #[test]
    fn warning_messages_name_the_problem() {
        let w = DataWarning::MissingConfiguredColumn {
            algorithm: "blocked".into(),
            column: "blocked_time_s".into(),
        };
        assert!(w.to_string().contains("blocked_time_s"));
        assert!(DataWarning::SkippedRow { row: 3, reason: "bad pass".into() }
            .to_string()
            .starts_with("Skipped row 3"));
    }
}
