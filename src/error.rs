#[cfg(feature = "python")]
use pyo3::exceptions::PyRuntimeError;
#[cfg(feature = "python")]
use pyo3::PyErr;
use thiserror::Error;

/// Fatal failures: malformed inputs that abort a whole run.
#[derive(Error, Debug)]
pub enum EmissionsError {
    #[error("Missing required data tables: {}", .0.join(", "))]
    MissingTables(Vec<String>),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures raised while evaluating a lookup.
///
/// These never cross the lookup boundary: they are logged, reported to the
/// observer and turned into an empty result.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Invalid operator '{0}'")]
    InvalidComparator(String),

    #[error("Invalid criteria format for column '{key}': expected 2 or 3 elements, got {len}")]
    MalformedPredicate { key: String, len: usize },

    #[error("Unsupported criteria value for column '{0}'")]
    UnsupportedValue(String),

    #[error("Invalid output format '{0}'. Use 'dataframe' or 'dictionary_list'")]
    InvalidOutputFormat(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

#[cfg(feature = "python")]
impl From<EmissionsError> for PyErr {
    fn from(err: EmissionsError) -> PyErr {
        PyRuntimeError::new_err(err.to_string())
    }
}
