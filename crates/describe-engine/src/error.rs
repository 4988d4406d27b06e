use std::path::PathBuf;

use describe_model::ConfigError;
use thiserror::Error;

use crate::BoxError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("schema resolution failed: {0}")]
    Schema(#[source] BoxError),

    #[error("field `{field}`: data retrieval failed: {source}")]
    FieldData {
        field: String,
        #[source]
        source: BoxError,
    },

    #[error("field `{field}`: render failed: {source}")]
    Render {
        field: String,
        #[source]
        source: BoxError,
    },

    #[error("field `{field}` is not in the query results")]
    UnknownField { field: String },

    #[error("field `{field}`: only one level of nesting is supported")]
    UnsupportedNesting { field: String },

    #[error("no fields to plot")]
    NoFields,

    #[error(transparent)]
    Index(#[from] IndexError),
}

impl EngineError {
    /// The field the run stopped at, if the failure was field specific.
    pub fn field(&self) -> Option<&str> {
        match self {
            EngineError::FieldData { field, .. }
            | EngineError::Render { field, .. }
            | EngineError::UnknownField { field }
            | EngineError::UnsupportedNesting { field } => Some(field),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("output directory not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write index {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
