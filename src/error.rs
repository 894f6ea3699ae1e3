use std::path::PathBuf;

use crate::data::schema::MissingColumn;

/// Failures that stop the pipeline before any measurement file is read.
/// Everything that goes wrong later is absorbed into missing values.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{what} not found: {}", path.display())]
    MissingInput { what: &'static str, path: PathBuf },

    #[error("failed to read config {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read metadata table {}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("metadata table {} cannot be joined", path.display())]
    JoinKey {
        path: PathBuf,
        #[source]
        source: MissingColumn,
    },

    #[error("invalid file pattern '{pattern}'")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Failures while writing charts to disk.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to create export directory {}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to draw chart '{title}': {message}")]
    Draw { title: String, message: String },
}
