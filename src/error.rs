use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the pipeline. Configuration problems abort the whole
/// build; input problems are caught before any node generation starts.
#[derive(Debug, Error)]
pub enum VisualizerError {
    #[error(
        "too many distinct values in {column} column ({count} >= {limit}); \
         remove it from the analysis or raise the distinct value limit"
    )]
    TooManyDistinctValues {
        column: String,
        count: usize,
        limit: usize,
    },

    #[error("dataset has no columns")]
    EmptyDataset,

    #[error("column {0} not found in dataset")]
    UnknownColumn(String),

    #[error("failed to read {path}: {source}")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to rasterize visualization: {0}")]
    Render(String),
}
