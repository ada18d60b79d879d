use std::path::PathBuf;

use thiserror::Error;

/// Fatal input problems. Any of these aborts the run before output is written.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot open input {}: {source}", path.display())]
    InputOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("input {} is missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}
