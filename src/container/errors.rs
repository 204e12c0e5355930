//! Container errors

use thiserror::Error;

/// Result type for container operations
pub type ContainerResult<T> = Result<T, ContainerError>;

/// Failures in the underlying archive writer. All of these abort package
/// construction; there is no partial-success mode.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("I/O error writing container entry {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Container already finished")]
    Finished,
}
