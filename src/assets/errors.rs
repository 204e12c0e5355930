//! Asset embedding errors

use thiserror::Error;

use crate::container::ContainerError;

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;

/// Failures while embedding binary assets. Both variants are fatal to
/// package construction; there is no retry.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Cannot read asset file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Container(#[from] ContainerError),
}
