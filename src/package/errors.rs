//! Package-level errors

use thiserror::Error;

use crate::assets::AssetError;
use crate::container::ContainerError;
use crate::content::ContentError;

/// Result type for package operations
pub type PackageResult<T> = Result<T, PackageError>;

/// Fatal failures during package construction or finalize. Any of these
/// leaves the in-progress package invalid; the caller owns cleanup of a
/// half-written archive.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Asset(#[from] AssetError),
}
