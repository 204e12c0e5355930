//! Inline content errors

use thiserror::Error;

use crate::assets::AssetError;

/// Result type for inline content processing
pub type ContentResult<T> = Result<T, ContentError>;

/// Failures while rewriting rich text. Malformed image tags are not an
/// error (they pass through verbatim); everything here is fatal.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Odd number of `$` or `$$` delimiters: a formula was opened and
    /// never closed. Rendering the remainder silently would drop or
    /// mangle caller text, so this is rejected outright.
    #[error("Unbalanced {delimiter} math delimiter in text: {text}")]
    UnbalancedMath { delimiter: &'static str, text: String },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// The external typesetter failed for one formula. Carries the formula
/// text for diagnosis; there is no retry and no partial package.
#[derive(Debug, Error)]
#[error("Equation render failed for '{formula}': {reason}")]
pub struct RenderError {
    pub formula: String,
    pub reason: String,
}

impl RenderError {
    pub fn new(formula: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
            reason: reason.into(),
        }
    }
}
