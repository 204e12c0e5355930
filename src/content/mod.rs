//! Inline content subsystem
//!
//! Scans question rich text for embedded image references and LaTeX
//! math spans, substituting renderer-produced, asset-store-backed
//! markup into two parallel encodings: one for the packaged XML, one
//! for the HTML preview.

mod equation;
mod errors;
mod processor;

pub use equation::{EquationRenderer, LatexConfig, RenderedEquation};
pub use errors::{ContentError, ContentResult, RenderError};
pub use processor::{ProcessedText, EMBED_URL_STUB};

pub(crate) use equation::EquationCache;
pub(crate) use processor::{equation_markup, image_tags, process, InlineContext};
