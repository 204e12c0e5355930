//! Equation rendering seam and package-wide cache
//!
//! Formulas are typeset by an external renderer consumed as a black box:
//! formula text plus a display-mode flag in, bitmap bytes plus pixel
//! dimensions out. The renderer must be deterministic for identical
//! inputs; the cache assumes it and renders each distinct
//! (formula, mode) pair exactly once per package.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::errors::RenderError;

/// Style options forwarded to the renderer, plus the pixel-to-em ratio
/// used to size inline equation images relative to the surrounding text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatexConfig {
    /// Rasterization density handed to the typesetter.
    pub dpi: u32,
    /// How many rendered pixels correspond to one em of question text.
    pub em_height_px: f64,
}

impl Default for LatexConfig {
    fn default() -> Self {
        Self {
            dpi: 125,
            em_height_px: 44.0,
        }
    }
}

/// One rendered formula bitmap.
#[derive(Debug, Clone)]
pub struct RenderedEquation {
    pub png: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

/// External typesetter interface.
pub trait EquationRenderer {
    /// Renders `formula` to a bitmap. `display` selects block-style
    /// typesetting; inline otherwise.
    fn render(
        &mut self,
        formula: &str,
        display: bool,
        options: &LatexConfig,
    ) -> Result<RenderedEquation, RenderError>;
}

/// Package-lifetime cache of finished equation markup, keyed by
/// (formula, mode). Unbounded; package sizes are modest.
#[derive(Default)]
pub(crate) struct EquationCache {
    rendered: HashMap<(String, bool), (String, String)>,
}

impl EquationCache {
    pub fn get(&self, formula: &str, display: bool) -> Option<&(String, String)> {
        self.rendered.get(&(formula.to_string(), display))
    }

    pub fn insert(&mut self, formula: &str, display: bool, markup: (String, String)) {
        self.rendered.insert((formula.to_string(), display), markup);
    }
}
