//! Inline Content Processing Tests
//!
//! - Math spans render exactly once per distinct (formula, mode).
//! - Package and preview streams stay structurally parallel.
//! - Unbalanced delimiters are rejected, not silently mis-rendered.
//! - Image tags rewrite their src per stream; malformed tags pass
//!   through verbatim.

use std::fs;
use std::sync::{Arc, Mutex};

use quizpack::{
    EquationRenderer, LatexConfig, MemoryContainer, Package, PackageConfig, RenderError,
    RenderedEquation,
};
use tempfile::TempDir;

/// Records every render invocation for assertion.
struct CountingRenderer {
    calls: Arc<Mutex<Vec<(String, bool)>>>,
}

impl CountingRenderer {
    fn new() -> (Self, Arc<Mutex<Vec<(String, bool)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl EquationRenderer for CountingRenderer {
    fn render(
        &mut self,
        formula: &str,
        display: bool,
        _options: &LatexConfig,
    ) -> Result<RenderedEquation, RenderError> {
        self.calls.lock().unwrap().push((formula.to_string(), display));
        Ok(RenderedEquation {
            png: format!("png:{}:{}", formula, display).into_bytes(),
            width_px: 88,
            height_px: 44,
        })
    }
}

fn package_with_counter() -> (Package, Arc<Mutex<Vec<(String, bool)>>>) {
    let (renderer, calls) = CountingRenderer::new();
    let pkg = Package::with_container(
        Box::new(MemoryContainer::new()),
        PackageConfig::default(),
        Box::new(renderer),
    );
    (pkg, calls)
}

fn count_img_tags(text: &str) -> usize {
    text.matches("<img ").count()
}

#[test]
fn test_display_and_inline_math_render_separately() {
    let (mut pkg, calls) = package_with_counter();

    let processed = pkg.process_text("Solve $$x+1$$ and $y$").unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(
        calls.as_slice(),
        &[("x+1".to_string(), true), ("y".to_string(), false)]
    );

    // Both streams substituted the same number of spans.
    assert_eq!(count_img_tags(&processed.package), 2);
    assert_eq!(count_img_tags(&processed.preview), 2);
    assert!(processed.package.contains("@X@EmbeddedFile.requestUrlStub@X@bbcswebdav/xid-"));
    assert!(processed.preview.contains("csfiles/home_dir/LaTeX__xid-"));
}

#[test]
fn test_repeated_formula_renders_once() {
    let (mut pkg, calls) = package_with_counter();

    let first = pkg.process_text("One $a+b$ here").unwrap();
    let second = pkg.process_text("Again $a+b$ there").unwrap();

    assert_eq!(calls.lock().unwrap().len(), 1);

    // Both call sites receive identical markup.
    let tag = |s: &str| {
        let start = s.find("<img ").unwrap();
        let end = s[start..].find('>').unwrap();
        s[start..start + end + 1].to_string()
    };
    assert_eq!(tag(&first.package), tag(&second.package));
    assert_eq!(tag(&first.preview), tag(&second.preview));
}

#[test]
fn test_same_formula_in_both_modes_renders_twice() {
    let (mut pkg, calls) = package_with_counter();
    pkg.process_text("$$z$$ and $z$").unwrap();
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[test]
fn test_unbalanced_inline_delimiter_is_rejected() {
    let (mut pkg, _calls) = package_with_counter();
    assert!(pkg.process_text("price is $5").is_err());
}

#[test]
fn test_unbalanced_display_delimiter_is_rejected() {
    let (mut pkg, _calls) = package_with_counter();
    assert!(pkg.process_text("$$x+1").is_err());
}

#[test]
fn test_image_src_rewritten_per_stream() {
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("plot.png");
    fs::write(&image, b"binary image bytes").unwrap();

    let (mut pkg, _calls) = package_with_counter();
    let text = format!("See <img src=\"{}\" alt=\"plot\"> here", image.display());
    let processed = pkg.process_text(&text).unwrap();

    assert!(processed
        .package
        .contains("src=\"@X@EmbeddedFile.requestUrlStub@X@bbcswebdav/xid-"));
    assert!(processed.preview.contains("src=\"csfiles/home_dir/"));
    // Everything around the tag is untouched.
    assert!(processed.package.starts_with("See <img "));
    assert!(processed.package.ends_with("> here"));
    // The other attributes survive in place.
    assert!(processed.package.contains("alt=\"plot\""));
    assert!(processed.preview.contains("alt=\"plot\""));
}

#[test]
fn test_same_image_embedded_once_across_questions() {
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("plot.png");
    fs::write(&image, b"binary image bytes").unwrap();

    let (mut pkg, _calls) = package_with_counter();
    let text = format!("<img src=\"{}\">", image.display());
    let first = pkg.process_text(&text).unwrap();
    let second = pkg.process_text(&text).unwrap();
    assert_eq!(first.package, second.package);
    assert_eq!(first.preview, second.preview);
}

#[test]
fn test_malformed_image_tag_passes_through() {
    let (mut pkg, _calls) = package_with_counter();
    let processed = pkg.process_text("Broken <img alt='no source'> tag").unwrap();
    assert_eq!(processed.package, "Broken <img alt='no source'> tag");
    assert_eq!(processed.preview, "Broken <img alt='no source'> tag");
}

#[test]
fn test_missing_image_file_is_fatal() {
    let (mut pkg, _calls) = package_with_counter();
    assert!(pkg.process_text("<img src=\"nope/missing.png\">").is_err());
}

#[test]
fn test_inline_equation_is_em_sized() {
    let (mut pkg, _calls) = package_with_counter();
    let processed = pkg.process_text("$q$").unwrap();
    // 88x44 px at 44 px/em.
    assert!(processed.package.contains("width:2.000em"));
    assert!(processed.package.contains("height:1.000em"));
    assert!(processed.package.contains("vertical-align:middle"));
}

#[test]
fn test_display_equation_is_block_styled() {
    let (mut pkg, _calls) = package_with_counter();
    let processed = pkg.process_text("$$q$$").unwrap();
    assert!(processed
        .package
        .contains("display:block;margin-left:auto;margin-right:auto;"));
    assert!(processed.package.contains("width=\"88\""));
    assert!(processed.package.contains("height=\"44\""));
}
