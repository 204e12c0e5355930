//! Inline content rewriting
//!
//! Rich text fields pass through three ordered phases that keep two
//! output streams structurally aligned: the package encoding (assets
//! referenced by xid locator) and the preview encoding (assets
//! referenced by literal storage path).
//!
//! 1. Image tags: every `<img ...>` occurrence has its `src` resolved
//!    through the asset store and rewritten per stream. Tags without a
//!    recognizable `src` pass through verbatim.
//! 2. Display math: text between `$$` pairs is rendered block-style.
//! 3. Inline math: on the rejoined text, text between single `$` pairs
//!    is rendered inline.
//!
//! Each resolved image or formula touches the asset store or equation
//! cache exactly once; identical formulas across questions reuse one
//! rendered bitmap.

use std::ops::Range;
use std::sync::OnceLock;

use quick_xml::escape::escape;
use regex::Regex;

use crate::assets::{AssetRef, AssetStore};
use crate::container::ContainerWriter;
use crate::ids::IdAllocator;

use super::equation::{EquationCache, EquationRenderer, LatexConfig, RenderedEquation};
use super::errors::{ContentError, ContentResult};

/// Locator prefix Blackboard resolves to an embedded asset at display
/// time; the asset xid is appended.
pub const EMBED_URL_STUB: &str = "@X@EmbeddedFile.requestUrlStub@X@bbcswebdav/xid-";

/// The two parallel encodings of one logical text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedText {
    /// Package-format encoding (xid locators).
    pub package: String,
    /// Preview-format encoding (literal storage paths).
    pub preview: String,
}

/// Mutable package state the processor works against, threaded
/// explicitly so the processor stays free of global state.
pub(crate) struct InlineContext<'a> {
    pub assets: &'a mut AssetStore,
    pub equations: &'a mut EquationCache,
    pub renderer: &'a mut dyn EquationRenderer,
    pub ids: &'a mut IdAllocator,
    pub container: &'a mut dyn ContainerWriter,
    pub course_id: &'a str,
    pub latex: &'a LatexConfig,
}

pub(crate) fn process(ctx: &mut InlineContext<'_>, text: &str) -> ContentResult<ProcessedText> {
    let (package, preview) = rewrite_images(ctx, text)?;
    let (package, preview) = rewrite_math(ctx, &package, &preview, "$$", true)?;
    let (package, preview) = rewrite_math(ctx, &package, &preview, "$", false)?;
    Ok(ProcessedText { package, preview })
}

fn img_tag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<img[^>]*>").expect("image tag pattern"))
}

fn src_attr_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"src\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("src attribute pattern")
    })
}

/// Byte range of the `src` attribute value within `tag`, plus the value.
fn src_attribute(tag: &str) -> Option<(Range<usize>, &str)> {
    let caps = src_attr_pattern().captures(tag)?;
    let group = caps.get(1).or_else(|| caps.get(2))?;
    Some((group.range(), group.as_str()))
}

fn rewrite_images(ctx: &mut InlineContext<'_>, text: &str) -> ContentResult<(String, String)> {
    let mut package = String::with_capacity(text.len());
    let mut preview = String::with_capacity(text.len());
    let mut last = 0;

    for found in img_tag_pattern().find_iter(text) {
        package.push_str(&text[last..found.start()]);
        preview.push_str(&text[last..found.start()]);

        let tag = found.as_str();
        match src_attribute(tag) {
            Some((range, src)) => {
                let asset =
                    ctx.assets
                        .embed_path(ctx.ids, ctx.container, ctx.course_id, src)?;
                package.push_str(&tag[..range.start]);
                package.push_str(EMBED_URL_STUB);
                package.push_str(&asset.xid);
                package.push_str(&tag[range.end..]);
                preview.push_str(&tag[..range.start]);
                preview.push_str(&asset.path);
                preview.push_str(&tag[range.end..]);
            }
            // Best-effort leniency: tags without a src pass through.
            None => {
                package.push_str(tag);
                preview.push_str(tag);
            }
        }
        last = found.end();
    }
    package.push_str(&text[last..]);
    preview.push_str(&text[last..]);
    Ok((package, preview))
}

fn rewrite_math(
    ctx: &mut InlineContext<'_>,
    package: &str,
    preview: &str,
    delimiter: &'static str,
    display: bool,
) -> ContentResult<(String, String)> {
    let rebuilt_package = rewrite_math_stream(ctx, package, delimiter, display, true)?;
    let rebuilt_preview = rewrite_math_stream(ctx, preview, delimiter, display, false)?;
    Ok((rebuilt_package, rebuilt_preview))
}

fn rewrite_math_stream(
    ctx: &mut InlineContext<'_>,
    text: &str,
    delimiter: &'static str,
    display: bool,
    package_stream: bool,
) -> ContentResult<String> {
    let parts: Vec<&str> = text.split(delimiter).collect();
    // n delimiters yield n+1 parts; an even part count means one was
    // left unclosed.
    if parts.len() % 2 == 0 {
        return Err(ContentError::UnbalancedMath {
            delimiter,
            text: text.to_string(),
        });
    }

    let mut out = String::with_capacity(text.len());
    for (index, part) in parts.iter().enumerate() {
        if index % 2 == 1 {
            let (bb, html) = equation_markup(ctx, part, display)?;
            out.push_str(if package_stream { &bb } else { &html });
        } else {
            out.push_str(part);
        }
    }
    Ok(out)
}

/// Markup pair (package, preview) for one formula, rendered and embedded
/// at most once per package.
pub(crate) fn equation_markup(
    ctx: &mut InlineContext<'_>,
    formula: &str,
    display: bool,
) -> ContentResult<(String, String)> {
    if let Some(hit) = ctx.equations.get(formula, display) {
        return Ok(hit.clone());
    }

    let rendered = ctx.renderer.render(formula, display, ctx.latex)?;
    let name = format!("LaTeX/eq{}.png", ctx.ids.next_equation_index());
    let asset = ctx
        .assets
        .embed(ctx.ids, ctx.container, ctx.course_id, &name, &rendered.png)?;

    let attrs = equation_attrs(&rendered, display, ctx.latex, formula);
    let markup = image_tags(&asset, &attrs);
    ctx.equations.insert(formula, display, markup.clone());
    tracing::debug!(formula, display, name = %name, "rendered equation");
    Ok(markup)
}

fn equation_attrs(
    rendered: &RenderedEquation,
    display: bool,
    latex: &LatexConfig,
    formula: &str,
) -> Vec<(String, String)> {
    // Square brackets clash with fill-in-blank placeholders, so the alt
    // fallback swaps them for parentheses.
    let alt = formula.replace('[', "(").replace(']', ")");

    let mut attrs = Vec::with_capacity(4);
    if display {
        attrs.push((
            "style".to_string(),
            "display:block;margin-left:auto;margin-right:auto;".to_string(),
        ));
        attrs.push(("width".to_string(), rendered.width_px.to_string()));
        attrs.push(("height".to_string(), rendered.height_px.to_string()));
    } else {
        let width_em = f64::from(rendered.width_px) / latex.em_height_px;
        let height_em = f64::from(rendered.height_px) / latex.em_height_px;
        attrs.push((
            "style".to_string(),
            format!(
                "vertical-align:middle;width:{:.3}em;height:{:.3}em;",
                width_em, height_em
            ),
        ));
    }
    attrs.push(("alt".to_string(), alt));
    attrs
}

/// Builds the package-format and preview-format image tags for an
/// embedded asset.
pub(crate) fn image_tags(asset: &AssetRef, attrs: &[(String, String)]) -> (String, String) {
    let mut bb = format!("<img src=\"{}{}\"", EMBED_URL_STUB, asset.xid);
    let mut html = format!("<img src=\"{}\"", escape(asset.path.as_str()));
    for (key, value) in attrs {
        let escaped = escape(value.as_str());
        bb.push(' ');
        bb.push_str(key);
        bb.push_str("=\"");
        bb.push_str(&escaped);
        bb.push('"');
        html.push(' ');
        html.push_str(key);
        html.push_str("=\"");
        html.push_str(&escaped);
        html.push('"');
    }
    bb.push('>');
    html.push('>');
    (bb, html)
}
