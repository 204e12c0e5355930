//! Package construction
//!
//! One [`Package`] owns everything with package lifetime: the container
//! writer, every identifier counter, the asset store, the equation
//! cache, and the manifest. All state is process-local and
//! single-writer; operations run to completion synchronously. Closing
//! finalizes the manifest and the container; a package abandoned before
//! close is not a valid archive.

mod errors;
mod manifest;

pub use errors::{PackageError, PackageResult};

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::assets::{AssetError, AssetRef, AssetStore};
use crate::container::{ContainerWriter, ZipContainer};
use crate::content::{
    self, ContentResult, EquationCache, EquationRenderer, LatexConfig, ProcessedText,
};
use crate::ids::IdAllocator;
use crate::xml::Element;

use manifest::Manifest;

/// Package-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Course the package imports into; appears in content-collection
    /// paths and the parent-context resource.
    pub course_id: String,
    pub latex: LatexConfig,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            course_id: "IMPORT".to_string(),
            latex: LatexConfig::default(),
        }
    }
}

/// An in-progress content package.
pub struct Package {
    config: PackageConfig,
    container: Box<dyn ContainerWriter>,
    ids: IdAllocator,
    assets: AssetStore,
    equations: EquationCache,
    renderer: Box<dyn EquationRenderer>,
    manifest: Manifest,
}

impl Package {
    /// Creates a package writing to a ZIP archive at `path`.
    pub fn create(
        path: impl AsRef<Path>,
        config: PackageConfig,
        renderer: Box<dyn EquationRenderer>,
    ) -> PackageResult<Self> {
        let container = ZipContainer::create(path)?;
        Ok(Self::with_container(Box::new(container), config, renderer))
    }

    /// Creates a package over any container writer. Useful for tests
    /// and callers that post-process entries themselves.
    pub fn with_container(
        container: Box<dyn ContainerWriter>,
        config: PackageConfig,
        renderer: Box<dyn EquationRenderer>,
    ) -> Self {
        Self {
            config,
            container,
            ids: IdAllocator::new(),
            assets: AssetStore::new(),
            equations: EquationCache::default(),
            renderer,
            manifest: Manifest::new(),
        }
    }

    pub fn config(&self) -> &PackageConfig {
        &self.config
    }

    pub(crate) fn next_object_id(&mut self) -> u64 {
        self.ids.next_object_id()
    }

    /// Runs rich text through the inline content processor, producing
    /// the package and preview encodings.
    pub fn process_text(&mut self, text: &str) -> ContentResult<ProcessedText> {
        let mut ctx = content::InlineContext {
            assets: &mut self.assets,
            equations: &mut self.equations,
            renderer: self.renderer.as_mut(),
            ids: &mut self.ids,
            container: self.container.as_mut(),
            course_id: &self.config.course_id,
            latex: &self.config.latex,
        };
        content::process(&mut ctx, text)
    }

    /// Embeds a file into the content collection. With `content` absent
    /// the file is read from disk at `name`.
    pub fn embed_file(&mut self, name: &str, content: Option<&[u8]>) -> Result<AssetRef, AssetError> {
        match content {
            Some(bytes) => self.assets.embed(
                &mut self.ids,
                self.container.as_mut(),
                &self.config.course_id,
                name,
                bytes,
            ),
            None => self.assets.embed_path(
                &mut self.ids,
                self.container.as_mut(),
                &self.config.course_id,
                name,
            ),
        }
    }

    /// Embeds an image and returns the package-format and preview-format
    /// `<img>` tags, with `attrs` appended to both.
    pub fn embed_image(
        &mut self,
        name: &str,
        content: Option<&[u8]>,
        attrs: &[(String, String)],
    ) -> Result<(String, String), AssetError> {
        let asset = self.embed_file(name, content)?;
        Ok(content::image_tags(&asset, attrs))
    }

    /// Renders a formula (display or inline mode), embeds the bitmap,
    /// and returns the two image tags. Cached per (formula, mode).
    pub fn embed_latex(&mut self, formula: &str, display: bool) -> ContentResult<(String, String)> {
        let mut ctx = content::InlineContext {
            assets: &mut self.assets,
            equations: &mut self.equations,
            renderer: self.renderer.as_mut(),
            ids: &mut self.ids,
            container: self.container.as_mut(),
            course_id: &self.config.course_id,
            latex: &self.config.latex,
        };
        content::equation_markup(&mut ctx, formula, display)
    }

    /// Registers a serialized document as a package resource and returns
    /// its manifest identifier, usable in cross-document links.
    pub fn register_resource(
        &mut self,
        title: &str,
        resource_type: &str,
        document: &str,
    ) -> PackageResult<String> {
        let name = self.ids.next_resource_name();
        self.container
            .write_entry(&format!("{}.dat", name), document.as_bytes())?;
        self.manifest.add(&name, resource_type, title);
        tracing::info!(resource = %name, resource_type, title, "registered package resource");
        Ok(name)
    }

    pub(crate) fn write_preview(&mut self, path: &str, html: &str) -> PackageResult<()> {
        self.container.write_entry(path, html.as_bytes())?;
        Ok(())
    }

    /// Finalizes the package: registers the course parent-context
    /// resource, writes the manifest and the package info marker, and
    /// closes the container.
    pub fn close(mut self) -> PackageResult<()> {
        let parent_context = Element::new("parentContextInfo")
            .child(Element::new("parentContextId").text(&self.config.course_id))
            .to_document();
        let course_id = self.config.course_id.clone();
        self.register_resource(&course_id, "resource/x-mhhe-course-cx", &parent_context)?;

        self.container
            .write_entry("imsmanifest.xml", self.manifest.to_document().as_bytes())?;
        self.container
            .write_entry(".bb-package-info", package_info().as_bytes())?;
        self.container.finish()?;
        tracing::info!(course = %self.config.course_id, "package finalized");
        Ok(())
    }
}

fn package_info() -> String {
    format!(
        "generator=quizpack {}\ncreated={}\n",
        env!("CARGO_PKG_VERSION"),
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    )
}
