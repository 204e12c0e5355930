//! Content-addressed asset embedding
//!
//! Every binary that ends up inside a package (referenced images,
//! rendered equations) goes through [`AssetStore::embed`]. The store
//! guarantees at most one physical copy per distinct content under a
//! given logical name: re-embedding identical bytes returns the original
//! reference, while colliding names with different bytes are pushed onto
//! deterministically numbered alternatives (`name_0`, `name_1`, ...).
//!
//! Embedded files live under `csfiles/home_dir/` with every path segment
//! and filename suffixed by its xid; each new segment and each file also
//! gets a small `<lom>` descriptor entry linking it into the course
//! content collection.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;

use sha2::{Digest, Sha256};

use crate::container::ContainerWriter;
use crate::ids::IdAllocator;
use crate::xml::Element;

use super::errors::{AssetError, AssetResult};
use super::paths::{split_ext, split_ext_full, split_name, DirNode, DirectoryTable};

/// Reference to an embedded asset: the xid used in package-format
/// locators and the literal in-archive storage path used by previews.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub xid: String,
    pub path: String,
}

struct StoredAsset {
    digest: [u8; 32],
    reference: AssetRef,
}

/// Deduplicating store of embedded package assets.
#[derive(Default)]
pub struct AssetStore {
    embedded: HashMap<String, StoredAsset>,
    dirs: DirectoryTable,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embeds `content` under the logical `name`, deduplicating by
    /// content digest. Returns the same reference for repeated identical
    /// embeds; allocates a numbered alternative name when the same name
    /// arrives with different bytes.
    pub(crate) fn embed(
        &mut self,
        ids: &mut IdAllocator,
        container: &mut dyn ContainerWriter,
        course_id: &str,
        name: &str,
        content: &[u8],
    ) -> AssetResult<AssetRef> {
        let digest = content_digest(content);

        match self.embedded.get(name) {
            None => self.store_new(ids, container, course_id, name, content, digest),
            Some(existing) if existing.digest == digest => Ok(existing.reference.clone()),
            Some(_) => {
                // Same name, different bytes: probe numbered alternatives
                // until one matches this content or a free slot appears.
                let (stem, ext) = split_ext_full(name);
                let mut count = 0u32;
                loop {
                    let candidate = format!("{}_{}{}", stem, count, ext);
                    match self.embedded.get(&candidate) {
                        Some(stored) if stored.digest == digest => {
                            return Ok(stored.reference.clone());
                        }
                        Some(_) => count += 1,
                        None => {
                            return self
                                .store_new(ids, container, course_id, &candidate, content, digest);
                        }
                    }
                }
            }
        }
    }

    /// Reads a file from disk and embeds it under its own path. An
    /// unreadable path is a fatal error; the caller must supply valid
    /// input.
    pub(crate) fn embed_path(
        &mut self,
        ids: &mut IdAllocator,
        container: &mut dyn ContainerWriter,
        course_id: &str,
        path: &str,
    ) -> AssetResult<AssetRef> {
        let content = fs::read(path).map_err(|source| AssetError::Unreadable {
            path: path.to_string(),
            source,
        })?;
        self.embed(ids, container, course_id, path, &content)
    }

    fn store_new(
        &mut self,
        ids: &mut IdAllocator,
        container: &mut dyn ContainerWriter,
        course_id: &str,
        name: &str,
        content: &[u8],
        digest: [u8; 32],
    ) -> AssetResult<AssetRef> {
        let (segments, filename) = split_name(name);

        // Fold the directory segments through the transformation table,
        // allocating an xid and writing a descriptor for each new one.
        let mut transformed: Vec<String> = Vec::with_capacity(segments.len());
        let mut table = self.dirs.roots_mut();
        for segment in &segments {
            let node = match table.entry(segment.clone()) {
                Entry::Occupied(occupied) => occupied.into_mut(),
                Entry::Vacant(vacant) => {
                    let xid = ids.next_xid();
                    let transformed_segment = format!("{}__xid-{}_1", segment, xid);

                    let mut original = transformed.clone();
                    original.push(segment.clone());
                    let descriptor = descriptor_document(&format!(
                        "{}_1#/courses/{}/{}",
                        xid,
                        course_id,
                        original.join("/")
                    ));

                    let mut stored = transformed.clone();
                    stored.push(transformed_segment.clone());
                    container.write_entry(
                        &format!("csfiles/home_dir/{}.xml", stored.join("/")),
                        descriptor.as_bytes(),
                    )?;

                    vacant.insert(DirNode::new(transformed_segment))
                }
            };
            transformed.push(node.transformed().to_string());
            table = node.children_mut();
        }

        // The file itself gets its own xid, stored alongside a descriptor.
        let xid = ids.next_xid();
        let (stem, ext) = split_ext(&filename);
        let stored_filename = format!("{}__xid-{}_1{}", stem, xid, ext);
        transformed.push(stored_filename);
        let relative = transformed.join("/");
        let path = format!("csfiles/home_dir/{}", relative);

        container.write_entry(&path, content)?;
        let descriptor =
            descriptor_document(&format!("{}#/courses/{}/{}", xid, course_id, relative));
        container.write_entry(&format!("{}.xml", path), descriptor.as_bytes())?;

        let reference = AssetRef {
            xid: format!("{}_1", xid),
            path,
        };
        tracing::debug!(name, xid = %reference.xid, path = %reference.path, "embedded asset");
        self.embedded.insert(
            name.to_string(),
            StoredAsset {
                digest,
                reference: reference.clone(),
            },
        );
        Ok(reference)
    }
}

fn content_digest(content: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hasher.finalize().into()
}

fn descriptor_document(identifier: &str) -> String {
    Element::new("lom")
        .child(
            Element::new("relation")
                .child(Element::new("resource").child(Element::new("identifier").text(identifier))),
        )
        .to_document()
}
