//! Asset path decomposition and the per-segment transformation table
//!
//! Asset names arrive as slash-separated relative paths. Each directory
//! segment is assigned a transformed name (`name__xid-N_1`) exactly once
//! per package; later paths sharing a prefix reuse the earlier
//! allocations. The table is a nested map folded over iteratively, one
//! level per segment.

use std::collections::HashMap;

/// Splits an asset name into normalized directory segments and the
/// filename. Empty, `.`, `..`, and root segments are dropped.
pub(crate) fn split_name(name: &str) -> (Vec<String>, String) {
    let mut segments: Vec<String> = name
        .split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(str::to_string)
        .collect();
    let filename = segments.pop().unwrap_or_default();
    (segments, filename)
}

/// Splits a filename into stem and extension; the extension keeps its
/// leading dot. A leading-dot name has no extension.
pub(crate) fn split_ext(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => filename.split_at(idx),
        _ => (filename, ""),
    }
}

/// Like [`split_ext`] but over a full slash-separated name: only the
/// final path segment can contribute an extension.
pub(crate) fn split_ext_full(name: &str) -> (&str, &str) {
    let base_start = name.rfind('/').map(|idx| idx + 1).unwrap_or(0);
    let (stem, ext) = split_ext(&name[base_start..]);
    (&name[..base_start + stem.len()], ext)
}

/// One embedded directory segment: its transformed name and the table
/// for its children.
pub(crate) struct DirNode {
    transformed: String,
    children: HashMap<String, DirNode>,
}

impl DirNode {
    pub fn new(transformed: String) -> Self {
        Self {
            transformed,
            children: HashMap::new(),
        }
    }

    pub fn transformed(&self) -> &str {
        &self.transformed
    }

    pub fn children_mut(&mut self) -> &mut HashMap<String, DirNode> {
        &mut self.children
    }
}

/// Root table of embedded directory segments.
#[derive(Default)]
pub(crate) struct DirectoryTable {
    roots: HashMap<String, DirNode>,
}

impl DirectoryTable {
    pub fn roots_mut(&mut self) -> &mut HashMap<String, DirNode> {
        &mut self.roots
    }
}
