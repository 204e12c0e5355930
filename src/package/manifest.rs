//! IMS manifest assembly
//!
//! The manifest is the authoritative package descriptor: one `resource`
//! entry per registered document, carrying the Blackboard content-
//! packaging attributes. It is serialized once, at package close.

use crate::xml::Element;

const BB_NAMESPACE: &str = "http://www.blackboard.com/content-packaging/";

struct ManifestResource {
    identifier: String,
    resource_type: String,
    title: String,
}

/// Accumulates registered resources until close.
#[derive(Default)]
pub(crate) struct Manifest {
    resources: Vec<ManifestResource>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, identifier: &str, resource_type: &str, title: &str) {
        self.resources.push(ManifestResource {
            identifier: identifier.to_string(),
            resource_type: resource_type.to_string(),
            title: title.to_string(),
        });
    }

    pub fn to_document(&self) -> String {
        let mut resources = Element::new("resources");
        for resource in &self.resources {
            resources.push(
                Element::new("resource")
                    .attr("identifier", &resource.identifier)
                    .attr("type", &resource.resource_type)
                    .attr("xml:base", &resource.identifier)
                    .attr("bb:file", format!("{}.dat", resource.identifier))
                    .attr("bb:title", &resource.title),
            );
        }
        Element::new("manifest")
            .attr("identifier", "man00001")
            .attr("xmlns:bb", BB_NAMESPACE)
            .child(Element::new("organizations"))
            .child(resources)
            .to_document()
    }
}
