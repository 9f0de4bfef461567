//! Constants used throughout the LDP core crate.
//!
//! Media types, default configuration values and header names live here so the store, the
//! handlers and the binaries agree on them.

/// Content type served for every container (directory) resource.
pub const CONTAINER_CONTENT_TYPE: &str = "text/turtle";

/// Content type used for files whose extension resolves to nothing.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Default extension of metadata sidecar resources.
pub const DEFAULT_META_EXTENSION: &str = ".meta";

/// Default extension of access-control sidecar resources.
pub const DEFAULT_ACL_EXTENSION: &str = ".acl";

/// Extension → content type entries that win over the base registry.
pub const DEFAULT_OVERRIDE_TYPES: [(&str, &str); 2] = [("acl", "text/turtle"), ("meta", "text/turtle")];

/// Media types that carry an RDF graph, in negotiation candidate order.
pub const RDF_MIME_TYPES: [&str; 10] = [
    "text/turtle",
    "text/n3",
    "text/html",
    "application/xhtml+xml",
    "application/n3",
    "application/nquads",
    "application/n-quads",
    "application/rdf+xml",
    "application/ld+json",
    "application/x-turtle",
];

/// Capability advertisement header, always present on retrieval responses.
pub const MS_AUTHOR_VIA: &str = "MS-Author-Via";

/// Value of [`MS_AUTHOR_VIA`].
pub const MS_AUTHOR_VIA_VALUE: &str = "SPARQL";

/// Header advertising the live-update channel.
pub const UPDATES_VIA: &str = "Updates-Via";
