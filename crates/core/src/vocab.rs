//! RDF vocabulary terms used when describing resources.

use oxrdf::NamedNode;

pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const LDP: &str = "http://www.w3.org/ns/ldp#";
pub const STAT: &str = "http://www.w3.org/ns/posix/stat#";
pub const DCT: &str = "http://purl.org/dc/terms/";
pub const MEDIA_TYPES: &str = "http://www.w3.org/ns/iana/media-types/";

/// Prefixes declared when serializing Turtle.
pub const PREFIXES: [(&str, &str); 4] = [("rdf", RDF), ("ldp", LDP), ("stat", STAT), ("dct", DCT)];

pub fn rdf(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{RDF}{local}"))
}

pub fn ldp(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{LDP}{local}"))
}

pub fn stat(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{STAT}{local}"))
}

pub fn dct(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{DCT}{local}"))
}

/// IANA resource class for a media type, e.g. `.../media-types/text/turtle#Resource`.
///
/// `None` when the media type cannot form a valid IRI.
pub fn media_type_resource(media_type: &str) -> Option<NamedNode> {
    NamedNode::new(format!("{MEDIA_TYPES}{}#Resource", media_type.trim())).ok()
}
