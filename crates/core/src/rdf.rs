//! Bridge between stored documents and in-memory graphs.
//!
//! Only Turtle (and the N3 media types, read as Turtle) and N-Quads are parsed or serialized.
//! The other RDF media types can be negotiated but never produced.

use crate::content_type::essence;
use crate::vocab::PREFIXES;
use crate::{StoreError, StoreResult};
use oxrdf::{Graph, GraphNameRef, Triple};
use oxttl::{NQuadsParser, NQuadsSerializer, TurtleParser, TurtleSerializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfSyntax {
    Turtle,
    NQuads,
}

impl RdfSyntax {
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match essence(media_type).as_str() {
            "text/turtle" | "application/x-turtle" | "text/n3" | "application/n3" => {
                Some(Self::Turtle)
            }
            "application/n-quads" | "application/nquads" => Some(Self::NQuads),
            _ => None,
        }
    }
}

/// Parse `text` into a graph, resolving relative IRIs against `base`.
pub fn parse(text: &str, base: &str, media_type: &str) -> StoreResult<Graph> {
    let syntax = RdfSyntax::from_media_type(media_type)
        .ok_or_else(|| StoreError::UnsupportedSerialization(media_type.to_string()))?;
    let parse_error = |message: String| StoreError::RdfParse {
        uri: base.to_string(),
        media_type: media_type.to_string(),
        message,
    };

    let mut graph = Graph::new();
    match syntax {
        RdfSyntax::Turtle => {
            let parser = TurtleParser::new()
                .with_base_iri(base)
                .map_err(|e| parse_error(e.to_string()))?;
            for triple in parser.for_reader(text.as_bytes()) {
                let triple = triple.map_err(|e| parse_error(e.to_string()))?;
                graph.insert(&triple);
            }
        }
        RdfSyntax::NQuads => {
            for quad in NQuadsParser::new().for_reader(text.as_bytes()) {
                let quad = quad.map_err(|e| parse_error(e.to_string()))?;
                graph.insert(&Triple::new(quad.subject, quad.predicate, quad.object));
            }
        }
    }
    Ok(graph)
}

/// Serialize a graph in the syntax named by `media_type`.
pub fn serialize(graph: &Graph, media_type: &str) -> StoreResult<String> {
    let syntax = RdfSyntax::from_media_type(media_type)
        .ok_or_else(|| StoreError::UnsupportedSerialization(media_type.to_string()))?;
    let serialize_error = |message: String| StoreError::RdfSerialize {
        media_type: media_type.to_string(),
        message,
    };

    match syntax {
        RdfSyntax::Turtle => {
            let mut serializer = TurtleSerializer::new();
            for (prefix, iri) in PREFIXES {
                serializer = serializer
                    .with_prefix(prefix, iri)
                    .map_err(|e| serialize_error(e.to_string()))?;
            }
            let mut writer = serializer.for_writer(Vec::new());
            for triple in graph.iter() {
                writer
                    .serialize_triple(triple)
                    .map_err(|e| serialize_error(e.to_string()))?;
            }
            let bytes = writer.finish().map_err(|e| serialize_error(e.to_string()))?;
            String::from_utf8(bytes).map_err(|e| serialize_error(e.to_string()))
        }
        RdfSyntax::NQuads => {
            let mut writer = NQuadsSerializer::new().for_writer(Vec::new());
            for triple in graph.iter() {
                writer
                    .serialize_quad(triple.in_graph(GraphNameRef::DefaultGraph))
                    .map_err(|e| serialize_error(e.to_string()))?;
            }
            String::from_utf8(writer.finish()).map_err(|e| serialize_error(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{Literal, NamedNode, TripleRef};

    const BASE: &str = "http://localhost/a/";

    #[test]
    fn test_parse_turtle_resolves_relative_iris() {
        let graph = parse("<> <http://purl.org/dc/terms/title> \"A\" .", BASE, "text/turtle").unwrap();
        let subject = NamedNode::new_unchecked(BASE);
        let title = NamedNode::new_unchecked("http://purl.org/dc/terms/title");
        let literal = Literal::new_simple_literal("A");
        assert!(graph.contains(TripleRef::new(&subject, &title, &literal)));
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse("", BASE, "text/turtle").unwrap().is_empty());
    }

    #[test]
    fn test_parse_error_is_reported() {
        let result = parse("<> <broken", BASE, "text/turtle");
        assert!(matches!(result, Err(StoreError::RdfParse { .. })));
    }

    #[test]
    fn test_turtle_to_nquads() {
        let graph = parse(
            "@prefix dct: <http://purl.org/dc/terms/> . <b> dct:title \"B\" .",
            BASE,
            "text/turtle",
        )
        .unwrap();
        let nquads = serialize(&graph, "application/n-quads").unwrap();
        assert_eq!(
            nquads.trim(),
            "<http://localhost/a/b> <http://purl.org/dc/terms/title> \"B\" ."
        );

        let reparsed = parse(&nquads, BASE, "application/nquads").unwrap();
        assert_eq!(reparsed.len(), 1);
    }

    #[test]
    fn test_nquads_writes_one_statement_per_line() {
        let graph = parse(
            "<> a <http://www.w3.org/ns/ldp#Container> ; <http://purl.org/dc/terms/title> \"A\\nB\" .",
            BASE,
            "text/turtle",
        )
        .unwrap();
        let nquads = serialize(&graph, "application/n-quads").unwrap();
        let lines: Vec<&str> = nquads.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|line| line.starts_with("<http://localhost/a/> ")));
        assert!(lines.iter().all(|line| line.ends_with(" .")));
        assert!(nquads.contains("\"A\\nB\""));
    }

    #[test]
    fn test_turtle_output_uses_prefixes() {
        let graph = parse(
            "<> a <http://www.w3.org/ns/ldp#Container> .",
            BASE,
            "text/turtle",
        )
        .unwrap();
        let turtle = serialize(&graph, "text/turtle; charset=utf-8").unwrap();
        assert!(turtle.contains("@prefix ldp: <http://www.w3.org/ns/ldp#>"));
        assert!(turtle.contains("ldp:Container"));
    }

    #[test]
    fn test_unserializable_media_types() {
        let graph = Graph::new();
        assert!(matches!(
            serialize(&graph, "application/ld+json"),
            Err(StoreError::UnsupportedSerialization(_))
        ));
        assert!(RdfSyntax::from_media_type("text/html").is_none());
        assert_eq!(RdfSyntax::from_media_type("text/n3"), Some(RdfSyntax::Turtle));
    }
}
