//! Container graph assembly.
//!
//! A container's graph is the union of its metadata sidecar, its own POSIX-style description,
//! its LDP container types and a description of every child that is not itself a sidecar.

use crate::content_type::{self, is_sidecar};
use crate::store::{Store, UriLike};
use crate::{uri, vocab, StoreError, StoreResult};
use chrono::SecondsFormat;
use futures::future::join_all;
use ldp_types::{Descriptor, Encoding};
use oxrdf::vocab::{rdf, xsd};
use oxrdf::{Graph, Literal, NamedNode, Triple};
use url::Url;

/// Builds the graph describing the directory `container` and its children.
///
/// Children whose description fails are logged and left out.
pub async fn container_graph(store: &dyn Store, container: &Descriptor) -> StoreResult<Graph> {
    let url = store.get_url(&UriLike::from(container))?;
    let subject = NamedNode::new_unchecked(url.as_str());

    let mut graph = read_metadata(store, &url).await?;
    for triple in descriptor_triples(&subject, container) {
        graph.insert(&triple);
    }
    graph.insert(&Triple::new(subject.clone(), rdf::TYPE, vocab::ldp("BasicContainer")));
    graph.insert(&Triple::new(subject, rdf::TYPE, vocab::ldp("Container")));

    let config = store.config();
    let children: Vec<Descriptor> = store
        .list(UriLike::from(container))
        .await?
        .into_iter()
        .filter(|child| !is_sidecar(config, &content_type::name_of(&child.uri)))
        .collect();

    let described = join_all(children.iter().map(|child| child_triples(store, child))).await;
    for (child, result) in children.iter().zip(described) {
        match result {
            Ok(triples) => {
                for triple in &triples {
                    graph.insert(triple);
                }
            }
            Err(e) => tracing::warn!("leaving {} out of {}: {}", child.uri, url, e),
        }
    }

    Ok(graph)
}

/// `stat:size`, `stat:mtime` and `dct:modified` statements for a resource.
pub fn descriptor_triples(subject: &NamedNode, descriptor: &Descriptor) -> Vec<Triple> {
    let millis = descriptor.modified.timestamp_millis();
    let mtime = if millis % 1000 == 0 {
        Literal::new_typed_literal((millis / 1000).to_string(), xsd::INTEGER)
    } else {
        Literal::new_typed_literal(descriptor.modified_epoch_seconds().to_string(), xsd::DECIMAL)
    };
    let modified = Literal::new_typed_literal(
        descriptor.modified.to_rfc3339_opts(SecondsFormat::Millis, true),
        xsd::DATE_TIME,
    );
    let size = Literal::new_typed_literal(descriptor.size.to_string(), xsd::INTEGER);

    vec![
        Triple::new(subject.clone(), vocab::stat("size"), size),
        Triple::new(subject.clone(), vocab::stat("mtime"), mtime),
        Triple::new(subject.clone(), vocab::dct("modified"), modified),
    ]
}

/// Reads the container's metadata sidecar. A missing sidecar is an empty graph.
async fn read_metadata(store: &dyn Store, container: &Url) -> StoreResult<Graph> {
    let sidecar = uri::join_child(container, &format!("./{}", store.config().meta_extension()))?;

    let malformed = |message: String| StoreError::MalformedMetadata {
        uri: sidecar.to_string(),
        message,
    };

    let bytes = match store.get(UriLike::from(&sidecar), Encoding::Binary).await {
        Ok(content) => content.into_bytes(),
        Err(e) if e.is_not_found() => Vec::new(),
        Err(e) => return Err(e),
    };
    let text = String::from_utf8(bytes).map_err(|e| malformed(e.to_string()))?;

    crate::rdf::parse(&text, container.as_str(), "text/turtle").map_err(|e| malformed(e.to_string()))
}

async fn child_triples(store: &dyn Store, child: &Descriptor) -> StoreResult<Vec<Triple>> {
    let url = store.get_url(&UriLike::from(child))?;
    let subject = NamedNode::new_unchecked(url.as_str());
    let mut triples = descriptor_triples(&subject, child);

    if child.is_file() {
        let name = uri::file_name(&url).unwrap_or_default();
        if let Some(class) = content_type::lookup(store.config(), &name)
            .as_deref()
            .and_then(vocab::media_type_resource)
        {
            triples.push(Triple::new(subject, rdf::TYPE, class));
        }
    }
    Ok(triples)
}
