//! GET and HEAD.

use super::MethodHandler;
use crate::constants::{
    CONTAINER_CONTENT_TYPE, MS_AUTHOR_VIA, MS_AUTHOR_VIA_VALUE, RDF_MIME_TYPES, UPDATES_VIA,
};
use crate::content_type::{essence, is_rdf};
use crate::decorator::StoreDecorator;
use crate::negotiation::Negotiator;
use crate::rdf::{self, RdfSyntax};
use crate::store::{LdpRequest, LdpResponse, Store, UriLike};
use crate::{StoreError, StoreResult};
use async_trait::async_trait;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::response::Builder;
use http::{Method, Response, StatusCode};
use ldp_types::{Descriptor, Encoding};
use url::Url;

#[derive(Debug, Clone, Copy, Default)]
pub struct GetHandler;

#[async_trait]
impl MethodHandler for GetHandler {
    async fn handle(
        &self,
        store: &StoreDecorator,
        request: &LdpRequest,
    ) -> StoreResult<LdpResponse> {
        let negotiator = Negotiator::from_headers(request.headers());
        let target = request_target(request);

        let mut builder = Response::builder().header(MS_AUTHOR_VIA, MS_AUTHOR_VIA_VALUE);
        if store.live() {
            let updates = updates_url(store.get_url(&target)?);
            builder = builder.header(UPDATES_VIA, updates.as_str());
        }

        let Some(descriptor) = store.get_descriptor(target).await? else {
            tracing::debug!("{} {}: not found", request.method(), request.uri());
            return Ok(builder.status(StatusCode::NOT_FOUND).body(Bytes::new())?);
        };

        let content_type = store.get_content_type(&descriptor);
        if request.method() != Method::GET {
            return Ok(builder
                .status(StatusCode::OK)
                .header(CONTENT_TYPE, content_type)
                .body(Bytes::new())?);
        }

        if descriptor.is_directory() {
            container_response(store, &negotiator, &descriptor, builder).await
        } else {
            file_response(store, &negotiator, &descriptor, &content_type, builder).await
        }
    }
}

async fn container_response(
    store: &StoreDecorator,
    negotiator: &Negotiator,
    descriptor: &Descriptor,
    builder: Builder,
) -> StoreResult<LdpResponse> {
    let media_type = negotiator
        .media_type(Some(&RDF_MIME_TYPES[..]))
        .filter(|media_type| RdfSyntax::from_media_type(media_type).is_some())
        .unwrap_or_else(|| CONTAINER_CONTENT_TYPE.to_string());

    let graph = store
        .get_container(UriLike::from(descriptor))
        .await?
        .ok_or_else(|| StoreError::NotFound(descriptor.uri.clone()))?;
    let body = rdf::serialize(&graph, &media_type)?;

    Ok(builder
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, media_type)
        .body(Bytes::from(body))?)
}

async fn file_response(
    store: &StoreDecorator,
    negotiator: &Negotiator,
    descriptor: &Descriptor,
    content_type: &str,
    builder: Builder,
) -> StoreResult<LdpResponse> {
    let best_overall = negotiator.media_type(None);
    let best_rdf = negotiator.media_type(Some(&RDF_MIME_TYPES[..]));
    tracing::debug!(
        "{}: stored as {}, best overall {:?}, best rdf {:?}",
        descriptor.uri,
        content_type,
        best_overall,
        best_rdf
    );

    let content = store.get(UriLike::from(descriptor), Encoding::Binary).await?;

    if let Some(target) = conversion_target(negotiator, content_type, best_overall, best_rdf) {
        let text = content.into_text()?;
        let graph = rdf::parse(&text, &descriptor.uri, content_type)?;
        let body = rdf::serialize(&graph, &target)?;
        return Ok(builder
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, target)
            .body(Bytes::from(body))?);
    }

    Ok(builder
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .body(Bytes::from(content.into_bytes()))?)
}

/// The RDF media type a stored RDF document should be converted to, if any.
///
/// The stored representation wins whenever the client accepts it at least as well as any
/// alternative, so conversion only happens for an explicitly preferred, serializable type.
fn conversion_target(
    negotiator: &Negotiator,
    content_type: &str,
    best_overall: Option<String>,
    best_rdf: Option<String>,
) -> Option<String> {
    if !is_rdf(content_type) || RdfSyntax::from_media_type(content_type).is_none() {
        return None;
    }
    if best_rdf.is_none() {
        return None;
    }
    if best_overall.is_some_and(|best| essence(&best) == essence(content_type)) {
        return None;
    }

    let mut candidates = vec![content_type];
    candidates.extend(RDF_MIME_TYPES);
    let preferred = negotiator.media_type(Some(candidates.as_slice()))?;
    if essence(&preferred) == essence(content_type) {
        return None;
    }
    RdfSyntax::from_media_type(&preferred).map(|_| preferred)
}

/// Request target without the query: an absolute URI when the request line carried one,
/// otherwise the path.
fn request_target(request: &LdpRequest) -> UriLike {
    let uri = request.uri();
    match (uri.scheme_str(), uri.authority()) {
        (Some(scheme), Some(authority)) => {
            UriLike::Text(format!("{scheme}://{authority}{}", uri.path()))
        }
        _ => UriLike::Text(uri.path().to_string()),
    }
}

/// Live-update endpoint for a resource: same URL on the matching WebSocket scheme.
fn updates_url(mut url: Url) -> Url {
    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    if url.set_scheme(scheme).is_err() {
        tracing::debug!("cannot switch {} to {}", url, scheme);
    }
    url
}
