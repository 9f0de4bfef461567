//! The store decorator.
//!
//! [`StoreDecorator`] wraps any [`Store`] and adds what every store chain needs on top of raw
//! storage: identifier resolution before anything reaches the backend, descriptor
//! normalisation, container graph assembly and HTTP method dispatch. Decorators can wrap other
//! decorators. A dispatching layer claims every request through [`Store::handle`], so the
//! layers above it step aside; a resolving layer only forwards `handle` to its inner store.

use crate::config::StoreConfig;
use crate::container;
use crate::handlers::{HandlerKey, Handlers};
use crate::store::{LdpRequest, LdpResponse, Store, UriLike};
use crate::StoreResult;
use async_trait::async_trait;
use ldp_files::{ReadStream, WriteStream};
use ldp_types::{Content, Descriptor, Encoding};
use oxrdf::Graph;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct StoreDecorator {
    inner: Arc<dyn Store>,
    config: Arc<StoreConfig>,
    handlers: Handlers,
    dispatches: bool,
}

impl StoreDecorator {
    /// Wrap `inner`, adopting its configuration.
    pub fn new(inner: Arc<dyn Store>) -> Self {
        let config = Arc::new(inner.config().clone());
        Self::with_config(inner, config)
    }

    /// Wrap `inner` with an explicit configuration.
    pub fn with_config(inner: Arc<dyn Store>, config: Arc<StoreConfig>) -> Self {
        Self {
            inner,
            config,
            handlers: Handlers::default(),
            dispatches: true,
        }
    }

    /// Wrap `inner` as a layer that resolves identifiers but never answers requests itself.
    ///
    /// Requests handed to this layer through [`Store::handle`] go to `inner`, so the handler
    /// table of whichever decorator sits above it stays in charge.
    pub fn resolving(inner: Arc<dyn Store>, config: Arc<StoreConfig>) -> Self {
        Self {
            dispatches: false,
            ..Self::with_config(inner, config)
        }
    }

    /// Replace the method handler table.
    pub fn with_handlers(mut self, handlers: Handlers) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn inner(&self) -> &Arc<dyn Store> {
        &self.inner
    }

    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    /// RDF description of a directory and its children.
    ///
    /// Returns `None` when the target does not exist or is not a directory.
    ///
    /// # Errors
    /// Returns `StoreError::MalformedMetadata` if the directory's metadata sidecar is not valid
    /// Turtle, or any storage error other than not-found while reading it.
    pub async fn get_container(&self, uri: UriLike) -> StoreResult<Option<Graph>> {
        match self.get_descriptor(uri).await? {
            Some(descriptor) if descriptor.is_directory() => {
                Ok(Some(container::container_graph(self, &descriptor).await?))
            }
            _ => Ok(None),
        }
    }

    /// Handle a request, giving the wrapped store the first chance.
    ///
    /// # Errors
    /// Returns `StoreError::UnsupportedMethod` for methods outside the dispatch set and
    /// `StoreError::MethodNotImplemented` when no handler is registered for the method.
    pub async fn handle_request(&self, request: &LdpRequest) -> StoreResult<LdpResponse> {
        if let Some(response) = self.inner.handle(request).await {
            return response;
        }

        let key = HandlerKey::for_method(request.method())?;
        tracing::debug!("{} {} -> {:?}", request.method(), request.uri(), key);
        self.handlers.dispatch(key, self, request).await
    }
}

#[async_trait]
impl Store for StoreDecorator {
    fn config(&self) -> &StoreConfig {
        &self.config
    }

    async fn get_descriptor(&self, uri: UriLike) -> StoreResult<Option<Descriptor>> {
        match uri {
            UriLike::Descriptor(descriptor) => Ok(Some(descriptor)),
            UriLike::Url(url) => self.get_descriptor(UriLike::Text(url.into())).await,
            text => {
                let url = self.get_url(&text)?;
                self.inner.get_descriptor(url.into()).await
            }
        }
    }

    async fn list(&self, uri: UriLike) -> StoreResult<Vec<Descriptor>> {
        let url = self.get_url(&uri)?;
        self.inner.list(url.into()).await
    }

    async fn get(&self, uri: UriLike, encoding: Encoding) -> StoreResult<Content> {
        let url = self.get_url(&uri)?;
        self.inner.get(url.into(), encoding).await
    }

    async fn put(&self, uri: UriLike, content: Content) -> StoreResult<()> {
        let url = self.get_url(&uri)?;
        self.inner.put(url.into(), content).await
    }

    async fn delete(&self, uri: UriLike) -> StoreResult<()> {
        let url = self.get_url(&uri)?;
        self.inner.delete(url.into()).await
    }

    async fn create_read_stream(&self, uri: UriLike) -> StoreResult<ReadStream> {
        let url = self.get_url(&uri)?;
        self.inner.create_read_stream(url.into()).await
    }

    async fn create_write_stream(&self, uri: UriLike) -> StoreResult<WriteStream> {
        let url = self.get_url(&uri)?;
        self.inner.create_write_stream(url.into()).await
    }

    async fn handle(&self, request: &LdpRequest) -> Option<StoreResult<LdpResponse>> {
        if self.dispatches {
            Some(self.handle_request(request).await)
        } else {
            self.inner.handle(request).await
        }
    }
}
