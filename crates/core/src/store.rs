//! The storage capability set shared by backends and decorators.

use crate::config::StoreConfig;
use crate::{content_type, uri, StoreResult};
use async_trait::async_trait;
use bytes::Bytes;
use ldp_files::{ReadStream, WriteStream};
use ldp_types::{Content, Descriptor, Encoding};
use std::fmt;
use url::Url;

/// Inbound request as seen by the store.
pub type LdpRequest = http::Request<Bytes>;

/// Response produced by a store handler. An empty body means no body.
pub type LdpResponse = http::Response<Bytes>;

/// Anything that names a resource.
///
/// Every store operation normalises its identifier to a URL against the store's root before use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriLike {
    /// A root-relative path (`/a/b.ttl`) or an absolute URI with its own scheme
    Text(String),
    Url(Url),
    Descriptor(Descriptor),
}

impl UriLike {
    /// The raw identifier text, before any resolution.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Url(url) => url.as_str(),
            Self::Descriptor(descriptor) => &descriptor.uri,
        }
    }
}

impl fmt::Display for UriLike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for UriLike {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for UriLike {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Url> for UriLike {
    fn from(value: Url) -> Self {
        Self::Url(value)
    }
}

impl From<&Url> for UriLike {
    fn from(value: &Url) -> Self {
        Self::Url(value.clone())
    }
}

impl From<Descriptor> for UriLike {
    fn from(value: Descriptor) -> Self {
        Self::Descriptor(value)
    }
}

impl From<&Descriptor> for UriLike {
    fn from(value: &Descriptor) -> Self {
        Self::Descriptor(value.clone())
    }
}

/// Storage capability set.
///
/// Implemented by concrete backends ([`crate::FsStore`]) and by [`crate::StoreDecorator`],
/// which wraps another `Store` and forwards what it does not override.
#[async_trait]
pub trait Store: Send + Sync + fmt::Debug {
    fn config(&self) -> &StoreConfig;

    /// Whether real-time update notifications are advertised.
    fn live(&self) -> bool {
        self.config().live()
    }

    /// Resolves an identifier against the store root.
    ///
    /// # Errors
    /// Returns `StoreError::InvalidIdentifier` for traversal segments or scheme-less identifiers.
    fn get_url(&self, uri: &UriLike) -> StoreResult<Url> {
        uri::resolve(self.config().root_url(), uri)
    }

    /// URL of the directory containing the resource.
    fn get_container_url(&self, uri: &UriLike) -> StoreResult<Url> {
        Ok(uri::container_url(&self.get_url(uri)?))
    }

    fn get_content_type(&self, descriptor: &Descriptor) -> String {
        content_type::resolve(self.config(), descriptor)
    }

    /// Returns the descriptor of an existing file or directory, `None` otherwise.
    async fn get_descriptor(&self, uri: UriLike) -> StoreResult<Option<Descriptor>>;

    /// Lists the children of a directory; empty when the target is not an existing directory.
    async fn list(&self, uri: UriLike) -> StoreResult<Vec<Descriptor>>;

    async fn get(&self, uri: UriLike, encoding: Encoding) -> StoreResult<Content>;

    async fn put(&self, uri: UriLike, content: Content) -> StoreResult<()>;

    async fn delete(&self, uri: UriLike) -> StoreResult<()>;

    async fn create_read_stream(&self, uri: UriLike) -> StoreResult<ReadStream>;

    async fn create_write_stream(&self, uri: UriLike) -> StoreResult<WriteStream>;

    /// Full request handling, for stores that want to take over dispatch.
    ///
    /// `None` means this store does not handle requests itself.
    async fn handle(&self, _request: &LdpRequest) -> Option<StoreResult<LdpResponse>> {
        None
    }
}
