//! # LDP Core
//!
//! Storage abstraction for the LDP resource server.
//!
//! This crate contains the store model and the retrieval path:
//! - the [`Store`] capability set and the [`UriLike`] identifier model
//! - [`StoreDecorator`], which wraps any store with URI resolution, content-type resolution,
//!   container graph assembly and HTTP method dispatch
//! - [`FsStore`], the filesystem-backed store (real disk or a process-local tree)
//! - content negotiation and the GET/HEAD handler
//!
//! **No transport concerns**: binding to a socket and mapping failures to status codes belong in
//! `api-rest`.
//!
//! ```text
//! StoreDecorator ──► StoreDecorator ──► FsStore ──► FilesService ──► OsSubstrate | MemorySubstrate
//! ```

pub mod config;
pub mod constants;
pub mod container;
pub mod content_type;
pub mod decorator;
pub mod error;
pub mod fs_store;
pub mod handlers;
pub mod negotiation;
pub mod rdf;
pub mod store;
pub mod uri;
pub mod vocab;

#[cfg(test)]
pub(crate) mod testing;

pub use config::StoreConfig;
pub use decorator::StoreDecorator;
pub use error::{StoreError, StoreResult};
pub use fs_store::FsStore;
pub use handlers::{HandlerKey, Handlers, MethodHandler};
pub use ldp_types::{Content, Descriptor, Encoding, ResourceKind};
pub use negotiation::Negotiator;
pub use store::{LdpRequest, LdpResponse, Store, UriLike};
