//! LDP File Storage
//!
//! This crate provides the filesystem backend for the LDP resource server: it maps resource
//! URLs onto paths below a single root directory and performs stat, read, write, list and
//! delete operations there.
//!
//! ## Design Principles
//!
//! - A resource is either a regular file or a directory; anything else is invisible
//! - Paths are derived from already-resolved URLs, one percent-decoded segment at a time
//! - No derived path can leave the root directory
//! - The physical storage is a [`Substrate`]: the real filesystem, or a process-local tree
//!
//! ## Storage Layout
//!
//! ```text
//! <root>/
//! └── [<host>/]          # only when the host segment is included
//!     └── <url path segments…>
//!         ├── .meta      # metadata sidecar of the directory
//!         └── .acl       # access-control sidecar of the directory
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use ldp_files::FilesService;
//! use std::path::Path;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let service = FilesService::new(Path::new("ldp_data"), false)?;
//! let url = url::Url::parse("http://localhost:3000/notes/today.ttl")?;
//!
//! service.write(&url, b"<> a <#Note> .").await?;
//! let descriptor = service.describe(&url).await?;
//! assert!(descriptor.is_some_and(|d| d.is_file()));
//! # Ok(())
//! # }
//! ```

mod files;
mod substrate;

pub use files::FilesService;
pub use ldp_types::{Descriptor, ResourceKind};
pub use substrate::{
    MemorySubstrate, NodeKind, NodeMetadata, OsSubstrate, ReadStream, Substrate, WriteStream,
};

/// Errors that can occur during file operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Root directory does not exist or is not a directory
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// Path validation failed (traversal segment or unsafe characters)
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Operation requires a regular file but found a directory
    #[error("Not a file: {0}")]
    NotAFile(String),

    /// Operation would replace a directory with a file
    #[error("{0} is a directory")]
    IsADirectory(String),

    /// Delete target does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FilesError {
    /// Returns `true` when the failure means the target does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
