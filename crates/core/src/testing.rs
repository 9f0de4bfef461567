//! Test doubles shared by the unit tests of this crate.

use crate::config::StoreConfig;
use crate::fs_store::FsStore;
use crate::store::{Store, UriLike};
use crate::StoreResult;
use async_trait::async_trait;
use ldp_files::{MemorySubstrate, NodeMetadata, ReadStream, Substrate, WriteStream};
use ldp_types::{Content, Descriptor, Encoding};
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory backend that counts every storage call reaching it.
#[derive(Debug)]
pub struct RecordingStore {
    backend: FsStore<MemorySubstrate>,
    calls: AtomicUsize,
    reads: AtomicUsize,
}

impl RecordingStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            backend: FsStore::in_memory(Arc::new(config)),
            calls: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
        }
    }

    /// Every storage call, including descriptor lookups.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Content reads only.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for RecordingStore {
    fn config(&self) -> &StoreConfig {
        self.backend.config()
    }

    async fn get_descriptor(&self, uri: UriLike) -> StoreResult<Option<Descriptor>> {
        self.record();
        self.backend.get_descriptor(uri).await
    }

    async fn list(&self, uri: UriLike) -> StoreResult<Vec<Descriptor>> {
        self.record();
        self.backend.list(uri).await
    }

    async fn get(&self, uri: UriLike, encoding: Encoding) -> StoreResult<Content> {
        self.record();
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.backend.get(uri, encoding).await
    }

    async fn put(&self, uri: UriLike, content: Content) -> StoreResult<()> {
        self.record();
        self.backend.put(uri, content).await
    }

    async fn delete(&self, uri: UriLike) -> StoreResult<()> {
        self.record();
        self.backend.delete(uri).await
    }

    async fn create_read_stream(&self, uri: UriLike) -> StoreResult<ReadStream> {
        self.record();
        self.backend.create_read_stream(uri).await
    }

    async fn create_write_stream(&self, uri: UriLike) -> StoreResult<WriteStream> {
        self.record();
        self.backend.create_write_stream(uri).await
    }
}

/// Process-local tree whose directory listings also name an entry that no longer exists,
/// as if it was removed between the listing and the stat.
#[derive(Debug, Default)]
pub struct VanishingSubstrate {
    tree: MemorySubstrate,
    ghost: String,
}

impl VanishingSubstrate {
    pub fn new(ghost: &str) -> Self {
        Self {
            tree: MemorySubstrate::new(),
            ghost: ghost.to_string(),
        }
    }
}

#[async_trait]
impl Substrate for VanishingSubstrate {
    async fn metadata(&self, path: &Path) -> io::Result<NodeMetadata> {
        self.tree.metadata(path).await
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut names = self.tree.read_dir(path).await?;
        names.push(self.ghost.clone());
        Ok(names)
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.tree.read(path).await
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.tree.write(path, contents).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.tree.create_dir_all(path).await
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.tree.remove_file(path).await
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        self.tree.remove_dir_all(path).await
    }

    async fn open_read(&self, path: &Path) -> io::Result<ReadStream> {
        self.tree.open_read(path).await
    }

    async fn open_write(&self, path: &Path) -> io::Result<WriteStream> {
        self.tree.open_write(path).await
    }
}
