//! Filesystem backend.
//!
//! [`FsStore`] maps resolved URLs to paths under a root directory through
//! [`ldp_files::FilesService`]. The same code drives the real disk ([`OsSubstrate`]) and the
//! process-local tree ([`MemorySubstrate`]).

use crate::config::StoreConfig;
use crate::decorator::StoreDecorator;
use crate::store::{Store, UriLike};
use crate::{uri, StoreResult};
use async_trait::async_trait;
use futures::future::join_all;
use ldp_files::{
    Descriptor, FilesService, MemorySubstrate, OsSubstrate, ReadStream, Substrate, WriteStream,
};
use ldp_types::{Content, Encoding};
use std::path::Path;
use std::sync::Arc;
use url::Url;

#[derive(Debug)]
pub struct FsStore<S: Substrate = OsSubstrate> {
    files: FilesService<S>,
    config: Arc<StoreConfig>,
}

impl FsStore {
    /// Create a store rooted at an existing directory on disk.
    ///
    /// # Errors
    /// Returns `StoreError::Files` if `root_directory` does not exist or is not a directory.
    pub fn new(root_directory: &Path, config: Arc<StoreConfig>) -> StoreResult<Self> {
        let files = FilesService::new(root_directory, config.include_host())?;
        Ok(Self { files, config })
    }
}

impl FsStore<MemorySubstrate> {
    /// Create a store over an empty process-local tree.
    pub fn in_memory(config: Arc<StoreConfig>) -> Self {
        let files = FilesService::in_memory(config.include_host());
        Self { files, config }
    }
}

impl<S: Substrate> FsStore<S> {
    /// Create a store over an already configured files service.
    pub fn with_files(files: FilesService<S>, config: Arc<StoreConfig>) -> Self {
        Self { files, config }
    }

    pub fn files(&self) -> &FilesService<S> {
        &self.files
    }

    async fn describe_child(&self, directory: &Url, name: &str) -> StoreResult<Option<Descriptor>> {
        let child = uri::join_child(directory, &format!("./{}", urlencoding::encode(name)))?;
        Ok(self.files.describe(&child).await?)
    }
}

#[async_trait]
impl<S: Substrate> Store for FsStore<S> {
    fn config(&self) -> &StoreConfig {
        &self.config
    }

    async fn get_descriptor(&self, uri: UriLike) -> StoreResult<Option<Descriptor>> {
        let url = self.get_url(&uri)?;
        Ok(self.files.describe(&url).await?)
    }

    async fn list(&self, uri: UriLike) -> StoreResult<Vec<Descriptor>> {
        let url = self.get_url(&uri)?;
        match self.files.describe(&url).await? {
            Some(descriptor) if descriptor.is_directory() => {}
            _ => return Ok(Vec::new()),
        }

        let names = self.files.entry_names(&url).await?;
        let lookups = names.iter().map(|name| self.describe_child(&url, name));
        let mut children = Vec::with_capacity(names.len());
        for (name, result) in names.iter().zip(join_all(lookups).await) {
            match result {
                Ok(Some(descriptor)) => children.push(descriptor),
                Ok(None) => tracing::debug!("skipping {} in {}: gone or not a file", name, url),
                Err(e) => tracing::warn!("skipping {} in {}: {}", name, url, e),
            }
        }
        Ok(children)
    }

    async fn get(&self, uri: UriLike, encoding: Encoding) -> StoreResult<Content> {
        let url = self.get_url(&uri)?;
        let bytes = self.files.read(&url).await?;
        Ok(Content::decode(bytes, encoding)?)
    }

    async fn put(&self, uri: UriLike, content: Content) -> StoreResult<()> {
        let url = self.get_url(&uri)?;
        self.files.write(&url, content.as_bytes()).await?;
        tracing::debug!("wrote {} bytes to {}", content.as_bytes().len(), url);
        Ok(())
    }

    async fn delete(&self, uri: UriLike) -> StoreResult<()> {
        let url = self.get_url(&uri)?;
        self.files.remove(&url).await?;
        Ok(())
    }

    async fn create_read_stream(&self, uri: UriLike) -> StoreResult<ReadStream> {
        let url = self.get_url(&uri)?;
        Ok(self.files.open_read(&url).await?)
    }

    async fn create_write_stream(&self, uri: UriLike) -> StoreResult<WriteStream> {
        let url = self.get_url(&uri)?;
        Ok(self.files.open_write(&url).await?)
    }
}

impl StoreDecorator {
    /// Decorated filesystem store rooted at `root_directory`.
    pub fn on_filesystem(root_directory: &Path, config: StoreConfig) -> StoreResult<Self> {
        let config = Arc::new(config);
        let backend = FsStore::new(root_directory, config.clone())?;
        Ok(Self::with_config(Arc::new(backend), config))
    }

    /// Decorated store over a fresh process-local tree.
    ///
    /// Composed as decorator → decorator → filesystem backend, so a request passes through two
    /// layers of resolution before reaching the tree. The inner layer only resolves; method
    /// dispatch uses the handler table of the returned decorator.
    pub fn in_memory(config: StoreConfig) -> Self {
        let config = Arc::new(config);
        let backend = FsStore::in_memory(config.clone());
        let filesystem = Self::resolving(Arc::new(backend), config.clone());
        Self::with_config(Arc::new(filesystem), config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::VanishingSubstrate;
    use crate::StoreError;
    use tempfile::TempDir;

    fn config() -> Arc<StoreConfig> {
        Arc::new(StoreConfig::new("http://localhost:3000/").unwrap())
    }

    fn disk_store() -> (TempDir, FsStore) {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path(), config()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_new_rejects_missing_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(FsStore::new(&missing, config()).is_err());
    }

    #[tokio::test]
    async fn test_put_get_text_on_disk() {
        let (dir, store) = disk_store();
        store.put("/a/b.ttl".into(), "<> a <x> .".into()).await.unwrap();

        let content = store.get("/a/b.ttl".into(), Encoding::Utf8).await.unwrap();
        assert_eq!(content, Content::Text("<> a <x> .".into()));
        assert!(dir.path().join("a").join("b.ttl").is_file());
    }

    #[tokio::test]
    async fn test_put_get_binary_in_memory() {
        let store = FsStore::in_memory(config());
        let bytes = vec![0u8, 159, 146, 150, 255];
        store.put("/img/x.png".into(), bytes.clone().into()).await.unwrap();

        let content = store.get("/img/x.png".into(), Encoding::Binary).await.unwrap();
        assert_eq!(content.into_bytes(), bytes);
    }

    #[tokio::test]
    async fn test_put_get_binary_on_disk() {
        let (dir, store) = disk_store();
        let bytes = vec![0u8, 159, 146, 150, 255];
        store.put("/img/x.png".into(), bytes.clone().into()).await.unwrap();

        let content = store.get("/img/x.png".into(), Encoding::Binary).await.unwrap();
        assert_eq!(content.into_bytes(), bytes);
        assert_eq!(fs_len(&dir, "img/x.png"), 5);
    }

    #[tokio::test]
    async fn test_put_get_text_in_memory() {
        let store = FsStore::in_memory(config());
        store.put("/notes/día.txt".into(), "héllo wörld".into()).await.unwrap();

        let content = store.get("/notes/día.txt".into(), Encoding::Utf8).await.unwrap();
        assert_eq!(content, Content::Text("héllo wörld".into()));
    }

    fn fs_len(dir: &TempDir, relative: &str) -> u64 {
        std::fs::metadata(dir.path().join(relative)).unwrap().len()
    }

    #[tokio::test]
    async fn test_repeated_descriptor_lookups_agree() {
        let (_dir, disk) = disk_store();
        let memory = FsStore::in_memory(config());
        let stores: [&dyn Store; 2] = [&disk, &memory];

        for store in stores {
            store.put("/a/b.ttl".into(), "0123456789".into()).await.unwrap();
            for uri in ["/a/b.ttl", "/a/"] {
                let first = store.get_descriptor(uri.into()).await.unwrap().unwrap();
                let second = store.get_descriptor(uri.into()).await.unwrap().unwrap();
                assert_eq!(first.uri, second.uri);
                assert_eq!(first.size, second.size);
                assert_eq!(first.modified, second.modified);
                assert_eq!(first.kind, second.kind);

                let again = store.get_descriptor(first.uri.as_str().into()).await.unwrap();
                assert_eq!(again, Some(first));
            }
        }
    }

    #[tokio::test]
    async fn test_list_skips_entries_that_vanish() {
        let files = FilesService::with_substrate("/".into(), false, VanishingSubstrate::new("ghost.ttl"));
        let store = FsStore::with_files(files, config());
        store.put("/a/b.ttl".into(), "b".into()).await.unwrap();

        let children = store.list("/a/".into()).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].uri, "http://localhost:3000/a/b.ttl");
    }

    #[tokio::test]
    async fn test_descriptor_urls_are_canonical() {
        let (_dir, store) = disk_store();
        store.put("/a/b.ttl".into(), "x".into()).await.unwrap();

        let dir = store.get_descriptor("/a".into()).await.unwrap().unwrap();
        assert!(dir.is_directory());
        assert_eq!(dir.uri, "http://localhost:3000/a/");

        let file = store.get_descriptor("/a/b.ttl".into()).await.unwrap().unwrap();
        assert!(file.is_file());
        assert_eq!(file.size, 1);
        assert_eq!(file.uri, "http://localhost:3000/a/b.ttl");

        assert!(store.get_descriptor("/a/missing".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_returns_children() {
        let store = FsStore::in_memory(config());
        store.put("/a/b.ttl".into(), "0123456789".into()).await.unwrap();
        store.put("/a/c/d.txt".into(), "d".into()).await.unwrap();
        store.put("/a/my notes.txt".into(), "n".into()).await.unwrap();

        let mut uris: Vec<String> = store
            .list("/a/".into())
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.uri)
            .collect();
        uris.sort();
        assert_eq!(
            uris,
            vec![
                "http://localhost:3000/a/b.ttl",
                "http://localhost:3000/a/c/",
                "http://localhost:3000/a/my%20notes.txt",
            ]
        );
    }

    #[tokio::test]
    async fn test_list_of_file_or_missing_is_empty() {
        let store = FsStore::in_memory(config());
        store.put("/a/b.ttl".into(), "x".into()).await.unwrap();
        assert!(store.list("/a/b.ttl".into()).await.unwrap().is_empty());
        assert!(store.list("/nothing/".into()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_directory_then_list_is_empty() {
        let (_dir, store) = disk_store();
        store.put("/a/b.ttl".into(), "x".into()).await.unwrap();
        store.put("/a/c/d.ttl".into(), "y".into()).await.unwrap();

        store.delete("/a/".into()).await.unwrap();
        assert!(store.list("/a/".into()).await.unwrap().is_empty());
        assert!(store.get_descriptor("/a/".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let store = FsStore::in_memory(config());
        let err = store.delete("/ghost".into()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_directory_is_not_a_file() {
        let store = FsStore::in_memory(config());
        store.put("/a/b.ttl".into(), "x".into()).await.unwrap();
        let err = store.get("/a/".into(), Encoding::Utf8).await.unwrap_err();
        assert!(matches!(err, StoreError::NotAFile(_)));
    }

    #[tokio::test]
    async fn test_traversal_is_rejected() {
        let store = FsStore::in_memory(config());
        let err = store.get("/a/../../etc/passwd".into(), Encoding::Utf8).await.unwrap_err();
        assert!(err.is_invalid_identifier());
    }

    #[tokio::test]
    async fn test_streams_round_trip() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let (_dir, store) = disk_store();
        let mut writer = store.create_write_stream("/s/data.bin".into()).await.unwrap();
        writer.write_all(b"streamed").await.unwrap();
        writer.shutdown().await.unwrap();
        drop(writer);

        let mut reader = store.create_read_stream("/s/data.bin".into()).await.unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"streamed");
    }

    #[tokio::test]
    async fn test_include_host_partitions_by_host() {
        let dir = TempDir::new().unwrap();
        let config = Arc::new(
            StoreConfig::new("http://pod.example/")
                .unwrap()
                .with_include_host(true),
        );
        let store = FsStore::new(dir.path(), config).unwrap();
        store.put("/a.txt".into(), "hi".into()).await.unwrap();
        assert!(dir.path().join("pod.example").join("a.txt").is_file());
    }
}
