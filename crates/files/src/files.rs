//! Filesystem backend implementation
//!
//! [`FilesService`] is bound to one root directory and translates already-resolved resource
//! URLs into paths below that root. It never resolves identifiers itself; URL canonicalisation
//! and traversal rejection happen in the store layer before a URL reaches this service.
//!
//! # Path Derivation
//!
//! ```text
//! http://pod.example/notes/a%20b.ttl
//!   include_host = false  ->  <root>/notes/a b.ttl
//!   include_host = true   ->  <root>/pod.example/notes/a b.ttl
//! ```
//!
//! Each path segment is percent-decoded on its own. A segment that decodes to `.` or `..`, or
//! that contains a separator or NUL byte, is rejected, so a derived path cannot escape the root.
//!
//! # Descriptors
//!
//! [`FilesService::describe`] stats without following symlinks. Any stat failure, and any node
//! that is neither a regular file nor a directory, yields `None`. The same holds for every
//! existing component between the root and the target: a symlinked directory halfway down the
//! path makes the target absent for `describe` and an invalid path for every other operation.

use crate::substrate::{
    MemorySubstrate, NodeKind, OsSubstrate, ReadStream, Substrate, WriteStream,
};
use crate::FilesError;
use ldp_types::{Descriptor, ResourceKind};
use std::path::{Path, PathBuf};
use url::Url;

/// Filesystem backend bound to a root directory
#[derive(Debug)]
pub struct FilesService<S: Substrate = OsSubstrate> {
    /// Root directory holding every resource
    root_directory: PathBuf,

    /// Whether the URL host becomes the first path segment
    include_host: bool,

    substrate: S,
}

impl FilesService<OsSubstrate> {
    /// Creates a `FilesService` over the real filesystem
    ///
    /// # Arguments
    ///
    /// * `root_directory` - Existing directory that holds all resources
    /// * `include_host` - Prefix every path with the URL host (multi-tenant layout)
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidRootDirectory` if the root does not exist, is not a
    /// directory, or cannot be canonicalised.
    pub fn new(root_directory: &Path, include_host: bool) -> Result<Self, FilesError> {
        if !root_directory.exists() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Directory does not exist: {}",
                root_directory.display()
            )));
        }

        if !root_directory.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                root_directory.display()
            )));
        }

        let root_directory = root_directory.canonicalize().map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                root_directory.display(),
                e
            ))
        })?;

        Ok(Self::with_substrate(root_directory, include_host, OsSubstrate))
    }
}

impl FilesService<MemorySubstrate> {
    /// Creates a `FilesService` over a fresh process-local tree rooted at `/`
    pub fn in_memory(include_host: bool) -> Self {
        Self::with_substrate(PathBuf::from("/"), include_host, MemorySubstrate::new())
    }
}

impl<S: Substrate> FilesService<S> {
    /// Creates a `FilesService` over an arbitrary substrate without validating the root
    pub fn with_substrate(root_directory: PathBuf, include_host: bool, substrate: S) -> Self {
        Self {
            root_directory,
            include_host,
            substrate,
        }
    }

    #[must_use]
    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    #[must_use]
    pub fn include_host(&self) -> bool {
        self.include_host
    }

    /// Derives the physical path of a resource URL
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidPath` if the host is required but missing, or if any
    /// decoded segment is unsafe.
    pub fn path_for(&self, url: &Url) -> Result<PathBuf, FilesError> {
        let mut path = self.root_directory.clone();

        if self.include_host {
            let host = url
                .host_str()
                .ok_or_else(|| FilesError::InvalidPath(format!("URL has no host: {url}")))?;
            push_segment(&mut path, host)?;
        }

        if let Some(segments) = url.path_segments() {
            for segment in segments.filter(|s| !s.is_empty()) {
                let decoded = urlencoding::decode(segment).map_err(|e| {
                    FilesError::InvalidPath(format!("Segment {segment} is not UTF-8: {e}"))
                })?;
                push_segment(&mut path, &decoded)?;
            }
        }

        Ok(path)
    }

    /// Stats a resource and returns its descriptor
    ///
    /// # Returns
    ///
    /// `Ok(None)` if the path cannot be stat'ed or is neither a regular file nor a directory.
    ///
    /// # Errors
    ///
    /// Only path derivation fails; stat failures are reported as absence.
    pub async fn describe(&self, url: &Url) -> Result<Option<Descriptor>, FilesError> {
        let path = self.path_for(url)?;
        if let Some(link) = self.first_special_component(&path).await {
            tracing::trace!("{} passes through {}", path.display(), link.display());
            return Ok(None);
        }

        let metadata = match self.substrate.metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::trace!("stat failed for {}: {}", path.display(), e);
                return Ok(None);
            }
        };

        let kind = match metadata.kind {
            NodeKind::File => ResourceKind::File,
            NodeKind::Directory => ResourceKind::Directory,
            NodeKind::Other => return Ok(None),
        };

        Ok(Some(Descriptor::new(
            canonical_uri(url, kind),
            metadata.len,
            metadata.modified,
            kind,
        )))
    }

    /// Returns the raw entry names of a directory
    ///
    /// # Errors
    ///
    /// Returns `FilesError::Io` if the directory cannot be read.
    pub async fn entry_names(&self, url: &Url) -> Result<Vec<String>, FilesError> {
        let path = self.contained_path(url).await?;
        Ok(self.substrate.read_dir(&path).await?)
    }

    /// Reads the whole content of a file
    ///
    /// # Errors
    ///
    /// Returns `FilesError::NotAFile` if the target is a directory, and `FilesError::Io`
    /// (including not-found) from the underlying read otherwise.
    pub async fn read(&self, url: &Url) -> Result<Vec<u8>, FilesError> {
        self.require_not_directory(url, FilesError::NotAFile).await?;
        let path = self.contained_path(url).await?;
        Ok(self.substrate.read(&path).await?)
    }

    /// Writes a file, creating missing parent directories first
    ///
    /// # Errors
    ///
    /// Returns `FilesError::IsADirectory` if the target is a directory, or `FilesError::Io`
    /// if a parent cannot be created or the write fails.
    pub async fn write(&self, url: &Url, contents: &[u8]) -> Result<(), FilesError> {
        self.require_not_directory(url, FilesError::IsADirectory)
            .await?;
        let path = self.contained_path(url).await?;
        self.ensure_parent_exists(&path).await?;
        Ok(self.substrate.write(&path, contents).await?)
    }

    /// Deletes a file, or a directory with everything below it
    ///
    /// # Errors
    ///
    /// Returns `FilesError::NotFound` if no descriptor exists for the target.
    pub async fn remove(&self, url: &Url) -> Result<(), FilesError> {
        let descriptor = self
            .describe(url)
            .await?
            .ok_or_else(|| FilesError::NotFound(url.to_string()))?;
        let path = self.contained_path(url).await?;

        if descriptor.is_directory() {
            self.substrate.remove_dir_all(&path).await?;
        } else {
            self.substrate.remove_file(&path).await?;
        }
        Ok(())
    }

    /// Opens a streaming reader over a file
    ///
    /// # Errors
    ///
    /// Returns `FilesError::NotAFile` if the target is a directory.
    pub async fn open_read(&self, url: &Url) -> Result<ReadStream, FilesError> {
        self.require_not_directory(url, FilesError::NotAFile).await?;
        let path = self.contained_path(url).await?;
        Ok(self.substrate.open_read(&path).await?)
    }

    /// Opens a streaming writer into a file, creating missing parents first
    ///
    /// # Errors
    ///
    /// Returns `FilesError::IsADirectory` if the target is a directory.
    pub async fn open_write(&self, url: &Url) -> Result<WriteStream, FilesError> {
        self.require_not_directory(url, FilesError::IsADirectory)
            .await?;
        let path = self.contained_path(url).await?;
        self.ensure_parent_exists(&path).await?;
        Ok(self.substrate.open_write(&path).await?)
    }

    /// Derives the physical path and refuses it when an existing component is not a plain
    /// directory or file
    async fn contained_path(&self, url: &Url) -> Result<PathBuf, FilesError> {
        let path = self.path_for(url)?;
        match self.first_special_component(&path).await {
            Some(link) => Err(FilesError::InvalidPath(format!(
                "{} is not a regular file or directory",
                link.display()
            ))),
            None => Ok(path),
        }
    }

    /// Walks from the root towards `path` and returns the first existing component that is a
    /// symlink or special node. The walk stops at the first missing component.
    async fn first_special_component(&self, path: &Path) -> Option<PathBuf> {
        let relative = path.strip_prefix(&self.root_directory).ok()?;
        let mut current = self.root_directory.clone();
        for component in relative.components() {
            current.push(component);
            match self.substrate.metadata(&current).await {
                Ok(metadata) if metadata.kind == NodeKind::Other => return Some(current),
                Ok(_) => {}
                Err(_) => return None,
            }
        }
        None
    }

    async fn require_not_directory(
        &self,
        url: &Url,
        error: fn(String) -> FilesError,
    ) -> Result<(), FilesError> {
        match self.describe(url).await? {
            Some(descriptor) if descriptor.is_directory() => Err(error(url.to_string())),
            _ => Ok(()),
        }
    }

    /// One stat, then a create that tolerates the directory appearing in between
    async fn ensure_parent_exists(&self, path: &Path) -> Result<(), FilesError> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };

        if let Ok(metadata) = self.substrate.metadata(parent).await {
            if metadata.kind == NodeKind::Directory {
                return Ok(());
            }
        }

        match self.substrate.create_dir_all(parent).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                match self.substrate.metadata(parent).await {
                    Ok(metadata) if metadata.kind == NodeKind::Directory => Ok(()),
                    _ => Err(FilesError::Io(e)),
                }
            }
            Err(e) => Err(FilesError::Io(e)),
        }
    }
}

fn push_segment(path: &mut PathBuf, segment: &str) -> Result<(), FilesError> {
    if segment == "." || segment == ".." || segment.contains(['/', '\\', '\0']) {
        return Err(FilesError::InvalidPath(format!(
            "Disallowed path segment: {segment:?}"
        )));
    }
    path.push(segment);
    Ok(())
}

/// Directory URIs end with `/`, file URIs do not. Query and fragment are dropped.
fn canonical_uri(url: &Url, kind: ResourceKind) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.set_fragment(None);

    let path = url.path().to_owned();
    match kind {
        ResourceKind::Directory if !path.ends_with('/') => url.set_path(&format!("{path}/")),
        ResourceKind::File if path.len() > 1 && path.ends_with('/') => {
            url.set_path(path.trim_end_matches('/'))
        }
        _ => {}
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn url(path: &str) -> Url {
        Url::parse("http://pod.example").unwrap().join(path).unwrap()
    }

    fn create_service(temp: &TempDir) -> FilesService {
        FilesService::new(temp.path(), false).unwrap()
    }

    #[test]
    fn test_files_service_root_not_exists() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("non-existent");

        let service = FilesService::new(&root, false);

        assert!(matches!(service, Err(FilesError::InvalidRootDirectory(_))));
    }

    #[test]
    fn test_files_service_root_not_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("file.txt");
        fs::write(&root, "not a directory").unwrap();

        let service = FilesService::new(&root, false);

        assert!(matches!(service, Err(FilesError::InvalidRootDirectory(_))));
    }

    #[test]
    fn test_path_for_stays_within_root() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);

        let path = service.path_for(&url("/notes/a%20b.ttl")).unwrap();
        assert!(path.starts_with(service.root_directory()));
        assert!(path.ends_with("notes/a b.ttl"));
    }

    #[test]
    fn test_path_for_includes_host() {
        let temp = TempDir::new().unwrap();
        let service = FilesService::new(temp.path(), true).unwrap();

        let path = service.path_for(&url("/notes/")).unwrap();
        assert!(path.ends_with("pod.example/notes"));
    }

    #[test]
    fn test_path_for_rejects_encoded_separators_and_dots() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);

        assert!(matches!(
            service.path_for(&url("/a/..%2Fsecret")),
            Err(FilesError::InvalidPath(_))
        ));
        assert!(matches!(
            service.path_for(&url("/a/%00")),
            Err(FilesError::InvalidPath(_))
        ));
    }

    #[tokio::test]
    async fn test_describe_missing_is_none() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);

        assert!(service.describe(&url("/missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_describe_canonicalises_directory_uri() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a")).unwrap();
        let service = create_service(&temp);

        let descriptor = service.describe(&url("/a")).await.unwrap().unwrap();
        assert!(descriptor.is_directory());
        assert_eq!(descriptor.uri, "http://pod.example/a/");
    }

    #[tokio::test]
    async fn test_describe_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.ttl"), b"0123456789").unwrap();
        let service = create_service(&temp);

        let descriptor = service.describe(&url("/b.ttl")).await.unwrap().unwrap();
        assert!(descriptor.is_file());
        assert_eq!(descriptor.size, 10);
        assert_eq!(descriptor.uri, "http://pod.example/b.ttl");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_describe_symlink_is_none() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("target"), b"x").unwrap();
        std::os::unix::fs::symlink(temp.path().join("target"), temp.path().join("link")).unwrap();
        let service = create_service(&temp);

        assert!(service.describe(&url("/link")).await.unwrap().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_directory_does_not_leave_root() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.txt"), b"outside-root").unwrap();
        let temp = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), temp.path().join("link")).unwrap();
        let service = create_service(&temp);

        assert!(service.describe(&url("/link/")).await.unwrap().is_none());
        assert!(service.describe(&url("/link/secret.txt")).await.unwrap().is_none());
        assert!(matches!(
            service.read(&url("/link/secret.txt")).await,
            Err(FilesError::InvalidPath(_))
        ));
        assert!(matches!(
            service.entry_names(&url("/link/")).await,
            Err(FilesError::InvalidPath(_))
        ));
        assert!(service.open_read(&url("/link/secret.txt")).await.is_err());
        assert!(service.write(&url("/link/new.txt"), b"x").await.is_err());
        assert!(service.remove(&url("/link/secret.txt")).await.unwrap_err().is_not_found());
        assert!(!outside.path().join("new.txt").exists());
        assert!(outside.path().join("secret.txt").exists());
    }

    #[tokio::test]
    async fn test_write_creates_parents_and_reads_back() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);

        service.write(&url("/x/y/z.txt"), b"hello").await.unwrap();

        assert!(temp.path().join("x/y").is_dir());
        assert_eq!(service.read(&url("/x/y/z.txt")).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_write_to_directory_fails() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("dir")).unwrap();
        let service = create_service(&temp);

        let result = service.write(&url("/dir"), b"x").await;
        assert!(matches!(result, Err(FilesError::IsADirectory(_))));
    }

    #[tokio::test]
    async fn test_read_directory_fails_not_a_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("dir")).unwrap();
        let service = create_service(&temp);

        let result = service.read(&url("/dir/")).await;
        assert!(matches!(result, Err(FilesError::NotAFile(_))));
    }

    #[tokio::test]
    async fn test_read_missing_is_io_not_found() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);

        let error = service.read(&url("/nope.txt")).await.unwrap_err();
        assert!(matches!(error, FilesError::Io(_)));
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn test_remove_directory_recursively() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);
        service.write(&url("/tree/a/b.txt"), b"b").await.unwrap();
        service.write(&url("/tree/c.txt"), b"c").await.unwrap();

        service.remove(&url("/tree/")).await.unwrap();

        assert!(!temp.path().join("tree").exists());
    }

    #[tokio::test]
    async fn test_remove_missing_fails_not_found() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);

        let result = service.remove(&url("/ghost")).await;
        assert!(matches!(result, Err(FilesError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_streams_on_disk() {
        let temp = TempDir::new().unwrap();
        let service = create_service(&temp);

        let mut writer = service.open_write(&url("/s/stream.bin")).await.unwrap();
        writer.write_all(&[0, 1, 2, 255]).await.unwrap();
        writer.shutdown().await.unwrap();
        drop(writer);

        let mut reader = service.open_read(&url("/s/stream.bin")).await.unwrap();
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer).await.unwrap();
        assert_eq!(buffer, vec![0, 1, 2, 255]);
    }

    #[tokio::test]
    async fn test_in_memory_service_roundtrip() {
        let service = FilesService::in_memory(false);

        service.write(&url("/m/data.bin"), &[9, 8, 7]).await.unwrap();

        let descriptor = service.describe(&url("/m/")).await.unwrap().unwrap();
        assert!(descriptor.is_directory());
        assert_eq!(service.entry_names(&url("/m/")).await.unwrap(), vec!["data.bin"]);
        assert_eq!(service.read(&url("/m/data.bin")).await.unwrap(), vec![9, 8, 7]);
    }
}
