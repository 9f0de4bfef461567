//! Physical storage underneath [`crate::FilesService`].
//!
//! [`OsSubstrate`] talks to the real filesystem through `tokio::fs`. [`MemorySubstrate`] keeps a
//! process-local tree of directories and files and is used for ephemeral stores and tests.
//! Neither holds a handle open between calls.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::SystemTime;
use tokio::io::{AsyncRead, AsyncWrite};

/// Streaming reader over a stored file.
pub type ReadStream = Box<dyn AsyncRead + Send + Unpin>;

/// Streaming writer into a stored file.
pub type WriteStream = Box<dyn AsyncWrite + Send + Unpin>;

/// Kind of node found at a path, before any filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
    /// Symlinks, sockets, devices and other special entries
    Other,
}

/// Stat result of a single node.
#[derive(Debug, Clone, Copy)]
pub struct NodeMetadata {
    pub kind: NodeKind,
    pub len: u64,
    pub modified: SystemTime,
}

/// Filesystem operations the backend needs. Paths are absolute paths produced by
/// [`crate::FilesService`].
#[async_trait]
pub trait Substrate: Send + Sync + fmt::Debug + 'static {
    /// Stats a path without following symlinks.
    async fn metadata(&self, path: &Path) -> io::Result<NodeMetadata>;

    /// Returns the entry names of a directory.
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<String>>;

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Creates or truncates a file. The parent directory must already exist.
    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Creates a directory and all missing ancestors. Existing directories are not an error.
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    async fn remove_file(&self, path: &Path) -> io::Result<()>;

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    async fn open_read(&self, path: &Path) -> io::Result<ReadStream>;

    async fn open_write(&self, path: &Path) -> io::Result<WriteStream>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSubstrate;

#[async_trait]
impl Substrate for OsSubstrate {
    async fn metadata(&self, path: &Path) -> io::Result<NodeMetadata> {
        let metadata = tokio::fs::symlink_metadata(path).await?;
        let file_type = metadata.file_type();
        let kind = if file_type.is_file() {
            NodeKind::File
        } else if file_type.is_dir() {
            NodeKind::Directory
        } else {
            NodeKind::Other
        };

        Ok(NodeMetadata {
            kind,
            len: metadata.len(),
            modified: metadata.modified()?,
        })
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(path).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        tokio::fs::write(path, contents).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_dir_all(path).await
    }

    async fn open_read(&self, path: &Path) -> io::Result<ReadStream> {
        let file = tokio::fs::File::open(path).await?;
        Ok(Box::new(file))
    }

    async fn open_write(&self, path: &Path) -> io::Result<WriteStream> {
        let file = tokio::fs::File::create(path).await?;
        Ok(Box::new(file))
    }
}

#[derive(Debug, Clone)]
enum Node {
    Directory { modified: SystemTime },
    File { data: Vec<u8>, modified: SystemTime },
}

type NodeTree = Arc<RwLock<BTreeMap<PathBuf, Node>>>;

/// A process-local filesystem tree rooted at `/`.
///
/// Clones share the same tree.
#[derive(Debug, Clone)]
pub struct MemorySubstrate {
    nodes: NodeTree,
}

impl MemorySubstrate {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            PathBuf::from("/"),
            Node::Directory {
                modified: SystemTime::now(),
            },
        );
        Self {
            nodes: Arc::new(RwLock::new(nodes)),
        }
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no such file or directory: {}", path.display()),
        )
    }

    fn require_parent_directory(nodes: &BTreeMap<PathBuf, Node>, path: &Path) -> io::Result<()> {
        let parent = path.parent().ok_or_else(|| Self::not_found(path))?;
        match nodes.get(parent) {
            Some(Node::Directory { .. }) => Ok(()),
            Some(Node::File { .. }) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a directory: {}", parent.display()),
            )),
            None => Err(Self::not_found(parent)),
        }
    }

    fn create_file(&self, path: &Path, data: Vec<u8>) -> io::Result<()> {
        let mut nodes = self.nodes.write();
        Self::require_parent_directory(&nodes, path)?;
        if let Some(Node::Directory { .. }) = nodes.get(path) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("is a directory: {}", path.display()),
            ));
        }
        nodes.insert(
            path.to_path_buf(),
            Node::File {
                data,
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }
}

impl Default for MemorySubstrate {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Substrate for MemorySubstrate {
    async fn metadata(&self, path: &Path) -> io::Result<NodeMetadata> {
        let nodes = self.nodes.read();
        match nodes.get(path) {
            Some(Node::Directory { modified }) => Ok(NodeMetadata {
                kind: NodeKind::Directory,
                len: 0,
                modified: *modified,
            }),
            Some(Node::File { data, modified }) => Ok(NodeMetadata {
                kind: NodeKind::File,
                len: data.len() as u64,
                modified: *modified,
            }),
            None => Err(Self::not_found(path)),
        }
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let nodes = self.nodes.read();
        match nodes.get(path) {
            Some(Node::Directory { .. }) => {}
            Some(Node::File { .. }) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("not a directory: {}", path.display()),
                ))
            }
            None => return Err(Self::not_found(path)),
        }

        Ok(nodes
            .keys()
            .filter(|candidate| candidate.parent() == Some(path))
            .filter_map(|candidate| candidate.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect())
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        match self.nodes.read().get(path) {
            Some(Node::File { data, .. }) => Ok(data.clone()),
            Some(Node::Directory { .. }) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("is a directory: {}", path.display()),
            )),
            None => Err(Self::not_found(path)),
        }
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.create_file(path, contents.to_vec())
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut nodes = self.nodes.write();
        let mut missing: Vec<&Path> = path.ancestors().collect();
        missing.reverse();

        for ancestor in missing {
            match nodes.get(ancestor) {
                Some(Node::Directory { .. }) => {}
                Some(Node::File { .. }) => {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("file exists: {}", ancestor.display()),
                    ))
                }
                None => {
                    nodes.insert(
                        ancestor.to_path_buf(),
                        Node::Directory {
                            modified: SystemTime::now(),
                        },
                    );
                }
            }
        }
        Ok(())
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut nodes = self.nodes.write();
        match nodes.get(path) {
            Some(Node::File { .. }) => {
                nodes.remove(path);
                Ok(())
            }
            Some(Node::Directory { .. }) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("is a directory: {}", path.display()),
            )),
            None => Err(Self::not_found(path)),
        }
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut nodes = self.nodes.write();
        match nodes.get(path) {
            Some(Node::Directory { .. }) => {
                nodes.retain(|candidate, _| !candidate.starts_with(path));
                Ok(())
            }
            Some(Node::File { .. }) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a directory: {}", path.display()),
            )),
            None => Err(Self::not_found(path)),
        }
    }

    async fn open_read(&self, path: &Path) -> io::Result<ReadStream> {
        let data = self.read(path).await?;
        Ok(Box::new(io::Cursor::new(data)))
    }

    async fn open_write(&self, path: &Path) -> io::Result<WriteStream> {
        self.create_file(path, Vec::new())?;
        Ok(Box::new(MemoryWriter {
            nodes: Arc::clone(&self.nodes),
            path: path.to_path_buf(),
        }))
    }
}

/// Appends every write straight into the shared tree.
struct MemoryWriter {
    nodes: NodeTree,
    path: PathBuf,
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut nodes = self.nodes.write();
        match nodes.get_mut(&self.path) {
            Some(Node::File { data, modified }) => {
                data.extend_from_slice(buf);
                *modified = SystemTime::now();
                Poll::Ready(Ok(buf.len()))
            }
            _ => Poll::Ready(Err(MemorySubstrate::not_found(&self.path))),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
