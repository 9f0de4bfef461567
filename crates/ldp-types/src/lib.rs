use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// Errors that can occur when converting resource content between encodings.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The stored bytes are not valid UTF-8 and cannot be returned as text
    #[error("content is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Whether a resource is a regular file or a directory.
///
/// Anything else on disk (symlinks, sockets, devices) never produces a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    File,
    Directory,
}

/// Metadata for one addressable resource.
///
/// A descriptor only exists for a resource that was found by a successful existence check;
/// absence is always `None`, never a descriptor with empty fields. Descriptors are produced
/// fresh on every lookup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Descriptor {
    /// Canonical URI of the resource. Directory URIs end with `/`.
    pub uri: String,

    /// Size of the resource in bytes, as reported by the backend
    pub size: u64,

    /// Last modification time
    pub modified: DateTime<Utc>,

    pub kind: ResourceKind,
}

impl Descriptor {
    /// Creates a new descriptor, converting the backend's modification time to UTC.
    pub fn new(uri: impl Into<String>, size: u64, modified: SystemTime, kind: ResourceKind) -> Self {
        Self {
            uri: uri.into(),
            size,
            modified: DateTime::<Utc>::from(modified),
            kind,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == ResourceKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == ResourceKind::Directory
    }

    /// Modification time in seconds since the Unix epoch, with millisecond precision.
    pub fn modified_epoch_seconds(&self) -> f64 {
        self.modified.timestamp_millis() as f64 / 1000.0
    }
}

/// How resource content should be returned by a read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    Binary,
}

/// Resource content, either decoded text or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Bytes(Vec<u8>),
}

impl Content {
    /// Decodes raw bytes into the requested encoding.
    pub fn decode(bytes: Vec<u8>, encoding: Encoding) -> Result<Self, ContentError> {
        match encoding {
            Encoding::Utf8 => Ok(Self::Text(String::from_utf8(bytes)?)),
            Encoding::Binary => Ok(Self::Bytes(bytes)),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.into_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }

    /// Returns the content as text, failing if raw bytes are not valid UTF-8.
    pub fn into_text(self) -> Result<String, ContentError> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Bytes(bytes) => Ok(String::from_utf8(bytes)?),
        }
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Vec<u8>> for Content {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for Content {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}
