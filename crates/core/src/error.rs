use ldp_files::FilesError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("invalid child uri: {0}")]
    InvalidChild(String),
    #[error("invalid root url: {0}")]
    InvalidRootUrl(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unsupported method {0}")]
    UnsupportedMethod(String),
    #[error("no handler registered for method {0}")]
    MethodNotImplemented(String),

    #[error("not a file: {0}")]
    NotAFile(String),
    #[error("{0} is a directory")]
    IsADirectory(String),
    #[error("not found: {0}")]
    NotFound(String),

    #[error("malformed metadata in {uri}: {message}")]
    MalformedMetadata { uri: String, message: String },
    #[error("failed to parse {media_type} document {uri}: {message}")]
    RdfParse {
        uri: String,
        media_type: String,
        message: String,
    },
    #[error("failed to serialize graph as {media_type}: {message}")]
    RdfSerialize { media_type: String, message: String },
    #[error("cannot serialize graph as {0}")]
    UnsupportedSerialization(String),

    #[error("content is not valid UTF-8: {0}")]
    Content(#[from] ldp_types::ContentError),
    #[error("failed to parse url: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to build response: {0}")]
    Http(#[from] http::Error),
    #[error("storage error: {0}")]
    Files(FilesError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` when the failure means the target does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Files(e) => e.is_not_found(),
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Returns `true` for failures caused by the request itself rather than by storage.
    pub fn is_invalid_identifier(&self) -> bool {
        matches!(self, Self::InvalidIdentifier(_) | Self::InvalidChild(_))
    }
}

impl From<FilesError> for StoreError {
    fn from(error: FilesError) -> Self {
        match error {
            FilesError::InvalidPath(path) => Self::InvalidIdentifier(path),
            FilesError::NotAFile(uri) => Self::NotAFile(uri),
            FilesError::IsADirectory(uri) => Self::IsADirectory(uri),
            FilesError::NotFound(uri) => Self::NotFound(uri),
            other => Self::Files(other),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
