use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatPdfError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to load PDF {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    #[error("No extractable text in document: {0}")]
    EmptyDocument(String),

    #[error("Cannot build an index over zero passages")]
    EmptyInput,

    #[error("Embedding provider error: {0}")]
    Provider(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Answer synthesis error: {0}")]
    Synthesis(String),

    #[error("No document has been ingested yet")]
    NotReady,

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure category, for callers that branch on the kind of error rather
/// than on its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    NotFound,
    Load,
    EmptyDocument,
    EmptyInput,
    Provider,
    Synthesis,
    NotReady,
    InvalidQuestion,
    Io,
}

impl ChatPdfError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::TomlParsing(_) => ErrorKind::Config,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Load { .. } => ErrorKind::Load,
            Self::EmptyDocument(_) => ErrorKind::EmptyDocument,
            Self::EmptyInput => ErrorKind::EmptyInput,
            Self::Provider(_) | Self::DimensionMismatch { .. } => ErrorKind::Provider,
            Self::Synthesis(_) => ErrorKind::Synthesis,
            Self::NotReady => ErrorKind::NotReady,
            Self::InvalidQuestion(_) => ErrorKind::InvalidQuestion,
            Self::Serialization(_) | Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether repeating the same operation unchanged may succeed.
    ///
    /// Configuration and caller-misuse errors will fail the same way again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Provider | ErrorKind::Synthesis | ErrorKind::Io)
    }
}

pub type Result<T> = std::result::Result<T, ChatPdfError>;
