//! Error handling for PLY ingestion.
//!
//! Every failure aborts exactly one load attempt. The variants map onto the
//! stage at which the attempt stopped, see [`LoadStage`].

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Stage of a model load at which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadStage {
    /// The file could not be opened.
    Open,
    /// The header was malformed or declared something unsupported.
    Header,
    /// The body could not be decoded.
    Stream,
    /// The GPU collaborator rejected the staged mesh.
    Upload,
}

impl LoadStage {
    /// Returns the name of this stage as a string
    pub const fn name(self) -> &'static str {
        match self {
            LoadStage::Open => "OPEN",
            LoadStage::Header => "HEADER",
            LoadStage::Stream => "STREAM",
            LoadStage::Upload => "UPLOAD",
        }
    }
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Error, Debug)]
pub enum PlyError {
    #[error("Cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Header error: {0}")]
    Header(String),
    #[error("Stream error: {0}")]
    Stream(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Upload error: {0}")]
    Upload(String),
}

impl PlyError {
    /// Returns the load stage this error aborts.
    ///
    /// Plain I/O errors only surface while the body is being read, so they
    /// count as stream failures.
    pub fn stage(&self) -> LoadStage {
        match self {
            PlyError::Open { .. } => LoadStage::Open,
            PlyError::Header(_) => LoadStage::Header,
            PlyError::Stream(_) | PlyError::Io(_) => LoadStage::Stream,
            PlyError::Upload(_) => LoadStage::Upload,
        }
    }
}

pub type Status<T> = Result<T, PlyError>;

pub fn header_error(msg: impl Into<String>) -> PlyError {
    PlyError::Header(msg.into())
}

pub fn stream_error(msg: impl Into<String>) -> PlyError {
    PlyError::Stream(msg.into())
}
