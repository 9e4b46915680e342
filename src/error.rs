use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse failure classes a connection manager may branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connectivity failure or timeout
    Network,
    /// The server answered with a non-success status
    Protocol,
    /// The response body did not have the expected shape
    Decode,
    /// Anything raised locally before a request left the client
    Other,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Http(e) if e.is_decode() => ErrorKind::Decode,
            Error::Http(e) if e.is_status() => ErrorKind::Protocol,
            Error::Http(_) => ErrorKind::Network,
            Error::Status { .. } => ErrorKind::Protocol,
            Error::Serialization(_) => ErrorKind::Decode,
            Error::Transport(_) | Error::InvalidUrl(_) => ErrorKind::Other,
        }
    }

    /// Returns the HTTP status when the failure carried one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
