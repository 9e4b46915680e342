pub mod connection;
pub mod error;
pub mod protocol;
pub mod transport;

#[cfg(test)]
mod test_utils;

pub use connection::{Connection, ConnectionConfig, ConnectionEvent, HttpConnection};
pub use error::{Error, ErrorKind};
pub use protocol::*;
pub use transport::{
    AbortState, ClientTransport, Endpoint, HttpTransport, HttpTransportFactory, TransportConfig,
    TransportFactory, TransportType, ABORT_TIMEOUT, NEGOTIATE_TIMEOUT,
};

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, Error>;
