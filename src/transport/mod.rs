use std::{fmt, time::Duration};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    connection::Connection,
    protocol::{NegotiationResponse, Payload},
    Result,
};

pub mod http;

pub use self::http::{AbortState, Endpoint, HttpTransport, HttpTransportFactory};

/// Timeout applied to the negotiation handshake
pub const NEGOTIATE_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout applied to the best-effort abort notification
pub const ABORT_TIMEOUT: Duration = Duration::from_secs(2);

/// Transport configuration
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Transport type
    pub transport_type: TransportType,
    /// Timeout for `negotiate`
    pub negotiate_timeout: Duration,
    /// Timeout for the abort request
    pub abort_timeout: Duration,
    /// Timeout for `send`; `None` keeps the HTTP client's default
    pub send_timeout: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            transport_type: TransportType::Auto,
            negotiate_timeout: NEGOTIATE_TIMEOUT,
            abort_timeout: ABORT_TIMEOUT,
            send_timeout: None,
        }
    }
}

/// Transport type, identified on the wire by its `transport` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportType {
    /// Plain request/response, sent with an empty transport name
    #[default]
    Auto,
    /// Server-sent events
    ServerSentEvents,
    /// Long polling
    LongPolling,
}

impl TransportType {
    pub fn name(&self) -> &'static str {
        match self {
            TransportType::Auto => "",
            TransportType::ServerSentEvents => "serverSentEvents",
            TransportType::LongPolling => "longPolling",
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capability set shared by every client transport
///
/// A connection manager drives a transport through these operations without
/// knowing which kind it holds.
#[async_trait]
pub trait ClientTransport: Send + Sync {
    /// Wire identifier sent as the `transport` parameter
    fn name(&self) -> &str;

    /// Whether the connection manager should schedule keep-alive checks
    fn supports_keep_alive(&self) -> bool;

    /// Performs the negotiation handshake
    async fn negotiate(
        &self,
        connection: &dyn Connection,
        connection_data: Option<&str>,
    ) -> Result<NegotiationResponse>;

    /// Starts receiving on the connection
    async fn start(&self, connection: &dyn Connection, connection_data: Option<&str>)
        -> Result<()>;

    /// Sends a payload and returns the decoded server response
    async fn send(
        &self,
        connection: &dyn Connection,
        payload: Payload,
        connection_data: Option<&str>,
    ) -> Result<Value>;

    /// Notifies the server that the connection is going away
    ///
    /// Failures are never reported to the caller. The returned future waits
    /// for the abort request; spawn it during teardown to avoid blocking on it.
    async fn abort(
        &self,
        connection: &dyn Connection,
        timeout: Duration,
        connection_data: Option<&str>,
    );

    /// Reacts to the connection manager detecting a dead connection
    fn lost_connection(&self, connection: &dyn Connection);
}

/// Transport factory for creating transport instances
pub trait TransportFactory {
    /// Create a new transport instance
    fn create(&self, config: TransportConfig) -> Result<Box<dyn ClientTransport>>;
}
