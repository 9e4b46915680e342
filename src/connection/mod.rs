use std::{collections::HashMap, time::Duration};

use reqwest::{Client, Method, RequestBuilder, Url};
use serde_json::Value;

use crate::{
    error::ErrorKind,
    protocol::{ProtocolVersion, RequestParameters},
    Error,
};

pub mod http;

pub use self::http::HttpConnection;

/// Default number of inbound events held until the owner drains them
pub const DEFAULT_EVENT_CAPACITY: usize = 32;

/// Connection configuration
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Base URL of the persistent-connection endpoint, e.g. `https://host/signalr`
    pub base_url: String,
    /// Protocol version announced as `clientProtocol`
    pub version: ProtocolVersion,
    /// Custom parameters appended to every request's query string
    pub query_string: Option<RequestParameters>,
    /// Extra headers sent with every request
    pub headers: HashMap<String, String>,
    /// Optional bearer token
    pub auth_token: Option<String>,
    /// Inbound events queued before new ones are dropped
    pub event_capacity: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            version: ProtocolVersion::default(),
            query_string: None,
            headers: HashMap::new(),
            auth_token: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Inbound notification raised by a transport on its connection
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// Decoded data received from the server
    Data(Value),
    /// A request on this connection failed
    Error { kind: ErrorKind, message: String },
}

/// The connection a transport issues requests on behalf of
///
/// Supplies the connection identity used to build request parameters, executes
/// requests through its HTTP client and receives inbound data and errors.
pub trait Connection: Send + Sync {
    /// Base URL, always ending with `/`
    fn url(&self) -> &str;

    fn version(&self) -> ProtocolVersion;

    /// Token assigned by the server, `None` before negotiation
    fn connection_token(&self) -> Option<String>;

    /// Custom query parameters laid over the protocol parameters
    fn query_string(&self) -> Option<RequestParameters>;

    /// HTTP client used to execute requests
    fn client(&self) -> &Client;

    /// Builds a request against `url`, overriding the client timeout when given
    fn get_request(&self, method: Method, url: Url, timeout: Option<Duration>) -> RequestBuilder {
        let request = self.client().request(method, url);
        match timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    /// Called with every payload received from the server
    fn did_receive_data(&self, data: Value);

    /// Called when a request on this connection fails
    fn did_receive_error(&self, error: &Error);
}
