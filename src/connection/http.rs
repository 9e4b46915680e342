use std::sync::{Mutex, PoisonError, RwLock};

use reqwest::{header, Client, Url};
use serde_json::Value;
use tokio::sync::mpsc;

use super::{Connection, ConnectionConfig, ConnectionEvent};
use crate::{
    protocol::{ProtocolVersion, RequestParameters},
    Error, Result,
};

/// Connection backed by a shared `reqwest` client
///
/// Inbound data and errors reported by transports are queued as
/// [`ConnectionEvent`]s until the owner drains them through [`take_events`].
/// The queue holds at most `event_capacity` events; later ones are dropped.
///
/// [`take_events`]: HttpConnection::take_events
pub struct HttpConnection {
    url: String,
    version: ProtocolVersion,
    query_string: Option<RequestParameters>,
    client: Client,
    connection_token: RwLock<Option<String>>,
    events_tx: mpsc::Sender<ConnectionEvent>,
    events_rx: Mutex<Option<mpsc::Receiver<ConnectionEvent>>>,
}

impl HttpConnection {
    /// Create a new HTTP connection
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        let url = normalize_url(&config.base_url)?;

        let mut headers = header::HeaderMap::new();
        for (name, value) in &config.headers {
            headers.insert(
                header::HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| Error::Transport(e.to_string()))?,
                header::HeaderValue::from_str(value)
                    .map_err(|e| Error::Transport(e.to_string()))?,
            );
        }
        if let Some(token) = &config.auth_token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| Error::Transport(e.to_string()))?,
            );
        }

        let client = Client::builder().default_headers(headers).build()?;
        let (events_tx, events_rx) = mpsc::channel(config.event_capacity.max(1));

        Ok(Self {
            url,
            version: config.version,
            query_string: config.query_string,
            client,
            connection_token: RwLock::new(None),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
        })
    }

    /// Records the token returned by negotiation, or clears it
    pub fn set_connection_token(&self, token: Option<String>) {
        *self
            .connection_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Takes the inbound event receiver; returns `None` once taken
    pub fn take_events(&self) -> Option<mpsc::Receiver<ConnectionEvent>> {
        self.events_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn publish(&self, event: ConnectionEvent) {
        match self.events_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::warn!("connection {}: event queue full, dropping {:?}", self.url, event);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("connection {}: event receiver dropped", self.url);
            }
        }
    }
}

impl Connection for HttpConnection {
    fn url(&self) -> &str {
        &self.url
    }

    fn version(&self) -> ProtocolVersion {
        self.version
    }

    fn connection_token(&self) -> Option<String> {
        self.connection_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn query_string(&self) -> Option<RequestParameters> {
        self.query_string.clone()
    }

    fn client(&self) -> &Client {
        &self.client
    }

    fn did_receive_data(&self, data: Value) {
        self.publish(ConnectionEvent::Data(data));
    }

    fn did_receive_error(&self, error: &Error) {
        self.publish(ConnectionEvent::Error {
            kind: error.kind(),
            message: error.to_string(),
        });
    }
}

/// Validates the base URL and makes sure it ends with `/`
fn normalize_url(base_url: &str) -> Result<String> {
    let url = Url::parse(base_url).map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidUrl(format!("{}: not a base URL", base_url)));
    }
    // endpoint paths are appended to the URL, so it must end at its path
    if url.query().is_some() || url.fragment().is_some() {
        return Err(Error::InvalidUrl(format!(
            "{}: query and fragment belong in query_string",
            base_url
        )));
    }

    let mut url = url.to_string();
    if !url.ends_with('/') {
        url.push('/');
    }
    Ok(url)
}
