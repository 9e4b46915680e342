use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode, Url};
use serde_json::Value;

use super::abort::{AbortGuard, AbortState};
use crate::{
    connection::Connection,
    protocol::{connection_parameters, NegotiationResponse, Payload, RequestParameters},
    transport::{ClientTransport, TransportConfig, TransportFactory},
    Error, Result,
};

/// Server endpoints addressed relative to the connection URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Negotiate,
    Send,
    Abort,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Negotiate => "negotiate",
            Endpoint::Send => "send",
            Endpoint::Abort => "abort",
        }
    }
}

/// Request/response transport over plain HTTP
///
/// Holds no connection state of its own apart from the one-shot abort guard;
/// everything identifying the session comes from the [`Connection`].
#[derive(Debug)]
pub struct HttpTransport {
    config: TransportConfig,
    abort: AbortGuard,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            abort: AbortGuard::new(),
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn abort_state(&self) -> AbortState {
        self.abort.state()
    }

    /// Set when the abort request failed or timed out
    pub fn abort_completed(&self) -> bool {
        self.abort.is_completed()
    }

    /// Resolves `endpoint` with the connection parameters in its query string
    ///
    /// Makes no network call.
    pub fn endpoint_url(
        &self,
        connection: &dyn Connection,
        endpoint: Endpoint,
        connection_data: Option<&str>,
    ) -> Result<Url> {
        let params = connection_parameters(connection, self.name(), connection_data);
        let url = format!("{}{}", connection.url(), endpoint.path());
        Url::parse_with_params(&url, params.pairs())
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
    }

    async fn request_negotiation(
        &self,
        connection: &dyn Connection,
        connection_data: Option<&str>,
    ) -> Result<NegotiationResponse> {
        let url = self.endpoint_url(connection, Endpoint::Negotiate, connection_data)?;
        tracing::debug!("negotiate: GET {}", url);

        let response = connection
            .get_request(Method::GET, url, Some(self.config.negotiate_timeout))
            .send()
            .await?;
        let body = check_status(response)?.bytes().await?;

        Ok(serde_json::from_slice(&body)?)
    }

    async fn post_payload(
        &self,
        connection: &dyn Connection,
        body: &RequestParameters,
        connection_data: Option<&str>,
    ) -> Result<Value> {
        let url = self.endpoint_url(connection, Endpoint::Send, connection_data)?;
        tracing::debug!("send: POST {} ({} form fields)", url, body.len());

        let response = connection
            .get_request(Method::POST, url, self.config.send_timeout)
            .form(body)
            .send()
            .await?;
        let response = check_status(response)?;
        if matches!(
            response.status(),
            StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT
        ) {
            return Ok(Value::Null);
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn post_abort(
        &self,
        connection: &dyn Connection,
        connection_data: Option<&str>,
    ) -> Result<()> {
        let url = self.endpoint_url(connection, Endpoint::Abort, connection_data)?;
        tracing::debug!("abort: POST {}", url);

        let response = connection
            .get_request(Method::POST, url, Some(self.config.abort_timeout))
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

#[async_trait]
impl ClientTransport for HttpTransport {
    fn name(&self) -> &str {
        self.config.transport_type.name()
    }

    fn supports_keep_alive(&self) -> bool {
        false
    }

    async fn negotiate(
        &self,
        connection: &dyn Connection,
        connection_data: Option<&str>,
    ) -> Result<NegotiationResponse> {
        let result = self.request_negotiation(connection, connection_data).await;
        if let Err(e) = &result {
            tracing::warn!("negotiate with {} failed: {}", connection.url(), e);
        }
        result
    }

    async fn start(
        &self,
        _connection: &dyn Connection,
        _connection_data: Option<&str>,
    ) -> Result<()> {
        Ok(())
    }

    async fn send(
        &self,
        connection: &dyn Connection,
        payload: Payload,
        connection_data: Option<&str>,
    ) -> Result<Value> {
        let body = payload.into_body();
        match self.post_payload(connection, &body, connection_data).await {
            Ok(value) => {
                connection.did_receive_data(value.clone());
                Ok(value)
            }
            Err(e) => {
                tracing::warn!("send to {} failed: {}", connection.url(), e);
                connection.did_receive_error(&e);
                Err(e)
            }
        }
    }

    async fn abort(
        &self,
        connection: &dyn Connection,
        timeout: Duration,
        connection_data: Option<&str>,
    ) {
        if timeout.is_zero() || !self.abort.try_start() {
            tracing::debug!("abort skipped for {}", connection.url());
            return;
        }

        if let Err(e) = self.post_abort(connection, connection_data).await {
            tracing::debug!("abort for {} did not complete: {}", connection.url(), e);
            self.abort.complete();
        }
    }

    fn lost_connection(&self, _connection: &dyn Connection) {}
}

/// Creates [`HttpTransport`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransportFactory;

impl TransportFactory for HttpTransportFactory {
    fn create(&self, config: TransportConfig) -> Result<Box<dyn ClientTransport>> {
        Ok(Box::new(HttpTransport::new(config)))
    }
}

/// Rejects any response outside the 2xx range
fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Error::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}
