use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ProtocolVersion;
use crate::Result;

/// Session parameters asserted by the server in reply to `negotiate`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NegotiationResponse {
    /// Relative URL of the connection endpoint
    #[serde(default)]
    pub url: String,
    /// Token that must accompany every later request on this connection
    pub connection_token: String,
    /// Server-side connection identifier
    pub connection_id: String,
    /// Protocol version the server agreed to
    pub protocol_version: String,
    /// Keep-alive timeout in seconds, absent when keep-alive is disabled
    #[serde(default)]
    pub keep_alive_timeout: Option<f64>,
    /// Seconds after which the server drops a silent connection
    pub disconnect_timeout: f64,
    /// Long-poll connection timeout in seconds
    #[serde(default)]
    pub connection_timeout: Option<f64>,
    /// Whether the server accepts a websocket transport
    #[serde(default)]
    pub try_web_sockets: bool,
    /// Seconds to wait for a transport to connect
    #[serde(default)]
    pub transport_connect_timeout: Option<f64>,
    /// Seconds to wait between long-poll requests
    #[serde(default)]
    pub long_poll_delay: Option<f64>,
}

impl NegotiationResponse {
    pub fn keep_alive_timeout(&self) -> Option<Duration> {
        self.keep_alive_timeout.and_then(seconds)
    }

    pub fn disconnect_timeout(&self) -> Duration {
        seconds(self.disconnect_timeout).unwrap_or_default()
    }

    pub fn transport_connect_timeout(&self) -> Option<Duration> {
        self.transport_connect_timeout.and_then(seconds)
    }

    /// Parses the negotiated protocol version
    pub fn protocol_version(&self) -> Result<ProtocolVersion> {
        self.protocol_version.parse()
    }
}

fn seconds(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEGOTIATE_BODY: &str = r#"{
        "Url": "/signalr",
        "ConnectionToken": "AQAAANCMnd8BFdERjHoAwE",
        "ConnectionId": "0c8e33a4-3b1b-4a4f-9b6c-6c1e1f6d4c7a",
        "KeepAliveTimeout": 20.0,
        "DisconnectTimeout": 30.0,
        "ConnectionTimeout": 110.0,
        "TryWebSockets": true,
        "ProtocolVersion": "1.5",
        "TransportConnectTimeout": 5.0,
        "LongPollDelay": 0.0
    }"#;

    #[test]
    fn test_deserialize_full_response() {
        let response: NegotiationResponse = serde_json::from_str(NEGOTIATE_BODY).unwrap();
        assert_eq!(response.connection_token, "AQAAANCMnd8BFdERjHoAwE");
        assert_eq!(response.keep_alive_timeout(), Some(Duration::from_secs(20)));
        assert_eq!(response.disconnect_timeout(), Duration::from_secs(30));
        assert_eq!(
            response.transport_connect_timeout(),
            Some(Duration::from_secs(5))
        );
        assert!(response.try_web_sockets);
        assert_eq!(
            response.protocol_version().unwrap(),
            ProtocolVersion::new(1, 5)
        );
    }

    #[test]
    fn test_keep_alive_may_be_absent() {
        let body = r#"{
            "ConnectionToken": "t",
            "ConnectionId": "c",
            "ProtocolVersion": "1.5",
            "KeepAliveTimeout": null,
            "DisconnectTimeout": 30.0
        }"#;
        let response: NegotiationResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.keep_alive_timeout(), None);
        assert!(!response.try_web_sockets);
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let body = r#"{"ConnectionId": "c", "ProtocolVersion": "1.5", "DisconnectTimeout": 30.0}"#;
        assert!(serde_json::from_str::<NegotiationResponse>(body).is_err());
    }
}
