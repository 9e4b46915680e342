//! In-process HTTP server recording every request it receives.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};

use crate::{
    connection::{ConnectionConfig, HttpConnection},
    protocol::RequestParameters,
};

/// A request as seen by the server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: String,
}

#[derive(Debug, Clone)]
struct Reply {
    status: StatusCode,
    body: String,
    delay: Duration,
}

#[derive(Default)]
struct ServerState {
    requests: Mutex<Vec<RecordedRequest>>,
    replies: Mutex<HashMap<String, Reply>>,
}

pub struct TestServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
}

impl TestServer {
    pub const CONNECTION_TOKEN: &'static str = "AQAAANCMnd8BFdERjHoAwE";

    pub async fn start() -> Self {
        let state = Arc::new(ServerState::default());
        let app = Router::new()
            .fallback(record)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/signalr", self.addr)
    }

    /// Connection pointed at this server with the given custom query string
    pub fn connection(&self, query: &[(&str, &str)]) -> HttpConnection {
        let query_string: RequestParameters = query.iter().copied().collect();
        HttpConnection::new(ConnectionConfig {
            base_url: self.base_url(),
            query_string: (!query_string.is_empty()).then_some(query_string),
            ..Default::default()
        })
        .unwrap()
    }

    /// Overrides the reply for the endpoint named by the last path segment
    pub fn reply(&self, endpoint: &str, status: StatusCode, body: &str) {
        let mut replies = self.state.replies.lock().unwrap();
        let reply = replies
            .entry(endpoint.to_string())
            .or_insert_with(|| default_reply(endpoint));
        reply.status = status;
        reply.body = body.to_string();
    }

    /// Holds replies for `endpoint` back by `delay`
    pub fn delay(&self, endpoint: &str, delay: Duration) {
        let mut replies = self.state.replies.lock().unwrap();
        replies
            .entry(endpoint.to_string())
            .or_insert_with(|| default_reply(endpoint))
            .delay = delay;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

fn default_reply(endpoint: &str) -> Reply {
    let body = match endpoint {
        "negotiate" => serde_json::json!({
            "Url": "/signalr",
            "ConnectionToken": TestServer::CONNECTION_TOKEN,
            "ConnectionId": "0c8e33a4-3b1b-4a4f-9b6c-6c1e1f6d4c7a",
            "KeepAliveTimeout": 20.0,
            "DisconnectTimeout": 30.0,
            "ConnectionTimeout": 110.0,
            "TryWebSockets": false,
            "ProtocolVersion": "1.5",
            "TransportConnectTimeout": 5.0,
            "LongPollDelay": 0.0
        })
        .to_string(),
        "send" => r#"{"I":"0"}"#.to_string(),
        _ => String::new(),
    };

    Reply {
        status: StatusCode::OK,
        body,
        delay: Duration::ZERO,
    }
}

async fn record(
    State(state): State<Arc<ServerState>>,
    method: Method,
    uri: Uri,
    body: String,
) -> Response {
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        body,
    });

    let endpoint = uri.path().rsplit('/').next().unwrap_or_default();
    let reply = state
        .replies
        .lock()
        .unwrap()
        .get(endpoint)
        .cloned()
        .unwrap_or_else(|| default_reply(endpoint));

    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }
    (reply.status, reply.body).into_response()
}
