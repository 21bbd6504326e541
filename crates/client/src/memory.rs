use std::collections::VecDeque;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::ClientError;
use crate::transport::{ApiRequest, Body, Method, RawResponse, Transport};

/// What the scripted transport saw, minus the token itself.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Body,
    pub authorized: bool,
}

/// In-memory transport that replays queued responses in order and records
/// every request. An exhausted script answers with a network error.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse, ClientError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, response: Result<RawResponse, ClientError>) {
        self.responses.lock().await.push_back(response);
    }

    pub async fn push_json(&self, status: u16, body: Value) {
        self.push(Ok(RawResponse { status, body: body.to_string() })).await;
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ClientError> {
        self.requests.lock().await.push(RecordedRequest {
            method: request.method,
            path: request.path,
            query: request.query,
            body: request.body,
            authorized: request.bearer.is_some(),
        });

        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Network("no scripted response left".to_string())))
    }
}
