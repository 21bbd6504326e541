use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use opsdesk_core::{ListQuery, Page};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::owned_pairs;
use crate::client::{ApiClient, ApiResponse};
use crate::error::ClientError;
use crate::transport::Transport;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Communication {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(alias = "body", alias = "message", default)]
    pub content: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub details: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommunication {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<String>,
}

pub struct CommunicationsApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> CommunicationsApi<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Page<Communication>, ClientError> {
        self.client.list("/communications", owned_pairs(query)).await
    }

    pub async fn create(
        &self,
        communication: &NewCommunication,
    ) -> Result<ApiResponse<Communication>, ClientError> {
        let body = serde_json::to_value(communication)
            .map_err(|error| ClientError::Decode(error.to_string()))?;
        self.client.post_json("/communications", body).await
    }
}
