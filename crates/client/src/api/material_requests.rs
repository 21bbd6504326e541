use opsdesk_core::{ListQuery, MaterialRequest, Page, SubmissionDraft};
use serde_json::Value;

use crate::api::{create_from_draft, owned_pairs};
use crate::client::{ApiClient, ApiResponse};
use crate::error::ClientError;
use crate::transport::Transport;

pub struct MaterialRequestsApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> MaterialRequestsApi<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Page<MaterialRequest>, ClientError> {
        self.client.list("/material-requests", owned_pairs(query)).await
    }

    pub async fn create(&self, draft: &SubmissionDraft) -> Result<ApiResponse<Value>, ClientError> {
        create_from_draft(self.client, "/material-requests", draft).await
    }
}
