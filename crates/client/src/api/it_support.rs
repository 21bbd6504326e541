use opsdesk_core::{ItTicket, ListQuery, Page, RequestId, SubmissionDraft};
use serde_json::Value;

use crate::api::{draft_form, owned_pairs};
use crate::client::{ApiClient, ApiResponse};
use crate::error::ClientError;
use crate::transport::Transport;

const TICKETS: &str = "/it-support/tickets";

pub struct ItSupportApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> ItSupportApi<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Page<ItTicket>, ClientError> {
        self.client.list(TICKETS, owned_pairs(query)).await
    }

    pub async fn get(&self, id: &RequestId) -> Result<ItTicket, ClientError> {
        Ok(self.client.get(&format!("{TICKETS}/{id}"), Vec::new()).await?.data)
    }

    /// Creates a ticket in one multipart call carrying the form fields and
    /// every queued file.
    pub async fn create(&self, draft: &SubmissionDraft) -> Result<ApiResponse<Value>, ClientError> {
        self.client.post_multipart(TICKETS, draft_form(draft)).await
    }

    pub async fn delete(&self, id: &RequestId) -> Result<Option<String>, ClientError> {
        self.client.delete(&format!("{TICKETS}/{id}")).await
    }
}
