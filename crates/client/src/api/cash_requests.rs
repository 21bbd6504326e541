use opsdesk_core::{CashRequest, ListQuery, Page, RequestId};
use serde_json::{json, Value};

use crate::api::owned_pairs;
use crate::client::{ApiClient, ApiResponse};
use crate::error::ClientError;
use crate::transport::Transport;

const CASH_REQUESTS: &str = "/cash-requests";

pub struct CashRequestsApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> CashRequestsApi<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn my_requests(&self, query: &ListQuery) -> Result<Page<CashRequest>, ClientError> {
        self.client.list(&format!("{CASH_REQUESTS}/my-requests"), owned_pairs(query)).await
    }

    pub async fn get(&self, id: &RequestId) -> Result<CashRequest, ClientError> {
        Ok(self.client.get(&format!("{CASH_REQUESTS}/{id}"), Vec::new()).await?.data)
    }

    /// Resubmits a rejected request with revised fields.
    pub async fn update(
        &self,
        id: &RequestId,
        changes: Value,
    ) -> Result<ApiResponse<CashRequest>, ClientError> {
        self.client.put_json(&format!("{CASH_REQUESTS}/{id}"), changes).await
    }

    pub async fn delete(&self, id: &RequestId) -> Result<Option<String>, ClientError> {
        self.client.delete(&format!("{CASH_REQUESTS}/{id}")).await
    }

    pub async fn approve(
        &self,
        id: &RequestId,
        comments: Option<&str>,
    ) -> Result<ApiResponse<CashRequest>, ClientError> {
        self.client
            .post_json(&format!("{CASH_REQUESTS}/{id}/approve"), json!({ "comments": comments }))
            .await
    }

    pub async fn reject(
        &self,
        id: &RequestId,
        reason: &str,
    ) -> Result<ApiResponse<CashRequest>, ClientError> {
        self.client
            .post_json(&format!("{CASH_REQUESTS}/{id}/reject"), json!({ "comments": reason }))
            .await
    }
}
