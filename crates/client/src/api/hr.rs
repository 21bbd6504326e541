use std::collections::BTreeMap;

use opsdesk_core::{ListQuery, Page, SubmissionDraft};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{create_from_draft, owned_pairs};
use crate::client::{ApiClient, ApiResponse};
use crate::error::ClientError;
use crate::transport::Transport;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "first_name", default)]
    pub first_name: String,
    #[serde(alias = "last_name", default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(flatten)]
    pub details: BTreeMap<String, Value>,
}

pub struct HrApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> HrApi<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn employees(&self, query: &ListQuery) -> Result<Page<Employee>, ClientError> {
        self.client.list("/hr/employees", owned_pairs(query)).await
    }

    pub async fn create_employee(
        &self,
        draft: &SubmissionDraft,
    ) -> Result<ApiResponse<Value>, ClientError> {
        create_from_draft(self.client, "/hr/employees", draft).await
    }
}
