//! Thin method sets mapping onto the backend's REST routes.

mod cash_requests;
mod communications;
mod hr;
mod it_support;
mod material_requests;
mod users;

pub use cash_requests::CashRequestsApi;
pub use communications::{Communication, CommunicationsApi, NewCommunication};
pub use hr::{Employee, HrApi};
pub use it_support::ItSupportApi;
pub use material_requests::MaterialRequestsApi;
pub use users::UsersApi;

use opsdesk_core::{ListQuery, SubmissionDraft};
use serde_json::Value;

use crate::client::{ApiClient, ApiResponse};
use crate::error::ClientError;
use crate::transport::{FilePart, MultipartBody, Transport};

pub(crate) fn owned_pairs(query: &ListQuery) -> Vec<(String, String)> {
    query.to_query_pairs().into_iter().map(|(key, value)| (key.to_string(), value)).collect()
}

/// Splits a draft into multipart text fields and file parts. Nested values
/// are sent as JSON text; the attachment metadata is implied by the files.
pub fn draft_form(draft: &SubmissionDraft) -> MultipartBody {
    let fields = match &draft.payload {
        Value::Object(object) => object
            .iter()
            .filter(|(key, _)| key.as_str() != "attachments")
            .map(|(key, value)| {
                let text = match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                (key.clone(), text)
            })
            .collect(),
        _ => Vec::new(),
    };

    let files = draft
        .attachments
        .iter()
        .map(|attachment| FilePart {
            field: "attachments".to_string(),
            file_name: attachment.name.clone(),
            content_type: attachment.content_type.clone(),
            path: attachment.path.clone(),
        })
        .collect();

    MultipartBody { fields, files }
}

/// JSON create call, upgraded to multipart when the draft carries files so
/// that queued uploads always reach the server.
pub(crate) async fn create_from_draft<T: Transport>(
    client: &ApiClient<T>,
    path: &str,
    draft: &SubmissionDraft,
) -> Result<ApiResponse<Value>, ClientError> {
    if draft.attachments.is_empty() {
        client.post_json(path, draft.payload.clone()).await
    } else {
        client.post_multipart(path, draft_form(draft)).await
    }
}
