use opsdesk_core::{Page, Pagination};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::api::{
    CashRequestsApi, CommunicationsApi, HrApi, ItSupportApi, MaterialRequestsApi, UsersApi,
};
use crate::envelope::Envelope;
use crate::error::ClientError;
use crate::transport::{ApiRequest, Body, Method, MultipartBody, Transport};

/// Decoded `data` plus the envelope's message and pagination.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
    pub message: Option<String>,
    pub pagination: Option<Pagination>,
}

/// Request wrapper shared by every API module. Attaches the bearer token and
/// normalises the response envelope. It never retries.
#[derive(Debug)]
pub struct ApiClient<T> {
    transport: T,
    token: Option<SecretString>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, token: Option<SecretString>) -> Self {
        Self { transport, token }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn communications(&self) -> CommunicationsApi<'_, T> {
        CommunicationsApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_, T> {
        UsersApi::new(self)
    }

    pub fn it_support(&self) -> ItSupportApi<'_, T> {
        ItSupportApi::new(self)
    }

    pub fn cash_requests(&self) -> CashRequestsApi<'_, T> {
        CashRequestsApi::new(self)
    }

    pub fn material_requests(&self) -> MaterialRequestsApi<'_, T> {
        MaterialRequestsApi::new(self)
    }

    pub fn hr(&self) -> HrApi<'_, T> {
        HrApi::new(self)
    }

    pub async fn execute(&self, mut request: ApiRequest) -> Result<Envelope, ClientError> {
        request.bearer = self.token.clone();
        let method = request.method;
        let path = request.path.clone();

        info!(event_name = "api.request", method = %method, path = %path, "api request");
        let result = self.transport.send(request).await.and_then(Envelope::from_response);
        match &result {
            Ok(_) => info!(event_name = "api.response", method = %method, path = %path, "api request succeeded"),
            Err(error) => warn!(
                event_name = "api.failure",
                method = %method,
                path = %path,
                status = ?error.status(),
                error = %error,
                "api request failed"
            ),
        }
        result
    }

    pub async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<ApiResponse<R>, ClientError> {
        let envelope = self.execute(ApiRequest::new(Method::Get, path).with_query(query)).await?;
        decode(envelope)
    }

    pub async fn list<R: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<Page<R>, ClientError> {
        let envelope = self.execute(ApiRequest::new(Method::Get, path).with_query(query)).await?;
        let pagination = envelope.pagination;
        Ok(Page { rows: envelope.decode_rows()?, pagination })
    }

    pub async fn post_json<R: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<ApiResponse<R>, ClientError> {
        let request = ApiRequest::new(Method::Post, path).with_body(Body::Json(body));
        decode(self.execute(request).await?)
    }

    pub async fn put_json<R: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<ApiResponse<R>, ClientError> {
        let request = ApiRequest::new(Method::Put, path).with_body(Body::Json(body));
        decode(self.execute(request).await?)
    }

    pub async fn post_multipart<R: DeserializeOwned>(
        &self,
        path: &str,
        body: MultipartBody,
    ) -> Result<ApiResponse<R>, ClientError> {
        let request = ApiRequest::new(Method::Post, path).with_body(Body::Multipart(body));
        decode(self.execute(request).await?)
    }

    /// Delete routes answer with a message and no useful data.
    pub async fn delete(&self, path: &str) -> Result<Option<String>, ClientError> {
        let envelope = self.execute(ApiRequest::new(Method::Delete, path)).await?;
        Ok(envelope.message)
    }
}

fn decode<R: DeserializeOwned>(envelope: Envelope) -> Result<ApiResponse<R>, ClientError> {
    let message = envelope.message.clone();
    let pagination = envelope.pagination;
    Ok(ApiResponse { data: envelope.decode()?, message, pagination })
}
