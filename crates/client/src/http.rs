use std::time::Duration;

use async_trait::async_trait;
use opsdesk_core::config::ApiConfig;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use secrecy::ExposeSecret;
use tracing::warn;

use crate::error::ClientError;
use crate::transport::{ApiRequest, Body, Method, MultipartBody, RawResponse, Transport};

/// reqwest-backed transport against the REST base URL.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ClientError::Network(format!("could not build http client: {error}")))?;
        Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_string() })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        Self::new(config.base_url.clone(), Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ClientError> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token.expose_secret());
        }

        builder = match request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Multipart(body) => builder.multipart(multipart_form(body).await?),
        };

        let response = builder.send().await.map_err(|error| {
            warn!(method = %request.method, url = %url, error = %error, "api transport failure");
            ClientError::Network(error.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|error| ClientError::Network(error.to_string()))?;
        Ok(RawResponse { status, body })
    }
}

async fn multipart_form(body: MultipartBody) -> Result<Form, ClientError> {
    let mut form = Form::new();
    for (name, value) in body.fields {
        form = form.text(name, value);
    }

    for file in body.files {
        let bytes = tokio::fs::read(&file.path).await.map_err(|error| ClientError::Attachment {
            path: file.path.clone(),
            message: error.to_string(),
        })?;
        let part = Part::bytes(bytes).file_name(file.file_name).mime_str(&file.content_type).map_err(
            |error| ClientError::Attachment { path: file.path.clone(), message: error.to_string() },
        )?;
        form = form.part(file.field, part);
    }

    Ok(form)
}
