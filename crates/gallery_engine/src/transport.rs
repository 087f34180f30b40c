use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use gallery_core::{ChunkUnit, Method, OperationDescriptor, ACCEPT_JSON, UPLOAD_PATH};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::{FailureKind, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// `None` leaves request duration to the transport's own limits.
    pub request_timeout: Option<Duration>,
    pub redirect_limit: usize,
    pub max_response_bytes: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            redirect_limit: 5,
            max_response_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Multipart payload for one chunk of the upload endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkUpload {
    /// JSON text of the `info` field.
    pub info: String,
    pub file_name: String,
    pub bytes: Bytes,
}

impl ChunkUpload {
    pub fn from_unit(unit: &ChunkUnit, bytes: Bytes) -> serde_json::Result<Self> {
        let file_name = unit
            .entry()
            .map(|entry| entry.name.clone())
            .unwrap_or_else(|| "blob".to_string());
        Ok(Self {
            info: unit.info_json()?,
            file_name,
            bytes,
        })
    }
}

/// Sends requests to the gallery backend and returns the decoded JSON body.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, descriptor: &OperationDescriptor) -> Result<Value, TransportError>;

    async fn upload_chunk(&self, chunk: ChunkUpload) -> Result<Value, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    settings: TransportSettings,
    base_url: reqwest::Url,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, TransportError> {
        let base_url = reqwest::Url::parse(&settings.base_url)
            .map_err(|err| TransportError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let mut builder = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit));
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| TransportError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base_url,
            client,
        })
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|err| TransportError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn read_json(&self, response: reqwest::Response) -> Result<Value, TransportError> {
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_response_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(TransportError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(TransportError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&bytes)
            .map_err(|err| TransportError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn request(&self, descriptor: &OperationDescriptor) -> Result<Value, TransportError> {
        let url = self.endpoint(descriptor.path)?;
        let method = match descriptor.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, url);
        for (name, value) in &descriptor.headers {
            builder = builder.header(*name, *value);
        }
        if let Some(body) = &descriptor.body {
            let encoded = serde_json::to_vec(body)
                .map_err(|err| TransportError::new(FailureKind::Decode, err.to_string()))?;
            builder = builder.body(encoded);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        self.read_json(response).await
    }

    async fn upload_chunk(&self, chunk: ChunkUpload) -> Result<Value, TransportError> {
        let url = self.endpoint(UPLOAD_PATH)?;
        let part = Part::bytes(chunk.bytes.to_vec())
            .file_name(chunk.file_name)
            .mime_str("application/octet-stream")
            .map_err(map_reqwest_error)?;
        let form = Form::new().text("info", chunk.info).part("file", part);

        let response = self
            .client
            .post(url)
            .header(ACCEPT_JSON.0, ACCEPT_JSON.1)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        self.read_json(response).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return TransportError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    TransportError::new(FailureKind::Network, err.to_string())
}
