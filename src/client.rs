//! HTTP implementation of [`DocChatApi`].
//!
//! Wraps a `reqwest::Client` pointed at the API base URL (for example
//! `http://localhost:8000/api`). Each call makes exactly one request; there
//! are no retries. Non-2xx responses become [`ApiError::Rejected`] with the
//! same user-facing message for every failure of that operation, except
//! uploads, which prefer the server's `detail` field.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use doc_chat_core::api::{
    ApiError, ApiResult, DocChatApi, CLEAR_FAILED, DELETE_FAILED, FETCH_FAILED, SEND_FAILED,
    UPLOAD_FAILED,
};
use doc_chat_core::library::content_type_for;
use doc_chat_core::models::{ChatReply, Document, UploadFile};
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiConfig;

pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.base_url, config.timeout_secs.map(Duration::from_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport(err: reqwest::Error) -> ApiError {
    ApiError::Transport(err.to_string())
}

async fn decode<T: DeserializeOwned>(resp: Response) -> ApiResult<T> {
    resp.json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Turn a non-2xx response into an error carrying `fallback`.
fn check(resp: Response, fallback: &str) -> ApiResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    debug!(status = status.as_u16(), url = %resp.url(), "request rejected");
    Err(ApiError::rejected(status.as_u16(), fallback))
}

/// `detail` string of a FastAPI-style error body, if any.
async fn error_detail(resp: Response) -> Option<String> {
    let body: serde_json::Value = resp.json().await.ok()?;
    body.get("detail")?.as_str().map(str::to_string)
}

#[async_trait]
impl DocChatApi for HttpApi {
    async fn list_documents(&self) -> ApiResult<Vec<Document>> {
        let resp = self
            .client
            .get(self.url("/documents/"))
            .send()
            .await
            .map_err(transport)?;
        decode(check(resp, FETCH_FAILED)?).await
    }

    async fn upload_document(&self, file: UploadFile) -> ApiResult<Document> {
        let mime = file
            .extension()
            .and_then(|ext| content_type_for(&ext))
            .unwrap_or("application/octet-stream");
        let part = Part::bytes(file.bytes)
            .file_name(file.filename)
            .mime_str(mime)
            .map_err(transport)?;
        let form = Form::new().part("file", part);

        let resp = self
            .client
            .post(self.url("/documents/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            let message = error_detail(resp)
                .await
                .unwrap_or_else(|| UPLOAD_FAILED.to_string());
            debug!(status = status.as_u16(), %message, "upload rejected");
            return Err(ApiError::rejected(status.as_u16(), message));
        }
        decode(resp).await
    }

    async fn delete_document(&self, id: i64) -> ApiResult<()> {
        let resp = self
            .client
            .delete(self.url(&format!("/documents/{}", id)))
            .send()
            .await
            .map_err(transport)?;
        check(resp, DELETE_FAILED)?;
        Ok(())
    }

    async fn clear_all_documents(&self) -> ApiResult<()> {
        let resp = self
            .client
            .delete(self.url("/documents/clear-all"))
            .send()
            .await
            .map_err(transport)?;
        check(resp, CLEAR_FAILED)?;
        Ok(())
    }

    async fn send_chat(&self, message: &str) -> ApiResult<ChatReply> {
        let resp = self
            .client
            .post(self.url("/chat/"))
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await
            .map_err(transport)?;
        decode(check(resp, SEND_FAILED)?).await
    }
}
