use std::time::Duration;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde_json::json;
use tracker_core::StatusUpdate;
use tracker_logging::tracker_debug;

use crate::envelope::{decode_result, decode_status, decode_upload_ticket};
use crate::{ApiError, FailureKind, ResultLookup, UploadTicket};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub status_url: String,
    pub result_url: String,
    pub upload_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl ApiSettings {
    /// Endpoints laid out under one API base: `/progress`, `/check-processed`
    /// and `/upload`.
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            status_url: format!("{base}/progress"),
            result_url: format!("{base}/check-processed"),
            upload_url: format!("{base}/upload"),
            ..Self::default()
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            status_url: "http://127.0.0.1:8080/progress".to_string(),
            result_url: "http://127.0.0.1:8080/check-processed".to_string(),
            upload_url: "http://127.0.0.1:8080/upload".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Status and result-lookup endpoints consumed by the pollers.
#[async_trait::async_trait]
pub trait ProgressApi: Send + Sync {
    async fn fetch_status(&self, log_source: &str) -> Result<StatusUpdate, ApiError>;

    async fn lookup_result(
        &self,
        job_id: &str,
        submitted_at: &str,
    ) -> Result<ResultLookup, ApiError>;
}

/// Create-upload endpoint plus the presigned PUT destinations it hands out.
#[async_trait::async_trait]
pub trait UploadApi: Send + Sync {
    async fn create_upload(&self, user_id: &str, file_name: &str)
        -> Result<UploadTicket, ApiError>;

    async fn put_object(
        &self,
        url: &str,
        content_type: &str,
        payload: Bytes,
    ) -> Result<(), ApiError>;
}

/// Everything a [`crate::TrackerHandle`] talks to.
pub trait Backend: ProgressApi + UploadApi {}

impl<T: ProgressApi + UploadApi> Backend for T {}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: ApiSettings,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    async fn post_json(&self, url: &str, body: serde_json::Value) -> Result<String, ApiError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let response = self
            .client
            .post(parsed)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.canonical_reason().unwrap_or_default(),
            ));
        }
        let text = response.text().await.map_err(map_reqwest_error)?;
        tracker_debug!("POST {} -> {} bytes", url, text.len());
        Ok(text)
    }
}

#[async_trait::async_trait]
impl ProgressApi for ReqwestBackend {
    async fn fetch_status(&self, log_source: &str) -> Result<StatusUpdate, ApiError> {
        let body = json!({ "log_group_name": log_source });
        let text = self.post_json(&self.settings.status_url, body).await?;
        Ok(decode_status(&text)?)
    }

    async fn lookup_result(
        &self,
        job_id: &str,
        submitted_at: &str,
    ) -> Result<ResultLookup, ApiError> {
        let body = json!({ "uploadTimestamp": submitted_at, "videoId": job_id });
        let text = self.post_json(&self.settings.result_url, body).await?;
        Ok(decode_result(&text)?)
    }
}

#[async_trait::async_trait]
impl UploadApi for ReqwestBackend {
    async fn create_upload(
        &self,
        user_id: &str,
        file_name: &str,
    ) -> Result<UploadTicket, ApiError> {
        let body = json!({ "userId": user_id, "fileName": file_name });
        let text = self.post_json(&self.settings.upload_url, body).await?;
        Ok(decode_upload_ticket(&text)?)
    }

    async fn put_object(
        &self,
        url: &str,
        content_type: &str,
        payload: Bytes,
    ) -> Result<(), ApiError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let response = self
            .client
            .put(parsed)
            .header(CONTENT_TYPE, content_type)
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.canonical_reason().unwrap_or_default(),
            ));
        }
        Ok(())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
