use mobgate_core::{
    MasvsRequest, MobgateError, MobgateResult, ReportRequest, ScanRequest, UploadMetadata,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Response, StatusCode};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

const READY_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);
const SCAN_TIMEOUT: Duration = Duration::from_secs(120);
const REPORT_POLL_TIMEOUT: Duration = Duration::from_secs(30);
const MASVS_TIMEOUT: Duration = Duration::from_secs(60);

/// Statuses on which the scan call is retried with a form body.
const SCAN_FALLBACK_STATUSES: &[StatusCode] = &[StatusCode::UNSUPPORTED_MEDIA_TYPE];
/// Statuses on which the MASVS call is retried with a form body.
const MASVS_FALLBACK_STATUSES: &[StatusCode] =
    &[StatusCode::BAD_REQUEST, StatusCode::UNSUPPORTED_MEDIA_TYPE];

/// Client for the subset of the MobSF REST API a compliance run needs.
///
/// One instance carries the `Authorization` header for every call of a run.
pub struct MobsfClient {
    http: reqwest::Client,
    base_url: String,
}

impl MobsfClient {
    /// Creates a client for the service at `base_url` authenticating with `api_key`.
    pub fn new(base_url: impl Into<String>, api_key: &str) -> MobgateResult<Self> {
        let mut auth = HeaderValue::from_str(api_key).map_err(|e| {
            MobgateError::Config(format!("API key is not a valid header value: {e}"))
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(network)?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// The service base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Probes the service root every `interval` until it answers with a success status.
    ///
    /// Transport failures and error statuses count as "not ready yet".
    pub async fn wait_until_ready(&self, timeout: Duration, interval: Duration) -> MobgateResult<()> {
        let start = Instant::now();
        let mut attempt: u32 = 0;

        while start.elapsed() < timeout {
            attempt += 1;
            match self
                .http
                .get(&self.base_url)
                .timeout(READY_REQUEST_TIMEOUT)
                .send()
                .await
            {
                Ok(resp) if resp.status().is_success() => {
                    debug!(attempt, "MobSF answered readiness probe");
                    return Ok(());
                }
                Ok(resp) => debug!(attempt, status = %resp.status(), "MobSF not ready"),
                Err(e) => debug!(attempt, error = %e, "MobSF not reachable"),
            }
            tokio::time::sleep(interval).await;
        }

        Err(MobgateError::NotReady {
            base_url: self.base_url.clone(),
            waited_secs: timeout.as_secs(),
        })
    }

    /// Streams the binary at `app_path` to `/api/v1/upload`.
    pub async fn upload(&self, app_path: &Path) -> MobgateResult<UploadMetadata> {
        let file_name = app_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "app".to_string());

        let file = tokio::fs::File::open(app_path).await?;
        let len = file.metadata().await?.len();
        let part = Part::stream_with_length(Body::from(file), len).file_name(file_name.clone());
        let form = Form::new().part("file", part);

        info!(file = %file_name, bytes = len, "Uploading binary");
        let resp = self
            .http
            .post(self.endpoint("/api/v1/upload"))
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await
            .map_err(network)?;

        let body = success_body(resp, "Upload").await?;
        let json: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            MobgateError::MalformedResponse(format!("Upload response is not valid JSON: {e}"))
        })?;
        UploadMetadata::from_response(&json)
    }

    /// Starts analysis of an uploaded binary.
    pub async fn trigger_scan(&self, meta: &UploadMetadata) -> MobgateResult<()> {
        let resp = self
            .post_with_fallback(
                "/api/v1/scan",
                &ScanRequest::from(meta),
                SCAN_FALLBACK_STATUSES,
                SCAN_TIMEOUT,
            )
            .await?;
        success_body(resp, "Scan").await?;
        Ok(())
    }

    /// Polls `/api/v1/report_json` every `delay` until it answers with a success status.
    ///
    /// Transport failures while polling are swallowed. Fails with
    /// [`MobgateError::PollTimeout`] once `timeout` has elapsed. A timeout
    /// too large to represent as a deadline never expires.
    pub async fn wait_for_scan(
        &self,
        meta: &UploadMetadata,
        delay: Duration,
        timeout: Duration,
    ) -> MobgateResult<()> {
        let deadline = Instant::now().checked_add(timeout);
        let url = self.endpoint("/api/v1/report_json");
        let payload = ReportRequest { hash: &meta.hash };

        while deadline.map_or(true, |d| Instant::now() < d) {
            match self
                .http
                .post(&url)
                .json(&payload)
                .timeout(REPORT_POLL_TIMEOUT)
                .send()
                .await
            {
                Ok(resp) if resp.status().is_success() => {
                    debug!(hash = %meta.hash, "Analysis report available");
                    return Ok(());
                }
                Ok(resp) => debug!(status = %resp.status(), "Analysis still running"),
                Err(e) => debug!(error = %e, "Report poll failed"),
            }
            tokio::time::sleep(delay).await;
        }

        Err(MobgateError::PollTimeout)
    }

    /// Requests the MASVS compliance payload at `level`, returning the body verbatim.
    pub async fn fetch_masvs(&self, meta: &UploadMetadata, level: &str) -> MobgateResult<String> {
        let resp = self
            .post_with_fallback(
                "/api/v1/masvs",
                &MasvsRequest::new(meta, level),
                MASVS_FALLBACK_STATUSES,
                MASVS_TIMEOUT,
            )
            .await?;
        success_body(resp, "MASVS report").await
    }

    /// Posts `payload` as JSON; on one of `fallback_on`, posts it once more as a form.
    async fn post_with_fallback<T>(
        &self,
        path: &str,
        payload: &T,
        fallback_on: &[StatusCode],
        timeout: Duration,
    ) -> MobgateResult<Response>
    where
        T: Serialize + ?Sized,
    {
        let url = self.endpoint(path);
        let resp = self
            .http
            .post(&url)
            .json(payload)
            .timeout(timeout)
            .send()
            .await
            .map_err(network)?;

        if !fallback_on.contains(&resp.status()) {
            return Ok(resp);
        }

        info!(path, status = %resp.status(), "JSON body rejected, retrying as form");
        self.http
            .post(&url)
            .form(payload)
            .timeout(timeout)
            .send()
            .await
            .map_err(network)
    }
}

/// Reads the body, failing with [`MobgateError::Status`] on a non-success status.
async fn success_body(resp: Response, context: &str) -> MobgateResult<String> {
    let status = resp.status();
    let body = resp.text().await.map_err(network)?;

    if !status.is_success() {
        return Err(MobgateError::Status {
            context: context.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

fn network(e: reqwest::Error) -> MobgateError {
    MobgateError::Network(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_join() {
        let client = MobsfClient::new("http://127.0.0.1:8000", "key").unwrap();
        assert_eq!(
            client.endpoint("/api/v1/scan"),
            "http://127.0.0.1:8000/api/v1/scan"
        );
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
    }

    #[test]
    fn test_invalid_api_key_is_config_error() {
        let err = MobsfClient::new("http://127.0.0.1:8000", "bad\nkey")
            .err()
            .unwrap();
        assert!(matches!(err, MobgateError::Config(_)));
    }
}
