use std::time::Duration;

use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use tracing::debug;

use crate::core::error::{AdapterError, ConfigError};

const DEFAULT_REQUEST_ID_HEADER: &str = "x-requestid";

/// Response as received, before any status interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status_code: u16,
    pub request_id: Option<String>,
    pub body: Vec<u8>,
}

/// Shared outbound HTTP handle. Cloning shares the underlying connection pool.
///
/// Each call performs exactly one request; retries are left to whoever
/// re-drives failed records.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout_ms: u64,
    request_id_header: HeaderName,
}

impl HttpTransport {
    pub fn new(timeout_ms: u64) -> Result<Self, ConfigError> {
        Self::with_client(reqwest::Client::new(), timeout_ms)
    }

    pub fn with_client(client: reqwest::Client, timeout_ms: u64) -> Result<Self, ConfigError> {
        Self::validate_timeout(timeout_ms)?;

        Ok(Self {
            client,
            timeout_ms,
            request_id_header: HeaderName::from_static(DEFAULT_REQUEST_ID_HEADER),
        })
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub async fn post_json<TReq>(
        &self,
        url: Url,
        headers: HeaderMap,
        body: &TReq,
    ) -> Result<RawResponse, AdapterError>
    where
        TReq: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(body).map_err(|error| AdapterError::Serialization {
            message: error.to_string(),
        })?;

        debug!(
            url = %url,
            body_bytes = payload.len(),
            "sending translation request"
        );

        let response = self
            .client
            .post(url)
            .timeout(Duration::from_millis(self.timeout_ms))
            .headers(headers)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(payload)
            .send()
            .await
            .map_err(|error| AdapterError::Transport {
                request_id: None,
                message: describe_transport_error(error),
            })?;

        let status_code = response.status().as_u16();
        let request_id = extract_request_id(response.headers(), &self.request_id_header);

        let body = response
            .bytes()
            .await
            .map_err(|error| AdapterError::Transport {
                request_id: request_id.clone(),
                message: format!(
                    "http status {status_code}; failed to read response body: {}",
                    describe_transport_error(error)
                ),
            })?
            .to_vec();

        debug!(
            status_code,
            request_id = request_id.as_deref().unwrap_or("-"),
            body_bytes = body.len(),
            "received translation response"
        );

        Ok(RawResponse {
            status_code,
            request_id,
            body,
        })
    }

    fn validate_timeout(timeout_ms: u64) -> Result<(), ConfigError> {
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout { timeout_ms });
        }
        Ok(())
    }
}

fn extract_request_id(headers: &HeaderMap, request_id_header: &HeaderName) -> Option<String> {
    headers
        .get(request_id_header)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn describe_transport_error(error: reqwest::Error) -> String {
    let kind = if error.is_timeout() {
        "timeout"
    } else if error.is_connect() {
        "connect"
    } else if error.is_body() || error.is_decode() {
        "body"
    } else {
        "request"
    };

    // Attributes carry the failure, not the request URL.
    format!("{kind}: {}", error.without_url())
}
