use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::config::ResolvedRequest;
use crate::core::error::{AdapterError, ConfigError, ResponseParseError};
use crate::core::types::{ServiceErrorEnvelope, TranslationItem, TranslationResult};
use crate::transport::http::RawResponse;

pub const SUBSCRIPTION_KEY_HEADER: &str = "ocp-apim-subscription-key";
pub const SUBSCRIPTION_REGION_HEADER: &str = "ocp-apim-subscription-region";
pub const NO_STRUCTURED_ERROR_MESSAGE: &str = "no structured error in response body";

const TRANSLATE_PATH_SEGMENT: &str = "translate";
const API_VERSION_PARAM: &str = "api-version";
const TO_PARAM: &str = "to";
const FROM_PARAM: &str = "from";

#[derive(Debug, Clone)]
pub struct EncodedRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Vec<TranslationItem>,
}

/// Service error fields lifted out of a failure body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceErrorDetails {
    pub code: String,
    pub message: String,
}

pub fn encode_request(resolved: &ResolvedRequest) -> Result<EncodedRequest, ConfigError> {
    Ok(EncodedRequest {
        url: build_translate_url(
            &resolved.endpoint,
            resolved.api_version,
            &resolved.to_languages,
            resolved.from_language.as_deref(),
        )?,
        headers: build_headers(&resolved.subscription_key, &resolved.subscription_region)?,
        body: build_request_body(resolved.input_text.as_deref()),
    })
}

/// `{endpoint}/translate?api-version=..&to=a,b[&from=..]`, with query values
/// form-encoded (so `zh-Hant,ru` is sent as `zh-Hant%2Cru`).
pub fn build_translate_url(
    endpoint: &Url,
    api_version: &str,
    to_languages: &[String],
    from_language: Option<&str>,
) -> Result<Url, ConfigError> {
    let mut url = endpoint.clone();
    url.set_query(None);
    url.set_fragment(None);

    url.path_segments_mut()
        .map_err(|_| ConfigError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: "endpoint cannot carry a path".to_string(),
        })?
        .pop_if_empty()
        .push(TRANSLATE_PATH_SEGMENT);

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair(API_VERSION_PARAM, api_version)
            .append_pair(TO_PARAM, &to_languages.join(","));
        if let Some(from_language) = from_language {
            query.append_pair(FROM_PARAM, from_language);
        }
    }

    Ok(url)
}

pub fn build_headers(
    subscription_key: &str,
    subscription_region: &str,
) -> Result<HeaderMap, ConfigError> {
    let mut key = HeaderValue::from_str(subscription_key).map_err(|_| {
        ConfigError::InvalidHeaderValue {
            field: "subscription_key",
        }
    })?;
    key.set_sensitive(true);

    let region = HeaderValue::from_str(subscription_region).map_err(|_| {
        ConfigError::InvalidHeaderValue {
            field: "subscription_region",
        }
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static(SUBSCRIPTION_KEY_HEADER), key);
    headers.insert(HeaderName::from_static(SUBSCRIPTION_REGION_HEADER), region);
    Ok(headers)
}

/// At most one item: absent or empty input produces an empty array.
pub fn build_request_body(input_text: Option<&str>) -> Vec<TranslationItem> {
    input_text
        .filter(|text| !text.is_empty())
        .map(TranslationItem::new)
        .into_iter()
        .collect()
}

pub fn decode_translations(body: &[u8]) -> Result<Vec<TranslationResult>, ResponseParseError> {
    serde_json::from_slice(body).map_err(|error| ResponseParseError {
        status_code: 200,
        message: error.to_string(),
    })
}

pub fn decode_service_error(
    status_code: u16,
    body: &[u8],
) -> Result<ServiceErrorDetails, ResponseParseError> {
    let envelope: ServiceErrorEnvelope =
        serde_json::from_slice(body).map_err(|error| ResponseParseError {
            status_code,
            message: error.to_string(),
        })?;

    match (envelope.error.code, envelope.error.message) {
        (Some(code), Some(message)) => Ok(ServiceErrorDetails {
            code: render_code(code),
            message,
        }),
        _ => Err(ResponseParseError {
            status_code,
            message: "error object lacks code or message".to_string(),
        }),
    }
}

/// Error for a received non-200 response.
///
/// Bodies without a usable `error` object fall back to the HTTP status and a
/// generic message so the code and message are always present.
pub fn status_error(response: &RawResponse) -> AdapterError {
    let details = decode_service_error(response.status_code, &response.body).unwrap_or_else(
        |parse_error| {
            debug!(error = %parse_error, "falling back to generic service error");
            ServiceErrorDetails {
                code: response.status_code.to_string(),
                message: NO_STRUCTURED_ERROR_MESSAGE.to_string(),
            }
        },
    );

    AdapterError::Status {
        status_code: response.status_code,
        request_id: response.request_id.clone(),
        error_code: details.code,
        message: details.message,
    }
}

/// Re-indents a JSON body; `None` when the body is not JSON.
pub fn prettify(body: &[u8]) -> Option<Vec<u8>> {
    let value: Value = serde_json::from_slice(body).ok()?;
    serde_json::to_vec_pretty(&value).ok()
}

fn render_code(code: Value) -> String {
    match code {
        Value::String(code) => code,
        other => other.to_string(),
    }
}
