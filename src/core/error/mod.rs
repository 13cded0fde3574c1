use crate::core::types::Outcome;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required configuration value: {field}")]
    MissingValue { field: &'static str },
    #[error("invalid language tag for {field}: {tag:?}")]
    InvalidLanguageTag { field: &'static str, tag: String },
    #[error("invalid service endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("unsupported api version: {version} (only 3.0 is accepted)")]
    UnsupportedApiVersion { version: String },
    #[error("unsupported character set: {name}")]
    UnsupportedCharacterSet { name: String },
    #[error("invalid timeout: {timeout_ms} ms")]
    InvalidTimeout { timeout_ms: u64 },
    #[error("invalid expression in {field}: {reason}")]
    InvalidExpression { field: &'static str, reason: String },
    #[error("invalid numeric value for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("invalid concurrency bound: {max_in_flight}")]
    InvalidConcurrency { max_in_flight: usize },
    #[error("invalid header value for {field}")]
    InvalidHeaderValue { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error(
        "transport error{context}: {message}",
        context = format_context(.request_id.as_deref(), None)
    )]
    Transport {
        request_id: Option<String>,
        message: String,
    },
    /// Any received response other than 200. `error_code` and `message` come
    /// from the service error body, or fall back to the status and a generic
    /// message when the body has none.
    #[error(
        "service status error{context}: {error_code} {message}",
        context = format_context(.request_id.as_deref(), Some(*.status_code))
    )]
    Status {
        status_code: u16,
        request_id: Option<String>,
        error_code: String,
        message: String,
    },
    #[error("request serialization error: {message}")]
    Serialization { message: String },
    #[error("input decode error [character_set={character_set}]: {message}")]
    InputDecode {
        character_set: String,
        message: String,
    },
    #[error("adapter is not open")]
    NotOpen,
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl AdapterError {
    /// Channel a record lands on when this error ends an invocation.
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Transport { .. } | Self::NotOpen => Outcome::CommunicationFailure,
            Self::Status { status_code, .. } => Outcome::from_status(*status_code),
            Self::Serialization { .. } | Self::InputDecode { .. } | Self::Configuration(_) => {
                Outcome::TranslationFailure
            }
        }
    }

    /// Whether re-driving the same record unchanged may succeed.
    pub fn is_retryable(&self) -> bool {
        self.outcome() == Outcome::CommunicationFailure
    }
}

/// A response body that does not have the expected shape.
///
/// Never routes a record by itself: an unusable error body degrades to the
/// fallback error pair, an unusable success body is still delivered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "response parse error{context}: {message}",
    context = format_context(None, Some(*.status_code))
)]
pub struct ResponseParseError {
    pub status_code: u16,
    pub message: String,
}

fn format_context(request_id: Option<&str>, status_code: Option<u16>) -> String {
    let mut context = Vec::new();

    if let Some(request_id) = request_id {
        context.push(format!("request_id={request_id}"));
    }
    if let Some(status_code) = status_code {
        context.push(format!("status_code={status_code}"));
    }

    if context.is_empty() {
        String::new()
    } else {
        format!(" [{}]", context.join(", "))
    }
}

#[cfg(test)]
mod tests;
