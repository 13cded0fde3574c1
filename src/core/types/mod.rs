use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// HTTP status of any received non-200 response.
pub const ATTR_HTTP_RESPONSE_CODE: &str = "acs-http-response-code";
/// Six-digit service error code, or the HTTP status when the body carried none.
pub const ATTR_ERROR_CODE: &str = "acs-error-code";
/// Service error description, or a generic message when the body carried none.
pub const ATTR_ERROR_MESSAGE: &str = "acs-error-message";
/// `X-RequestId` echoed by the service.
pub const ATTR_REQUEST_ID: &str = "acs-request-id";
/// Description of a failure where no response was obtained.
pub const ATTR_TRANSPORT_ERROR: &str = "acs-transport-error";
/// Configuration that could not be resolved for this record.
pub const ATTR_CONFIGURATION_ERROR: &str = "acs-configuration-error";
/// Record content that could not be decoded as input text.
pub const ATTR_INPUT_ERROR: &str = "acs-input-error";

/// Every attribute the adapter writes. Cleared at the start of each invocation.
pub const ADAPTER_ATTRIBUTES: [&str; 7] = [
    ATTR_HTTP_RESPONSE_CODE,
    ATTR_ERROR_CODE,
    ATTR_ERROR_MESSAGE,
    ATTR_REQUEST_ID,
    ATTR_TRANSPORT_ERROR,
    ATTR_CONFIGURATION_ERROR,
    ATTR_INPUT_ERROR,
];

/// Opaque unit of work: content bytes plus ordered string attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    content: Vec<u8>,
    attributes: IndexMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.put_attribute(key, value);
        self
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<Vec<u8>>) {
        self.content = content.into();
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn put_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Removes `key`, keeping the order of the remaining attributes.
    pub fn remove_attribute(&mut self, key: &str) -> Option<String> {
        self.attributes.shift_remove(key)
    }

    pub fn put_all_attributes<I, K, V>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in attributes {
            self.put_attribute(key, value);
        }
    }
}

/// The three named exits a processed record can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    #[serde(rename = "comms_failure")]
    CommunicationFailure,
    TranslationFailure,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [
        Outcome::Success,
        Outcome::CommunicationFailure,
        Outcome::TranslationFailure,
    ];

    /// 200 is the only success; 4xx means the request itself was rejected;
    /// everything else is treated as retryable.
    pub fn from_status(status_code: u16) -> Self {
        match status_code {
            200 => Self::Success,
            400..=499 => Self::TranslationFailure,
            _ => Self::CommunicationFailure,
        }
    }

    pub fn channel_name(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::CommunicationFailure => "comms_failure",
            Self::TranslationFailure => "translation_failure",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.channel_name())
    }
}

/// A record handed to exactly one outcome channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedRecord {
    pub outcome: Outcome,
    pub record: Record,
}

impl RoutedRecord {
    pub fn new(outcome: Outcome, record: Record) -> Self {
        Self { outcome, record }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationItem {
    #[serde(rename = "Text")]
    pub text: String,
}

impl TranslationItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One element of a successful `/translate` response array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<DetectedLanguage>,
    pub translations: Vec<Translation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLanguage {
    pub language: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub text: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transliteration: Option<Transliteration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transliteration {
    pub text: String,
    pub script: String,
}

/// `{ "error": { "code": ..., "message": ... } }` as returned on failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceErrorEnvelope {
    pub error: ServiceError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}
