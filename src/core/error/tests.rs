use super::*;
use crate::core::types::Outcome;

#[test]
fn test_config_error_display_messages() {
    let missing = ConfigError::MissingValue {
        field: "subscription_key",
    };
    assert_eq!(
        missing.to_string(),
        "missing required configuration value: subscription_key"
    );

    let bad_tag = ConfigError::InvalidLanguageTag {
        field: "to_language",
        tag: "en us".to_string(),
    };
    assert_eq!(
        bad_tag.to_string(),
        "invalid language tag for to_language: \"en us\""
    );

    let version = ConfigError::UnsupportedApiVersion {
        version: "2.0".to_string(),
    };
    assert_eq!(
        version.to_string(),
        "unsupported api version: 2.0 (only 3.0 is accepted)"
    );

    let timeout = ConfigError::InvalidTimeout { timeout_ms: 0 };
    assert_eq!(timeout.to_string(), "invalid timeout: 0 ms");
}

#[test]
fn test_adapter_error_display_messages() {
    let transport = AdapterError::Transport {
        request_id: None,
        message: "connection refused".to_string(),
    };
    assert_eq!(transport.to_string(), "transport error: connection refused");

    let status = AdapterError::Status {
        status_code: 401,
        request_id: Some("req-1".to_string()),
        error_code: "401000".to_string(),
        message: "Access denied".to_string(),
    };
    assert_eq!(
        status.to_string(),
        "service status error [request_id=req-1, status_code=401]: 401000 Access denied"
    );

    let parse = ResponseParseError {
        status_code: 400,
        message: "expected value".to_string(),
    };
    assert_eq!(
        parse.to_string(),
        "response parse error [status_code=400]: expected value"
    );

    let wrapped: AdapterError = ConfigError::MissingValue {
        field: "to_language",
    }
    .into();
    assert_eq!(
        wrapped.to_string(),
        "missing required configuration value: to_language"
    );
}

#[test]
fn test_adapter_error_outcome_mapping() {
    let transport = AdapterError::Transport {
        request_id: None,
        message: "timeout".to_string(),
    };
    assert_eq!(transport.outcome(), Outcome::CommunicationFailure);
    assert!(transport.is_retryable());

    assert_eq!(AdapterError::NotOpen.outcome(), Outcome::CommunicationFailure);

    let client_error = AdapterError::Status {
        status_code: 429,
        request_id: None,
        error_code: "429001".to_string(),
        message: "quota".to_string(),
    };
    assert_eq!(client_error.outcome(), Outcome::TranslationFailure);
    assert!(!client_error.is_retryable());

    let server_error = AdapterError::Status {
        status_code: 503,
        request_id: None,
        error_code: "503".to_string(),
        message: String::new(),
    };
    assert_eq!(server_error.outcome(), Outcome::CommunicationFailure);
    assert!(server_error.is_retryable());

    let decode = AdapterError::InputDecode {
        character_set: "Shift_JIS".to_string(),
        message: "content is not valid in this character set".to_string(),
    };
    assert_eq!(decode.outcome(), Outcome::TranslationFailure);

    let config = AdapterError::Configuration(ConfigError::MissingValue {
        field: "subscription_region",
    });
    assert_eq!(config.outcome(), Outcome::TranslationFailure);
}
