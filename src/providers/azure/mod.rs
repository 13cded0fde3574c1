use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::config::TranslatorConfig;
use crate::core::error::{AdapterError, ConfigError};
use crate::core::traits::RecordProcessor;
use crate::core::types::{
    ADAPTER_ATTRIBUTES, ATTR_CONFIGURATION_ERROR, ATTR_ERROR_CODE, ATTR_ERROR_MESSAGE,
    ATTR_HTTP_RESPONSE_CODE, ATTR_INPUT_ERROR, ATTR_REQUEST_ID, ATTR_TRANSPORT_ERROR, Outcome,
    Record, RoutedRecord,
};
use crate::providers::azure_translate::{self, EncodedRequest};
use crate::transport::http::{HttpTransport, RawResponse};

const PROCESSOR_NAME: &str = "azure_translate";

/// Forwards text to the Translator `/translate` endpoint and routes the record
/// on the response status.
///
/// The configuration is immutable after construction. The only shared state
/// is the transport handle, created by `open` and dropped by `close`.
pub struct AzureTranslateAdapter {
    config: TranslatorConfig,
    transport: RwLock<Option<HttpTransport>>,
}

impl AzureTranslateAdapter {
    pub fn new(config: TranslatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            transport: RwLock::new(None),
        })
    }

    /// Builds an adapter that is already open on the given transport.
    pub fn with_transport(
        config: TranslatorConfig,
        transport: HttpTransport,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            transport: RwLock::new(Some(transport)),
        })
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.current_transport().is_some()
    }

    /// Runs one invocation against `record`. Never fails: every error becomes
    /// a channel assignment plus attributes.
    ///
    /// Attributes left by an earlier invocation are dropped first, so a
    /// re-driven record only carries the outcome of this attempt.
    pub async fn translate(&self, mut record: Record) -> RoutedRecord {
        for attribute in ADAPTER_ATTRIBUTES {
            record.remove_attribute(attribute);
        }

        let Some(transport) = self.current_transport() else {
            return route_error(record, AdapterError::NotOpen);
        };

        let encoded = match self.encode(&record) {
            Ok(encoded) => encoded,
            Err(error) => return route_error(record, error),
        };

        match transport
            .post_json(encoded.url, encoded.headers, &encoded.body)
            .await
        {
            Ok(response) => self.route_response(record, response),
            Err(error) => route_error(record, error),
        }
    }

    fn encode(&self, record: &Record) -> Result<EncodedRequest, AdapterError> {
        let resolved = self.config.resolve(record)?;
        debug!(request = ?resolved, "resolved translation request");
        Ok(azure_translate::encode_request(&resolved)?)
    }

    fn route_response(&self, mut record: Record, response: RawResponse) -> RoutedRecord {
        if response.status_code != 200 {
            let status_error = azure_translate::status_error(&response);
            record.set_content(response.body);
            return route_error(record, status_error);
        }

        log_translation_summary(&response.body);
        let content = if self.config.pretty_print_response {
            azure_translate::prettify(&response.body).unwrap_or(response.body)
        } else {
            response.body
        };
        record.set_content(content);
        RoutedRecord::new(Outcome::Success, record)
    }

    fn current_transport(&self) -> Option<HttpTransport> {
        self.transport
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl RecordProcessor for AzureTranslateAdapter {
    fn name(&self) -> &str {
        PROCESSOR_NAME
    }

    async fn open(&self) -> Result<(), ConfigError> {
        let mut slot = self
            .transport
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(HttpTransport::new(self.config.timeout_ms)?);
            debug!(timeout_ms = self.config.timeout_ms, "translate adapter opened");
        }
        Ok(())
    }

    async fn on_record(&self, input: Option<Record>) -> RoutedRecord {
        self.translate(input.unwrap_or_default()).await
    }

    async fn close(&self) {
        let previous = self
            .transport
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            debug!("translate adapter closed");
        }
    }
}

/// Routes a record on the error that ended its invocation.
///
/// Content is not touched here: a received error body has already been
/// written by the caller, and nothing was received otherwise.
fn route_error(mut record: Record, adapter_error: AdapterError) -> RoutedRecord {
    let outcome = adapter_error.outcome();

    match &adapter_error {
        AdapterError::Status {
            status_code,
            request_id,
            error_code,
            message,
        } => {
            record.put_attribute(ATTR_HTTP_RESPONSE_CODE, status_code.to_string());
            if let Some(request_id) = request_id {
                record.put_attribute(ATTR_REQUEST_ID, request_id.clone());
            }
            record.put_attribute(ATTR_ERROR_CODE, error_code.clone());
            record.put_attribute(ATTR_ERROR_MESSAGE, message.clone());
        }
        AdapterError::Transport { request_id, .. } => {
            if let Some(request_id) = request_id {
                record.put_attribute(ATTR_REQUEST_ID, request_id.clone());
            }
            record.put_attribute(ATTR_TRANSPORT_ERROR, adapter_error.to_string());
        }
        AdapterError::NotOpen => {
            record.put_attribute(ATTR_TRANSPORT_ERROR, adapter_error.to_string());
        }
        AdapterError::Configuration(config_error) => {
            record.put_attribute(ATTR_CONFIGURATION_ERROR, config_error.to_string());
        }
        AdapterError::InputDecode { .. } | AdapterError::Serialization { .. } => {
            record.put_attribute(ATTR_INPUT_ERROR, adapter_error.to_string());
        }
    }

    error!(
        error = %adapter_error,
        channel = %outcome,
        retryable = adapter_error.is_retryable(),
        "translation invocation failed"
    );
    RoutedRecord::new(outcome, record)
}

fn log_translation_summary(body: &[u8]) {
    match azure_translate::decode_translations(body) {
        Ok(results) => {
            let translations: usize = results
                .iter()
                .map(|result| result.translations.len())
                .sum();
            let detected = results
                .iter()
                .filter_map(|result| result.detected_language.as_ref())
                .map(|detected| detected.language.as_str())
                .collect::<Vec<_>>()
                .join(",");
            debug!(
                items = results.len(),
                translations,
                detected = %detected,
                "translation succeeded"
            );
        }
        Err(parse_error) => {
            warn!(
                error = %parse_error,
                "success body does not match the translation schema"
            );
        }
    }
}
