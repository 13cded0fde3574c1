use std::borrow::Cow;

use encoding_rs::Encoding;
use indexmap::IndexMap;
use reqwest::Url;

use crate::core::error::{AdapterError, ConfigError};
use crate::core::types::Record;
use crate::expression;

pub const API_VERSION: &str = "3.0";
pub const DEFAULT_CHARACTER_SET: &str = "UTF-8";
pub const DEFAULT_TO_LANGUAGE: &str = "en";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub const SUBSCRIPTION_KEY_ENV: &str = "ACS_TRANSLATOR_TEXT_SUBSCRIPTION_KEY";
pub const SUBSCRIPTION_REGION_ENV: &str = "ACS_TRANSLATOR_TEXT_SUBSCRIPTION_REGION";
pub const SERVICE_ENDPOINT_ENV: &str = "ACS_TRANSLATOR_TEXT_ENDPOINT";
pub const FROM_LANGUAGE_ENV: &str = "ACS_TRANSLATOR_FROM";
pub const TO_LANGUAGE_ENV: &str = "ACS_TRANSLATOR_TO";
pub const TIMEOUT_MS_ENV: &str = "ACS_TRANSLATOR_TIMEOUT_MS";

const REDACTED: &str = "<redacted>";

/// Character set used to decode record content.
///
/// Any WHATWG encoding label is accepted (`UTF-8`, `windows-1252`,
/// `Shift_JIS`, `GBK`, `UTF-16`, ...), matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterSet(&'static Encoding);

impl Default for CharacterSet {
    fn default() -> Self {
        Self(encoding_rs::UTF_8)
    }
}

impl CharacterSet {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        Encoding::for_label(name.trim().as_bytes())
            .filter(|encoding| *encoding != encoding_rs::REPLACEMENT)
            .map(Self)
            .ok_or_else(|| ConfigError::UnsupportedCharacterSet {
                name: name.to_string(),
            })
    }

    /// Canonical name of the resolved encoding.
    pub fn name(self) -> &'static str {
        self.0.name()
    }

    pub fn encoding(self) -> &'static Encoding {
        self.0
    }

    /// Decodes `bytes` without BOM sniffing; malformed sequences are an error.
    pub fn decode(self, bytes: &[u8]) -> Result<String, AdapterError> {
        self.0
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(Cow::into_owned)
            .ok_or_else(|| AdapterError::InputDecode {
                character_set: self.name().to_string(),
                message: "content is not valid in this character set".to_string(),
            })
    }
}

/// Where the text to translate comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputSource {
    /// Nothing is sent; the outbound array is empty.
    #[default]
    None,
    /// A literal value, which may reference record attributes.
    Text(String),
    /// The record's content, decoded with the configured character set.
    Content,
}

/// Configuration bag for one translate adapter.
///
/// String values other than `api_version` may reference record attributes
/// with `${name}` and are evaluated per record by [`TranslatorConfig::resolve`].
#[derive(Clone, PartialEq, Eq)]
pub struct TranslatorConfig {
    pub subscription_key: String,
    pub subscription_region: String,
    /// Bare host (served over https) or a base URL with an explicit scheme.
    pub service_endpoint: String,
    pub api_version: String,
    pub character_set: String,
    pub from_language: Option<String>,
    /// Comma-separated target language tags.
    pub to_language: String,
    pub input: InputSource,
    pub pretty_print_response: bool,
    pub timeout_ms: u64,
}

impl std::fmt::Debug for TranslatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslatorConfig")
            .field("subscription_key", &REDACTED)
            .field("subscription_region", &self.subscription_region)
            .field("service_endpoint", &self.service_endpoint)
            .field("api_version", &self.api_version)
            .field("character_set", &self.character_set)
            .field("from_language", &self.from_language)
            .field("to_language", &self.to_language)
            .field("input", &self.input)
            .field("pretty_print_response", &self.pretty_print_response)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl TranslatorConfig {
    pub fn new(
        subscription_key: impl Into<String>,
        subscription_region: impl Into<String>,
        service_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            subscription_key: subscription_key.into(),
            subscription_region: subscription_region.into(),
            service_endpoint: service_endpoint.into(),
            api_version: API_VERSION.to_string(),
            character_set: DEFAULT_CHARACTER_SET.to_string(),
            from_language: None,
            to_language: DEFAULT_TO_LANGUAGE.to_string(),
            input: InputSource::None,
            pretty_print_response: true,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_from_language(mut self, from_language: impl Into<String>) -> Self {
        self.from_language = Some(from_language.into());
        self
    }

    pub fn with_to_language(mut self, to_language: impl Into<String>) -> Self {
        self.to_language = to_language.into();
        self
    }

    pub fn with_input(mut self, input: InputSource) -> Self {
        self.input = input;
        self
    }

    pub fn with_character_set(mut self, character_set: impl Into<String>) -> Self {
        self.character_set = character_set.into();
        self
    }

    pub fn with_pretty_print_response(mut self, pretty_print_response: bool) -> Self {
        self.pretty_print_response = pretty_print_response;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Loads credentials and language defaults from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str, field: &'static str| {
            lookup(name)
                .and_then(non_blank)
                .ok_or(ConfigError::MissingValue { field })
        };

        let mut config = Self::new(
            required(SUBSCRIPTION_KEY_ENV, "subscription_key")?,
            required(SUBSCRIPTION_REGION_ENV, "subscription_region")?,
            required(SERVICE_ENDPOINT_ENV, "service_endpoint")?,
        );

        if let Some(to_language) = lookup(TO_LANGUAGE_ENV).and_then(non_blank) {
            config.to_language = to_language;
        }
        config.from_language = lookup(FROM_LANGUAGE_ENV).and_then(non_blank);

        if let Some(raw) = lookup(TIMEOUT_MS_ENV).and_then(non_blank) {
            config.timeout_ms = raw.parse().map_err(|_| ConfigError::InvalidNumber {
                field: "timeout_ms",
                value: raw.clone(),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks everything that can be checked before any record is seen.
    ///
    /// Values that reference record attributes are only checked for
    /// well-formed references here; their content is validated per record.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_version.trim() != API_VERSION {
            return Err(ConfigError::UnsupportedApiVersion {
                version: self.api_version.clone(),
            });
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout {
                timeout_ms: self.timeout_ms,
            });
        }

        require_non_blank("subscription_key", &self.subscription_key)?;
        require_non_blank("subscription_region", &self.subscription_region)?;
        require_non_blank("service_endpoint", &self.service_endpoint)?;
        require_non_blank("to_language", &self.to_language)?;

        let empty = IndexMap::new();
        for (field, value) in self.templated_fields() {
            if expression::has_references(value) {
                expression::evaluate(field, value, &empty)?;
            }
        }

        if !expression::has_references(&self.service_endpoint) {
            parse_endpoint(&self.service_endpoint)?;
        }
        if !expression::has_references(&self.to_language) {
            parse_language_tags("to_language", &self.to_language)?;
        }
        if let Some(from_language) = &self.from_language {
            if !expression::has_references(from_language) && !from_language.trim().is_empty() {
                validate_language_tag("from_language", from_language)?;
            }
        }
        if !expression::has_references(&self.character_set) {
            CharacterSet::parse(&self.character_set)?;
        }

        Ok(())
    }

    /// Evaluates this configuration against one record.
    pub fn resolve(&self, record: &Record) -> Result<ResolvedRequest, AdapterError> {
        let attributes = record.attributes();
        let eval = |field: &'static str, value: &str| -> Result<String, ConfigError> {
            Ok(expression::evaluate(field, value, attributes)?.trim().to_string())
        };

        let subscription_key = eval("subscription_key", &self.subscription_key)?;
        require_non_blank("subscription_key", &subscription_key)?;
        let subscription_region = eval("subscription_region", &self.subscription_region)?;
        require_non_blank("subscription_region", &subscription_region)?;

        let endpoint = parse_endpoint(&eval("service_endpoint", &self.service_endpoint)?)?;
        let to_languages =
            parse_language_tags("to_language", &eval("to_language", &self.to_language)?)?;

        let from_language = match &self.from_language {
            Some(raw) => {
                let value = eval("from_language", raw)?;
                if value.is_empty() {
                    None
                } else {
                    Some(validate_language_tag("from_language", &value)?)
                }
            }
            None => None,
        };

        let character_set = CharacterSet::parse(&eval("character_set", &self.character_set)?)?;

        let input_text = match &self.input {
            InputSource::None => None,
            InputSource::Text(template) => {
                Some(expression::evaluate("input_text", template, attributes)?)
            }
            InputSource::Content => Some(character_set.decode(record.content())?),
        }
        .filter(|text| !text.is_empty());

        Ok(ResolvedRequest {
            subscription_key,
            subscription_region,
            endpoint,
            api_version: API_VERSION,
            from_language,
            to_languages,
            character_set,
            input_text,
        })
    }

    fn templated_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![
            ("subscription_key", self.subscription_key.as_str()),
            ("subscription_region", self.subscription_region.as_str()),
            ("service_endpoint", self.service_endpoint.as_str()),
            ("character_set", self.character_set.as_str()),
            ("to_language", self.to_language.as_str()),
        ];
        if let Some(from_language) = &self.from_language {
            fields.push(("from_language", from_language.as_str()));
        }
        if let InputSource::Text(template) = &self.input {
            fields.push(("input_text", template.as_str()));
        }
        fields
    }
}

/// Configuration evaluated for one record, ready to become a request.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub subscription_key: String,
    pub subscription_region: String,
    pub endpoint: Url,
    pub api_version: &'static str,
    pub from_language: Option<String>,
    pub to_languages: Vec<String>,
    pub character_set: CharacterSet,
    pub input_text: Option<String>,
}

impl std::fmt::Debug for ResolvedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedRequest")
            .field("subscription_key", &REDACTED)
            .field("subscription_region", &self.subscription_region)
            .field("endpoint", &self.endpoint.as_str())
            .field("api_version", &self.api_version)
            .field("from_language", &self.from_language)
            .field("to_languages", &self.to_languages)
            .field("character_set", &self.character_set)
            .field("input_text", &self.input_text)
            .finish()
    }
}

/// Splits a comma-separated list of language tags, trimming each entry.
pub fn parse_language_tags(field: &'static str, raw: &str) -> Result<Vec<String>, ConfigError> {
    if raw.trim().is_empty() {
        return Err(ConfigError::MissingValue { field });
    }

    raw.split(',')
        .map(|tag| validate_language_tag(field, tag))
        .collect()
}

/// Accepts well-formed BCP-47 shapes such as `en`, `zh-Hant` or `sr-Cyrl-RS`.
pub fn validate_language_tag(field: &'static str, tag: &str) -> Result<String, ConfigError> {
    let trimmed = tag.trim();
    let mut subtags = trimmed.split('-');
    let primary_ok = subtags.next().is_some_and(|primary| {
        (2..=8).contains(&primary.len()) && primary.chars().all(|c| c.is_ascii_alphabetic())
    });
    let rest_ok = subtags.all(|subtag| {
        (1..=8).contains(&subtag.len()) && subtag.chars().all(|c| c.is_ascii_alphanumeric())
    });

    if primary_ok && rest_ok {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidLanguageTag {
            field,
            tag: tag.to_string(),
        })
    }
}

/// Turns a bare host or an explicit base URL into the service base URL.
pub fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::MissingValue {
            field: "service_endpoint",
        });
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let invalid = |reason: String| ConfigError::InvalidEndpoint {
        endpoint: raw.to_string(),
        reason,
    };

    let url = Url::parse(&candidate).map_err(|error| invalid(error.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.cannot_be_a_base() || url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("endpoint has no host".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(
            "endpoint must not carry a query or fragment".to_string(),
        ));
    }

    Ok(url)
}

fn require_non_blank(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::MissingValue { field })
    } else {
        Ok(())
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
