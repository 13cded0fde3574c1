#![cfg(feature = "live-tests")]

use std::sync::{Arc, Once};

use azure_translate_adapter::core::types::{ATTR_ERROR_CODE, ATTR_HTTP_RESPONSE_CODE};
use azure_translate_adapter::providers::azure_translate;
use azure_translate_adapter::{
    AzureTranslateAdapter, InputSource, Outcome, ProcessorRuntime, TranslatorConfig,
};

const LIVE_FAILURES_ENV: &str = "ACS_TRANSLATOR_LIVE_FAILURES";

static DOTENV_INIT: Once = Once::new();

fn live_config() -> Option<TranslatorConfig> {
    DOTENV_INIT.call_once(|| {
        let _ = dotenvy::dotenv();
    });

    match TranslatorConfig::from_env() {
        Ok(config) => Some(config),
        Err(error) => {
            eprintln!("skipping test: translator environment incomplete ({error})");
            None
        }
    }
}

fn env_flag(name: &str) -> bool {
    matches!(
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_ascii_lowercase())
            .as_deref(),
        Some("1") | Some("true") | Some("yes") | Some("on")
    )
}

async fn runtime_for(config: TranslatorConfig) -> ProcessorRuntime {
    let adapter = AzureTranslateAdapter::new(config).expect("live config should validate");
    let runtime = ProcessorRuntime::builder(Arc::new(adapter))
        .build()
        .expect("build runtime");
    runtime.start().await.expect("start runtime");
    runtime
}

#[tokio::test]
async fn test_live_translate_ru_to_en() {
    let Some(config) = live_config() else {
        return;
    };
    let runtime = runtime_for(
        config
            .with_from_language("")
            .with_to_language("en")
            .with_input(InputSource::Text("Привет".to_string())),
    )
    .await;

    let routed = runtime.process(None).await;
    runtime.stop().await;

    assert_eq!(
        routed.outcome,
        Outcome::Success,
        "attributes: {:?}",
        routed.record.attributes()
    );
    let results =
        azure_translate::decode_translations(routed.record.content()).expect("decode live body");
    assert_eq!(results.len(), 1);
    let translation = &results[0].translations[0];
    assert_eq!(translation.to, "en");
    assert!(!translation.text.trim().is_empty());
}

#[tokio::test]
async fn test_live_invalid_target_language_is_a_translation_failure() {
    if !env_flag(LIVE_FAILURES_ENV) {
        eprintln!("skipping failure smoke: set {LIVE_FAILURES_ENV}=1 to enable");
        return;
    }
    let Some(config) = live_config() else {
        return;
    };
    let runtime = runtime_for(
        config
            .with_to_language("xx-Zzzz")
            .with_input(InputSource::Text("Hello".to_string())),
    )
    .await;

    let routed = runtime.process(None).await;
    runtime.stop().await;

    assert_eq!(routed.outcome, Outcome::TranslationFailure);
    assert_eq!(routed.record.attribute(ATTR_HTTP_RESPONSE_CODE), Some("400"));
    assert!(routed.record.attribute(ATTR_ERROR_CODE).is_some());
}
