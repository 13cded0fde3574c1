use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::*;
use crate::core::types::Outcome;

#[derive(Default)]
struct EchoProcessor {
    open: AtomicBool,
    calls: AtomicUsize,
}

#[async_trait]
impl RecordProcessor for EchoProcessor {
    fn name(&self) -> &str {
        "echo"
    }

    async fn open(&self) -> Result<(), ConfigError> {
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn on_record(&self, input: Option<Record>) -> RoutedRecord {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let record = input.unwrap_or_default();
        if self.open.load(Ordering::SeqCst) {
            RoutedRecord::new(Outcome::Success, record)
        } else {
            RoutedRecord::new(Outcome::CommunicationFailure, record)
        }
    }

    async fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_record_processor_lifecycle_shape() {
    let processor = EchoProcessor::default();
    assert_eq!(processor.name(), "echo");

    let before_open = processor.on_record(None).await;
    assert_eq!(before_open.outcome, Outcome::CommunicationFailure);
    assert_eq!(before_open.record, Record::new());

    processor.open().await.expect("open should succeed");
    let routed = processor
        .on_record(Some(Record::new().with_content("hi")))
        .await;
    assert_eq!(routed.outcome, Outcome::Success);
    assert_eq!(routed.record.content(), b"hi");

    processor.close().await;
    let after_close = processor.on_record(None).await;
    assert_eq!(after_close.outcome, Outcome::CommunicationFailure);
    assert_eq!(processor.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_record_processor_is_object_safe() {
    let processor: Box<dyn RecordProcessor> = Box::new(EchoProcessor::default());
    processor.open().await.expect("open should succeed");
    assert_eq!(processor.on_record(None).await.outcome, Outcome::Success);
}
