use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::core::error::ConfigError;
use crate::core::traits::RecordProcessor;
use crate::core::types::{ATTR_TRANSPORT_ERROR, Outcome, Record, RoutedRecord};

const DEFAULT_MAX_IN_FLIGHT: usize = 8;
const TASK_FAILURE_MESSAGE: &str = "processor task failed before routing the record";

/// Minimal host that drives one processor: opens it, feeds invocations and
/// gathers routed records per outcome channel.
pub struct ProcessorRuntime {
    processor: Arc<dyn RecordProcessor>,
    max_in_flight: usize,
}

pub struct ProcessorRuntimeBuilder {
    processor: Arc<dyn RecordProcessor>,
    max_in_flight: usize,
}

/// Records collected per outcome channel, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChannelOutput {
    pub success: Vec<Record>,
    pub comms_failure: Vec<Record>,
    pub translation_failure: Vec<Record>,
}

impl ChannelOutput {
    pub fn push(&mut self, routed: RoutedRecord) {
        match routed.outcome {
            Outcome::Success => self.success.push(routed.record),
            Outcome::CommunicationFailure => self.comms_failure.push(routed.record),
            Outcome::TranslationFailure => self.translation_failure.push(routed.record),
        }
    }

    pub fn channel(&self, outcome: Outcome) -> &[Record] {
        match outcome {
            Outcome::Success => &self.success,
            Outcome::CommunicationFailure => &self.comms_failure,
            Outcome::TranslationFailure => &self.translation_failure,
        }
    }

    pub fn total(&self) -> usize {
        self.success.len() + self.comms_failure.len() + self.translation_failure.len()
    }
}

impl ProcessorRuntime {
    pub fn builder(processor: Arc<dyn RecordProcessor>) -> ProcessorRuntimeBuilder {
        ProcessorRuntimeBuilder {
            processor,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    pub fn processor(&self) -> &Arc<dyn RecordProcessor> {
        &self.processor
    }

    pub async fn start(&self) -> Result<(), ConfigError> {
        self.processor.open().await?;
        info!(
            processor = self.processor.name(),
            max_in_flight = self.max_in_flight,
            "processor started"
        );
        Ok(())
    }

    pub async fn process(&self, input: Option<Record>) -> RoutedRecord {
        self.processor.on_record(input).await
    }

    /// Processes every input with at most `max_in_flight` invocations running
    /// at once.
    ///
    /// An invocation that panics is routed to `comms_failure` with its
    /// original record and `acs-transport-error` set.
    pub async fn process_all(&self, inputs: Vec<Option<Record>>) -> ChannelOutput {
        let permits = Arc::new(Semaphore::new(self.max_in_flight));
        let originals: Vec<Record> = inputs
            .iter()
            .map(|input| input.clone().unwrap_or_default())
            .collect();

        let mut tasks = JoinSet::new();
        for (index, input) in inputs.into_iter().enumerate() {
            let processor = Arc::clone(&self.processor);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                (index, processor.on_record(input).await)
            });
        }

        let mut routed: Vec<Option<RoutedRecord>> = vec![None; originals.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, record)) => routed[index] = Some(record),
                Err(join_error) => {
                    error!(
                        error = %join_error,
                        processor = self.processor.name(),
                        "processor task failed"
                    );
                }
            }
        }

        let mut output = ChannelOutput::default();
        for (slot, original) in routed.into_iter().zip(originals) {
            output.push(slot.unwrap_or_else(|| {
                RoutedRecord::new(
                    Outcome::CommunicationFailure,
                    original.with_attribute(ATTR_TRANSPORT_ERROR, TASK_FAILURE_MESSAGE),
                )
            }));
        }
        output
    }

    pub async fn stop(&self) {
        self.processor.close().await;
        info!(processor = self.processor.name(), "processor stopped");
    }
}

impl ProcessorRuntimeBuilder {
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    pub fn build(self) -> Result<ProcessorRuntime, ConfigError> {
        if self.max_in_flight == 0 || self.max_in_flight > Semaphore::MAX_PERMITS {
            return Err(ConfigError::InvalidConcurrency {
                max_in_flight: self.max_in_flight,
            });
        }

        Ok(ProcessorRuntime {
            processor: self.processor,
            max_in_flight: self.max_in_flight,
        })
    }
}
