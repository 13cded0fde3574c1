use async_trait::async_trait;

use crate::core::error::ConfigError;
use crate::core::types::{Record, RoutedRecord};

/// Record processor contract driven by whatever runtime hosts the component.
///
/// Lifecycle is explicit: `open` is called once before work is accepted,
/// `on_record` any number of times (possibly concurrently), and `close` once
/// when the host stops. Implementations hold no per-record state.
#[async_trait]
pub trait RecordProcessor: Send + Sync {
    /// Stable processor name for diagnostics.
    fn name(&self) -> &str;

    /// Acquires shared resources. Calling `open` on an open processor is a no-op.
    async fn open(&self) -> Result<(), ConfigError>;

    /// Processes zero or one input record and routes exactly one record.
    ///
    /// When no input is supplied a new empty record is created. Every path,
    /// including failures, resolves to a routed record.
    async fn on_record(&self, input: Option<Record>) -> RoutedRecord;

    /// Releases shared resources. In-flight calls finish on the handle they hold.
    async fn close(&self);
}

#[cfg(test)]
mod tests;
