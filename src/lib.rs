pub mod config;
pub mod core;
pub mod expression;
pub mod providers;
pub mod runtime;
pub mod transport;

pub use config::{CharacterSet, InputSource, TranslatorConfig};
pub use core::error::{AdapterError, ConfigError};
pub use core::traits::RecordProcessor;
pub use core::types::*;
pub use providers::azure::AzureTranslateAdapter;
pub use runtime::{ChannelOutput, ProcessorRuntime, ProcessorRuntimeBuilder};

#[cfg(test)]
mod test_support;
