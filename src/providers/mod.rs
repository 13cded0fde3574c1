pub mod azure;
pub mod azure_translate;
