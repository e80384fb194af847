pub mod config_service;
pub mod ingestion_service;
pub mod traits;
