//! Error types for the GeoPay host
//!
//! Location failures are not errors here: they end up in
//! `AcquisitionState::Failed`. These cover configuration and start-up only.

use geopay_core::MapSettingsError;
use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidOverride { key: &'static str, value: String },

    #[error("Invalid map settings: {0}")]
    Map(#[from] MapSettingsError),

    #[error("Duplicate supplier id: {0}")]
    DuplicateSupplier(String),

    #[error("Supplier {id} has an invalid coordinate ({lat}, {lon})")]
    InvalidSupplierCoordinate { id: String, lat: f64, lon: f64 },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
