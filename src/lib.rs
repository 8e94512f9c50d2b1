//! GeoPay - native host for the location capture flow
//!
//! The acquisition state machine, map view model and proximity checks live in
//! `geopay-core` (shared with the browser build). This crate adds what a
//! native process needs around them: YAML/env configuration, logging, native
//! position providers and a capture session used by the `geopay` CLI.

pub mod capture;
pub mod config;
pub mod error;
pub mod providers;
pub mod telemetry;

pub use capture::{CaptureReport, CaptureSession};
pub use config::GeoPayConfig;
pub use error::ConfigError;
pub use providers::{FixedPositionProvider, UnsupportedPlatform};

// Re-export the core so binaries and tests need a single dependency
pub use geopay_core;
