//! GeoPay configuration
//!
//! Loads map, location and verification settings plus the supplier list from
//! YAML, then applies environment overrides. Every field has a default, so an
//! empty document is a valid (supplier-less) configuration.
//!
//! ```yaml
//! map:
//!   fallback_center: { lat: -1.286389, lon: 36.817223 }
//!   zoom: 15
//! location:
//!   timeout_ms: 10000
//! verification:
//!   radius_m: 20.0
//! suppliers:
//!   - { id: SUP001, name: Supplier Hub A, lat: -1.286389, lon: 36.817223 }
//! ```

use std::collections::HashSet;
use std::path::Path;

use geopay_core::map_view::{
    DEFAULT_ATTRIBUTION, DEFAULT_FALLBACK_CENTER, DEFAULT_TILE_URL_TEMPLATE, DEFAULT_ZOOM,
};
use geopay_core::verification::DEFAULT_RADIUS_M;
use geopay_core::{Coordinate, MapSettings, PointOfInterest, PositionOptions};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default configuration path
pub const DEFAULT_CONFIG_PATH: &str = "config/geopay.yaml";

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "GEOPAY_CONFIG";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPayConfig {
    #[serde(default)]
    pub map: MapSection,
    #[serde(default)]
    pub location: LocationSection,
    #[serde(default)]
    pub verification: VerificationSection,
    /// Supplier hubs shown on the map; injected, never hard-coded
    #[serde(default)]
    pub suppliers: Vec<PointOfInterest>,
}

/// Map surface settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSection {
    #[serde(default = "default_fallback_center")]
    pub fallback_center: Coordinate,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    #[serde(default = "default_tile_url_template")]
    pub tile_url_template: String,
    #[serde(default = "default_attribution")]
    pub attribution: String,
}

fn default_fallback_center() -> Coordinate {
    DEFAULT_FALLBACK_CENTER
}

fn default_zoom() -> u8 {
    DEFAULT_ZOOM
}

fn default_tile_url_template() -> String {
    DEFAULT_TILE_URL_TEMPLATE.to_string()
}

fn default_attribution() -> String {
    DEFAULT_ATTRIBUTION.to_string()
}

impl Default for MapSection {
    fn default() -> Self {
        Self {
            fallback_center: default_fallback_center(),
            zoom: default_zoom(),
            tile_url_template: default_tile_url_template(),
            attribution: default_attribution(),
        }
    }
}

/// Options for the platform position request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSection {
    #[serde(default = "default_true")]
    pub enable_high_accuracy: bool,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u32,
    #[serde(default)]
    pub maximum_age_ms: u32,
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u32 {
    10_000
}

impl Default for LocationSection {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: default_timeout_ms(),
            maximum_age_ms: 0,
        }
    }
}

/// On-site proximity check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationSection {
    #[serde(default = "default_radius_m")]
    pub radius_m: f64,
}

fn default_radius_m() -> f64 {
    DEFAULT_RADIUS_M
}

impl Default for VerificationSection {
    fn default() -> Self {
        Self {
            radius_m: default_radius_m(),
        }
    }
}

impl GeoPayConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: GeoPayConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Resolve the config path from `GEOPAY_CONFIG`, load it, apply env overrides
    /// and validate. A missing default file yields the built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                tracing::info!(path = %path, "Loading configuration");
                Self::from_file(&path)?
            }
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                tracing::info!(path = DEFAULT_CONFIG_PATH, "Loading configuration");
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => {
                tracing::info!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `GEOPAY_*` overrides using the given lookup (env in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("GEOPAY_ZOOM") {
            self.map.zoom = parse_override("GEOPAY_ZOOM", &value)?;
        }
        if let Some(value) = lookup("GEOPAY_TILE_URL") {
            self.map.tile_url_template = value;
        }
        if let Some(value) = lookup("GEOPAY_VERIFY_RADIUS_M") {
            self.verification.radius_m = parse_override("GEOPAY_VERIFY_RADIUS_M", &value)?;
        }
        Ok(())
    }

    /// Reject settings the flow cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.map_settings().validate()?;

        if self.location.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "location.timeout_ms must be greater than zero".into(),
            ));
        }
        if !(self.verification.radius_m.is_finite() && self.verification.radius_m > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "verification.radius_m must be positive, got {}",
                self.verification.radius_m
            )));
        }

        let mut seen = HashSet::new();
        for supplier in &self.suppliers {
            if !seen.insert(supplier.id.as_str()) {
                return Err(ConfigError::DuplicateSupplier(supplier.id.clone()));
            }
            if !supplier.coordinate().is_valid() {
                return Err(ConfigError::InvalidSupplierCoordinate {
                    id: supplier.id.clone(),
                    lat: supplier.lat,
                    lon: supplier.lon,
                });
            }
        }

        tracing::debug!(
            suppliers = self.suppliers.len(),
            zoom = self.map.zoom,
            radius_m = self.verification.radius_m,
            "Configuration validated"
        );
        Ok(())
    }

    pub fn map_settings(&self) -> MapSettings {
        MapSettings {
            fallback_center: self.map.fallback_center,
            zoom: self.map.zoom,
            tile_url_template: self.map.tile_url_template.clone(),
            attribution: self.map.attribution.clone(),
        }
    }

    pub fn position_options(&self) -> PositionOptions {
        PositionOptions {
            enable_high_accuracy: self.location.enable_high_accuracy,
            timeout_ms: self.location.timeout_ms,
            maximum_age_ms: self.location.maximum_age_ms,
        }
    }
}

fn parse_override<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidOverride {
        key,
        value: value.to_string(),
    })
}
