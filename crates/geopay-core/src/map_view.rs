//! MapView - pure map view model
//!
//! Given an optional user coordinate and the points of interest, produces the
//! `ViewOutput` handed to a rendering surface (egui painter in the browser,
//! JSON on the CLI). Rendering holds no state: equal inputs give equal output.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::{Coordinate, PointOfInterest};
use crate::tiles::{tile_for, TileCoord, MAX_ZOOM};

/// Center used when no user coordinate is known (Nairobi CBD)
pub const DEFAULT_FALLBACK_CENTER: Coordinate = Coordinate::new(-1.286389, 36.817223);

/// Initial zoom level of the map
pub const DEFAULT_ZOOM: u8 = 15;

pub const DEFAULT_TILE_URL_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

pub const DEFAULT_ATTRIBUTION: &str = "© OpenStreetMap contributors";

/// Popup text of the user's own marker
pub const USER_MARKER_LABEL: &str = "You are here";

/// Rejected map settings
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MapSettingsError {
    #[error("Zoom level {requested} exceeds maximum {max}")]
    ZoomOutOfRange { requested: u8, max: u8 },

    #[error("Tile URL template is missing the {0} placeholder")]
    MissingPlaceholder(&'static str),

    #[error("Fallback center {0} is not a valid coordinate")]
    InvalidFallbackCenter(Coordinate),
}

/// Static configuration of the map surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSettings {
    pub fallback_center: Coordinate,
    pub zoom: u8,
    pub tile_url_template: String,
    pub attribution: String,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            fallback_center: DEFAULT_FALLBACK_CENTER,
            zoom: DEFAULT_ZOOM,
            tile_url_template: DEFAULT_TILE_URL_TEMPLATE.to_string(),
            attribution: DEFAULT_ATTRIBUTION.to_string(),
        }
    }
}

impl MapSettings {
    pub fn validate(&self) -> Result<(), MapSettingsError> {
        if self.zoom > MAX_ZOOM {
            return Err(MapSettingsError::ZoomOutOfRange {
                requested: self.zoom,
                max: MAX_ZOOM,
            });
        }
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !self.tile_url_template.contains(placeholder) {
                return Err(MapSettingsError::MissingPlaceholder(placeholder));
            }
        }
        if !self.fallback_center.is_valid() {
            return Err(MapSettingsError::InvalidFallbackCenter(
                self.fallback_center,
            ));
        }
        Ok(())
    }
}

/// Stable identity of a marker across renders
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MarkerKey {
    User,
    Poi(String),
}

/// One marker placement handed to the rendering surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub key: MarkerKey,
    pub position: Coordinate,
    /// Text shown when the marker is tapped or hovered
    pub popup: String,
}

impl Marker {
    pub fn is_user(&self) -> bool {
        self.key == MarkerKey::User
    }
}

/// Interaction controls delegated to the rendering surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewControls {
    pub zoom_control: bool,
    pub scroll_wheel_zoom: bool,
}

/// Everything a rendering surface needs to draw the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewOutput {
    pub center: Coordinate,
    pub zoom: u8,
    pub attribution: String,
    pub tile_url_template: String,
    pub controls: ViewControls,
    /// User marker first (when present), then points of interest in input order
    pub markers: Vec<Marker>,
}

impl ViewOutput {
    /// Tile under the view center at the initial zoom
    pub fn center_tile(&self) -> TileCoord {
        tile_for(&self.center, self.zoom)
    }

    pub fn center_tile_url(&self) -> String {
        self.center_tile().url(&self.tile_url_template)
    }

    pub fn marker(&self, key: &MarkerKey) -> Option<&Marker> {
        self.markers.iter().find(|m| &m.key == key)
    }

    pub fn user_marker(&self) -> Option<&Marker> {
        self.marker(&MarkerKey::User)
    }
}

/// Stateless map renderer
#[derive(Debug, Clone, Default)]
pub struct MapView {
    settings: MapSettings,
}

impl MapView {
    pub fn new(settings: MapSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    /// Build the view for the given inputs
    pub fn render(
        &self,
        user_location: Option<Coordinate>,
        points_of_interest: &[PointOfInterest],
    ) -> ViewOutput {
        let center = user_location.unwrap_or(self.settings.fallback_center);

        let mut markers = Vec::with_capacity(points_of_interest.len() + 1);
        if let Some(user) = user_location {
            markers.push(Marker {
                key: MarkerKey::User,
                position: user,
                popup: USER_MARKER_LABEL.to_string(),
            });
        }
        markers.extend(points_of_interest.iter().map(|poi| Marker {
            key: MarkerKey::Poi(poi.id.clone()),
            position: poi.coordinate(),
            popup: poi.name.clone(),
        }));

        ViewOutput {
            center,
            zoom: self.settings.zoom,
            attribution: self.settings.attribution.clone(),
            tile_url_template: self.settings.tile_url_template.clone(),
            controls: ViewControls {
                zoom_control: true,
                scroll_wheel_zoom: true,
            },
            markers,
        }
    }
}
