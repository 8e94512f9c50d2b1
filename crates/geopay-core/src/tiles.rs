//! Web Mercator slippy-map tile math
//!
//! Converts coordinates to `{z}/{x}/{y}` tile addresses and expands tile URL
//! templates such as `https://tile.openstreetmap.org/{z}/{x}/{y}.png`.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::coord::Coordinate;

/// Latitude limit of the Web Mercator projection
pub const MAX_MERCATOR_LAT: f64 = 85.05112878;

/// Highest zoom level served by the standard OSM tile servers
pub const MAX_ZOOM: u8 = 19;

/// Edge length of one raster tile in pixels
pub const TILE_SIZE_PX: f64 = 256.0;

/// Address of one map tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

impl TileCoord {
    /// Substitute `{z}`, `{x}` and `{y}` in a tile URL template
    pub fn url(&self, template: &str) -> String {
        template
            .replace("{z}", &self.zoom.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
    }

    /// Geographic position of the tile's north-west corner
    pub fn north_west(&self) -> Coordinate {
        let n = tiles_per_axis(self.zoom);
        let lon = self.x as f64 / n * 360.0 - 180.0;
        let lat_rad = (PI * (1.0 - 2.0 * self.y as f64 / n)).sinh().atan();
        Coordinate::new(lat_rad.to_degrees(), lon)
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

fn tiles_per_axis(zoom: u8) -> f64 {
    2.0_f64.powi(i32::from(zoom))
}

/// Fractional Web Mercator position in tile units at `zoom`
///
/// Latitude is clamped to the projection limit so polar inputs stay finite.
pub fn project(coord: &Coordinate, zoom: u8) -> (f64, f64) {
    let n = tiles_per_axis(zoom);
    let lat = coord.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let x = (coord.lon + 180.0) / 360.0 * n;
    let y = (1.0 - lat.to_radians().tan().asinh() / PI) / 2.0 * n;
    (x, y)
}

/// Tile containing `coord` at `zoom`
pub fn tile_for(coord: &Coordinate, zoom: u8) -> TileCoord {
    let zoom = zoom.min(MAX_ZOOM);
    let max_index = (tiles_per_axis(zoom) as u32).saturating_sub(1);
    let (x, y) = project(coord, zoom);
    TileCoord {
        x: (x.floor().max(0.0) as u32).min(max_index),
        y: (y.floor().max(0.0) as u32).min(max_index),
        zoom,
    }
}

/// Tiles intersecting a `width_px` x `height_px` viewport, row by row
///
/// `focus` is the fractional tile position (as from `project`) under the
/// viewport center. Tiles outside the world are skipped, not wrapped.
pub fn covering(focus: (f64, f64), zoom: u8, width_px: f64, height_px: f64) -> Vec<TileCoord> {
    let zoom = zoom.min(MAX_ZOOM);
    let last = tiles_per_axis(zoom) as i64 - 1;
    let span = |center: f64, extent: f64| {
        let half = extent / 2.0 / TILE_SIZE_PX;
        let first = ((center - half).floor() as i64).max(0);
        let end = ((center + half).floor() as i64).min(last);
        first..=end
    };

    let mut tiles = Vec::new();
    for y in span(focus.1, height_px) {
        for x in span(focus.0, width_px) {
            tiles.push(TileCoord {
                x: x as u32,
                y: y as u32,
                zoom,
            });
        }
    }
    tiles
}
