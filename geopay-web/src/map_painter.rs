//! Map rendering surface
//!
//! Paints a `ViewOutput` with egui: raster tiles from the view's URL
//! template, one pin per marker, popups on hover or tap. Tiles are fetched
//! and cached by the egui_extras image loaders installed at start-up. Pan and
//! zoom live here, on the surface; the view model itself never changes in
//! response to them.

use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, UiBuilder, Vec2};
use geopay_core::tiles::{covering, project, MAX_ZOOM, TILE_SIZE_PX};
use geopay_core::{Coordinate, Marker, MarkerKey, ViewOutput};

const TILE_SIZE: f32 = TILE_SIZE_PX as f32;
const PIN_RADIUS: f32 = 7.0;
const HIT_RADIUS: f32 = 12.0;

const USER_PIN: Color32 = Color32::from_rgb(37, 99, 235);
const POI_PIN: Color32 = Color32::from_rgb(220, 38, 38);

/// Pan/zoom owned by the surface
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MapCamera {
    /// Screen-space offset from the view center
    pub pan: Vec2,
    /// Zoom steps relative to the view's initial zoom
    pub zoom_delta: i8,
}

impl MapCamera {
    fn zoom(&self, base: u8) -> u8 {
        (i16::from(base) + i16::from(self.zoom_delta)).clamp(0, i16::from(MAX_ZOOM)) as u8
    }
}

/// Result of one paint pass
#[derive(Debug, Default)]
pub struct MapInteraction {
    /// Marker tapped this frame
    pub tapped: Option<MarkerKey>,
}

/// Draw the map and handle surface interactions
pub fn paint(
    ui: &mut Ui,
    view: &ViewOutput,
    camera: &mut MapCamera,
    selected: Option<&MarkerKey>,
    height: f32,
) -> MapInteraction {
    let size = Vec2::new(ui.available_width(), height);
    let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
    let rect = response.rect;

    // Surface interactions: drag to pan, wheel or +/- buttons to zoom
    if response.dragged() {
        camera.pan += response.drag_delta();
    }
    if view.controls.scroll_wheel_zoom && response.hovered() {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll > 0.0 {
            camera.zoom_delta = camera.zoom_delta.saturating_add(1);
        } else if scroll < 0.0 {
            camera.zoom_delta = camera.zoom_delta.saturating_sub(1);
        }
    }

    let zoom = camera.zoom(view.zoom);
    let (cx, cy) = project(&view.center, zoom);
    let origin = rect.center() + camera.pan;

    let to_screen = |coord: &Coordinate| -> Pos2 {
        let (x, y) = project(coord, zoom);
        origin + Vec2::new(((x - cx) as f32) * TILE_SIZE, ((y - cy) as f32) * TILE_SIZE)
    };

    // Tile-space point under the middle of the surface
    let focus = (
        cx - f64::from(camera.pan.x / TILE_SIZE),
        cy - f64::from(camera.pan.y / TILE_SIZE),
    );
    paint_tiles(ui, rect, view, zoom, focus, &to_screen);

    let pointer = response.hover_pos();
    let mut interaction = MapInteraction::default();

    // POIs first so the user pin is drawn on top
    let mut ordered: Vec<&Marker> = view.markers.iter().collect();
    ordered.sort_by_key(|m| m.is_user());

    for marker in ordered {
        let pos = to_screen(&marker.position);
        if !rect.expand(PIN_RADIUS).contains(pos) {
            continue;
        }

        let color = if marker.is_user() { USER_PIN } else { POI_PIN };
        painter.circle_filled(pos, PIN_RADIUS, color);
        painter.circle_stroke(pos, PIN_RADIUS, Stroke::new(2.0, Color32::WHITE));

        let hovered = pointer.is_some_and(|p| p.distance(pos) <= HIT_RADIUS);
        if hovered && response.clicked() {
            interaction.tapped = Some(marker.key.clone());
        }
        if hovered || selected == Some(&marker.key) {
            painter.text(
                pos - Vec2::new(0.0, PIN_RADIUS + 4.0),
                Align2::CENTER_BOTTOM,
                &marker.popup,
                FontId::proportional(13.0),
                Color32::WHITE,
            );
        }
    }

    painter.text(
        rect.right_bottom() - Vec2::new(6.0, 4.0),
        Align2::RIGHT_BOTTOM,
        &view.attribution,
        FontId::proportional(10.0),
        Color32::GRAY,
    );

    if view.controls.zoom_control {
        ui.horizontal(|ui| {
            if ui.small_button("+").clicked() {
                camera.zoom_delta = camera.zoom_delta.saturating_add(1);
            }
            if ui.small_button("−").clicked() {
                camera.zoom_delta = camera.zoom_delta.saturating_sub(1);
            }
            if ui.small_button("Recenter").clicked() {
                *camera = MapCamera::default();
            }
            ui.label(
                egui::RichText::new(format!("z{zoom}"))
                    .small()
                    .weak(),
            );
        });
    }

    interaction
}

/// Draw every tile that intersects `rect`, placed by its north-west corner
fn paint_tiles(
    ui: &Ui,
    rect: Rect,
    view: &ViewOutput,
    zoom: u8,
    focus: (f64, f64),
    to_screen: &impl Fn(&Coordinate) -> Pos2,
) {
    let mut tiles_ui = ui.new_child(UiBuilder::new().max_rect(rect));
    tiles_ui.set_clip_rect(rect);

    let (width, height) = (f64::from(rect.width()), f64::from(rect.height()));
    for tile in covering(focus, zoom, width, height) {
        // Half a pixel of overlap hides seams from float rounding
        let tile_rect = Rect::from_min_size(to_screen(&tile.north_west()), Vec2::splat(TILE_SIZE))
            .expand(0.5);
        egui::Image::new(tile.url(&view.tile_url_template)).paint_at(&tiles_ui, tile_rect);
    }
}
