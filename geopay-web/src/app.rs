//! GeoPay capture screen
//!
//! One screen: capture button, status region, supplier map, supplier cards.
//! Everything displayed is derived from the `LocationSource` state each frame.

use std::sync::Arc;

use geopay_core::{
    supplier_cards, AcquisitionState, LocationSource, MapView, MarkerKey, PointOfInterest,
    StatusRegion, StatusView, SupplierCard,
};

use crate::geolocation::BrowserGeolocation;
use crate::map_painter::{self, MapCamera};

const SUPPLIERS_JSON: &str = include_str!("../assets/suppliers.json");
const MAP_HEIGHT: f32 = 300.0;

const SUCCESS: egui::Color32 = egui::Color32::from_rgb(22, 163, 74);
const ERROR: egui::Color32 = egui::Color32::from_rgb(220, 38, 38);

pub struct GeoPayApp {
    source: Arc<LocationSource>,
    map: MapView,
    suppliers: Vec<PointOfInterest>,
    cards: Vec<SupplierCard>,
    camera: MapCamera,
    selected: Option<MarkerKey>,
}

impl GeoPayApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Tile URLs are handed to egui::Image; these loaders fetch and decode them
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let suppliers = load_suppliers();
        tracing::info!(suppliers = suppliers.len(), "GeoPay screen ready");
        Self {
            source: Arc::new(LocationSource::new(Arc::new(BrowserGeolocation))),
            map: MapView::default(),
            cards: supplier_cards(&suppliers),
            suppliers,
            camera: MapCamera::default(),
            selected: None,
        }
    }

    fn capture(&mut self, ctx: &egui::Context) {
        // New fix means a new view; surface pan/zoom starts over
        self.camera = MapCamera::default();
        self.selected = None;

        let source = self.source.clone();
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = source.request_location().await;
            tracing::debug!(?outcome, "location request finished");
            ctx.request_repaint();
        });
    }

    fn status_region(ui: &mut egui::Ui, region: &StatusRegion) {
        match region {
            StatusRegion::Error { message } => {
                ui.colored_label(ERROR, message);
            }
            StatusRegion::Success { headline, detail } => {
                ui.colored_label(SUCCESS, egui::RichText::new(headline).strong());
                ui.monospace(detail);
            }
        }
    }

    fn supplier_list(&mut self, ui: &mut egui::Ui) {
        ui.heading("Supplier hubs");
        if self.cards.is_empty() {
            ui.weak("No supplier hubs available");
            return;
        }
        for card in &self.cards {
            let key = MarkerKey::Poi(card.id.clone());
            let selected = self.selected.as_ref() == Some(&key);
            ui.group(|ui| {
                let title = ui.selectable_label(selected, egui::RichText::new(&card.title).strong());
                ui.weak(&card.subtitle);
                if title.clicked() {
                    self.selected = if selected { None } else { Some(key) };
                }
            });
        }
    }
}

impl eframe::App for GeoPayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let state = self.source.state();
        let view = StatusView::from_state(&state);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("GeoPay");
                ui.label("Capture your location to verify the delivery point.");
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    let button = ui.add_enabled(
                        view.button_enabled,
                        egui::Button::new(view.button_label).min_size(egui::vec2(200.0, 32.0)),
                    );
                    if view.loading {
                        ui.spinner();
                    }
                    if button.clicked() {
                        self.capture(ctx);
                    }
                });

                if let Some(region) = &view.region {
                    ui.add_space(6.0);
                    Self::status_region(ui, region);
                }

                if view.show_map {
                    ui.add_space(8.0);
                    let output = self.map.render(state.coordinate(), &self.suppliers);
                    let interaction = map_painter::paint(
                        ui,
                        &output,
                        &mut self.camera,
                        self.selected.as_ref(),
                        MAP_HEIGHT,
                    );
                    if let Some(key) = interaction.tapped {
                        self.selected = Some(key);
                    }
                }

                ui.add_space(12.0);
                self.supplier_list(ui);
            });
        });

        // Keep the spinner animating until the request settles
        if matches!(state, AcquisitionState::Pending) {
            ctx.request_repaint();
        }
    }
}

fn load_suppliers() -> Vec<PointOfInterest> {
    match serde_json::from_str::<Vec<PointOfInterest>>(SUPPLIERS_JSON) {
        Ok(suppliers) => suppliers,
        Err(e) => {
            tracing::error!(error = %e, "supplier list unreadable, showing none");
            Vec::new()
        }
    }
}
