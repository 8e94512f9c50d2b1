//! GeoPay web capture screen (egui/eframe on WASM)

pub mod app;
pub mod geolocation;
pub mod map_painter;

pub use app::GeoPayApp;
pub use geolocation::BrowserGeolocation;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    use wasm_bindgen::JsCast;

    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    let canvas = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("geopay_canvas"))
        .and_then(|el| el.dyn_into::<web_sys::HtmlCanvasElement>().ok());
    let Some(canvas) = canvas else {
        tracing::error!("canvas #geopay_canvas not found");
        return;
    };

    wasm_bindgen_futures::spawn_local(async move {
        let started = eframe::WebRunner::new()
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(|cc| Ok(Box::new(GeoPayApp::new(cc)))),
            )
            .await;
        if let Err(e) = started {
            tracing::error!(error = ?e, "failed to start eframe");
        }
    });
}
