//! Browser Geolocation API provider
//!
//! Wraps `navigator.geolocation.getCurrentPosition` in a single-resolution
//! future. The success and error callbacks share one `Settle` handle; the
//! first to fire takes the sender, so the future resolves exactly once.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use geopay_core::{Coordinate, PositionFailure, PositionOptions, PositionProvider};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

type Answer = Result<Coordinate, PositionFailure>;

/// `navigator.geolocation` of the current window
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserGeolocation;

#[async_trait]
impl PositionProvider for BrowserGeolocation {
    fn is_supported(&self) -> bool {
        web_sys::window()
            .map(|window| {
                js_sys::Reflect::has(&window.navigator(), &JsValue::from_str("geolocation"))
                    .unwrap_or(false)
            })
            .unwrap_or(false)
    }

    async fn current_position(&self, options: &PositionOptions) -> Answer {
        // JS handles are created and released inside start_request so the
        // future only holds the receiver across the await
        let rx = start_request(options)?;
        rx.await
            .unwrap_or_else(|_| Err(PositionFailure::silent(None)))
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}

/// Sender half shared by competing callbacks; only the first value gets through
struct Settle<T>(Rc<RefCell<Option<oneshot::Sender<T>>>>);

impl<T> Clone for Settle<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Settle<T> {
    fn channel() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        (Self(Rc::new(RefCell::new(Some(tx)))), rx)
    }

    /// Deliver `value` unless something already did; true if it was delivered
    fn settle(&self, value: T) -> bool {
        match self.0.borrow_mut().take() {
            Some(tx) => tx.send(value).is_ok(),
            None => false,
        }
    }
}

/// `PositionOptions` dictionary for `getCurrentPosition`
fn js_options(options: &PositionOptions) -> web_sys::PositionOptions {
    let js = web_sys::PositionOptions::new();
    js.set_enable_high_accuracy(options.enable_high_accuracy);
    js.set_timeout(options.timeout_ms);
    js.set_maximum_age(options.maximum_age_ms);
    js
}

fn start_request(options: &PositionOptions) -> Result<oneshot::Receiver<Answer>, PositionFailure> {
    let window = web_sys::window().ok_or_else(|| PositionFailure::silent(None))?;
    let geolocation = window.navigator().geolocation().map_err(js_failure)?;

    let (settle, rx) = Settle::<Answer>::channel();

    let on_success = {
        let settle = settle.clone();
        Closure::once_into_js(move |position: web_sys::GeolocationPosition| {
            let coords = position.coords();
            settle.settle(Ok(Coordinate::new(coords.latitude(), coords.longitude())));
        })
    };

    let on_error = Closure::once_into_js(move |error: web_sys::GeolocationPositionError| {
        settle.settle(Err(PositionFailure::from_platform(error.code(), error.message())));
    });

    geolocation
        .get_current_position_with_error_callback_and_options(
            on_success.unchecked_ref(),
            Some(on_error.unchecked_ref()),
            &js_options(options),
        )
        .map_err(js_failure)?;

    tracing::debug!(timeout_ms = options.timeout_ms, "getCurrentPosition issued");
    Ok(rx)
}

fn js_failure(err: JsValue) -> PositionFailure {
    PositionFailure {
        kind: None,
        message: err.as_string(),
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn field(obj: &JsValue, key: &str) -> JsValue {
        js_sys::Reflect::get(obj, &JsValue::from_str(key)).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_default_options_reach_platform_dictionary() {
        let js: JsValue = js_options(&PositionOptions::default()).into();
        assert_eq!(field(&js, "enableHighAccuracy").as_bool(), Some(true));
        assert_eq!(field(&js, "timeout").as_f64(), Some(10_000.0));
        assert_eq!(field(&js, "maximumAge").as_f64(), Some(0.0));
    }

    #[wasm_bindgen_test]
    fn test_configured_options_are_copied() {
        let options = PositionOptions {
            enable_high_accuracy: false,
            timeout_ms: 2_500,
            maximum_age_ms: 60_000,
        };
        let js: JsValue = js_options(&options).into();
        assert_eq!(field(&js, "enableHighAccuracy").as_bool(), Some(false));
        assert_eq!(field(&js, "timeout").as_f64(), Some(2_500.0));
        assert_eq!(field(&js, "maximumAge").as_f64(), Some(60_000.0));
    }

    #[wasm_bindgen_test]
    async fn test_first_callback_wins() {
        let (settle, rx) = Settle::<Answer>::channel();
        let other = settle.clone();

        assert!(settle.settle(Err(PositionFailure::from_platform(3, "Timeout expired"))));
        assert!(!other.settle(Ok(Coordinate::new(1.0, 2.0))));

        let answer = rx.await.unwrap();
        assert_eq!(answer.unwrap_err().message(), Some("Timeout expired"));
    }

    #[wasm_bindgen_test]
    async fn test_dropped_callbacks_resolve_silently() {
        let (settle, rx) = Settle::<Answer>::channel();
        drop(settle);
        let answer = rx.await.unwrap_or_else(|_| Err(PositionFailure::silent(None)));
        assert_eq!(answer, Err(PositionFailure::silent(None)));
    }
}
