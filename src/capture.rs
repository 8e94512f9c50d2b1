//! Capture session - one screen's worth of state
//!
//! Wires a `LocationSource`, the `MapView` and the supplier list together the
//! way the capture screen uses them: press the button, wait for the fix, show
//! the status region and, on success, the map and proximity checks.

use std::sync::Arc;

use geopay_core::{
    supplier_cards, verify, AcquisitionState, LocationSource, MapView, PointOfInterest,
    PositionProvider, ProximityCheck, RequestOutcome, StatusView, SupplierCard, ViewOutput,
};
use serde::Serialize;

use crate::config::GeoPayConfig;

/// Snapshot of everything the screen shows after a request
#[derive(Debug, Clone, Serialize)]
pub struct CaptureReport {
    pub state: AcquisitionState,
    pub status: StatusView,
    /// Present only once a coordinate exists
    pub map: Option<ViewOutput>,
    pub proximity: Vec<ProximityCheck>,
}

/// State holder for one capture screen
pub struct CaptureSession {
    source: Arc<LocationSource>,
    map: MapView,
    suppliers: Vec<PointOfInterest>,
    radius_m: f64,
}

impl CaptureSession {
    pub fn new(config: &GeoPayConfig, provider: Arc<dyn PositionProvider>) -> Self {
        Self {
            source: Arc::new(LocationSource::with_options(
                provider,
                config.position_options(),
            )),
            map: MapView::new(config.map_settings()),
            suppliers: config.suppliers.clone(),
            radius_m: config.verification.radius_m,
        }
    }

    pub fn source(&self) -> &Arc<LocationSource> {
        &self.source
    }

    pub fn suppliers(&self) -> &[PointOfInterest] {
        &self.suppliers
    }

    pub fn supplier_cards(&self) -> Vec<SupplierCard> {
        supplier_cards(&self.suppliers)
    }

    /// Press the capture button and wait for the platform to answer
    pub async fn capture(&self) -> RequestOutcome {
        self.source.request_location().await
    }

    /// Map for the current state, or the fallback view when nothing is captured
    pub fn view(&self) -> ViewOutput {
        self.map
            .render(self.source.state().coordinate(), &self.suppliers)
    }

    pub fn report(&self) -> CaptureReport {
        let state = self.source.state();
        let status = StatusView::from_state(&state);
        let coordinate = state.coordinate();

        CaptureReport {
            map: status
                .show_map
                .then(|| self.map.render(coordinate, &self.suppliers)),
            proximity: coordinate
                .map(|c| verify(&c, &self.suppliers, self.radius_m))
                .unwrap_or_default(),
            status,
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{FixedPositionProvider, UnsupportedPlatform};
    use geopay_core::{Coordinate, PositionFailure, StatusRegion};

    fn config() -> GeoPayConfig {
        GeoPayConfig {
            suppliers: vec![
                PointOfInterest::new("SUP001", "Supplier Hub A", -1.286389, 36.817223),
                PointOfInterest::new("SUP002", "Supplier Hub B", -1.2922, 36.8220),
            ],
            ..GeoPayConfig::default()
        }
    }

    #[tokio::test]
    async fn test_idle_report_has_no_map() {
        let session = CaptureSession::new(
            &config(),
            Arc::new(FixedPositionProvider::new(Coordinate::new(0.0, 0.0))),
        );
        let report = session.report();
        assert_eq!(report.state, AcquisitionState::Idle);
        assert!(report.map.is_none());
        assert!(report.proximity.is_empty());
        // The fallback view is still available for a preview
        assert_eq!(session.view().markers.len(), 2);
    }

    #[tokio::test]
    async fn test_successful_capture_report() {
        let user = Coordinate::new(-1.2921, 36.8219);
        let session = CaptureSession::new(&config(), Arc::new(FixedPositionProvider::new(user)));

        session.capture().await;
        let report = session.report();

        let map = report.map.unwrap();
        assert_eq!(map.center, user);
        assert_eq!(map.markers.len(), 3);
        assert_eq!(report.proximity[0].poi_id, "SUP002");
        assert!(report.proximity[0].within_radius);
        assert!(!report.status.loading);
    }

    #[tokio::test]
    async fn test_failed_capture_report() {
        let session = CaptureSession::new(
            &config(),
            Arc::new(FixedPositionProvider::failing(PositionFailure::new(
                None,
                "User denied Geolocation",
            ))),
        );

        session.capture().await;
        let report = session.report();

        assert!(report.map.is_none());
        assert_eq!(
            report.status.region,
            Some(StatusRegion::Error {
                message: "User denied Geolocation".into()
            })
        );
    }

    #[tokio::test]
    async fn test_unsupported_capture() {
        let session = CaptureSession::new(&config(), Arc::new(UnsupportedPlatform));
        assert_eq!(session.capture().await, RequestOutcome::Unsupported);
        assert_eq!(session.supplier_cards().len(), 2);
    }
}
