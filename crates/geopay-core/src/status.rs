//! Caller-facing view model for the capture screen
//!
//! A pure projection of `AcquisitionState`. Frontends read labels and flags
//! from here instead of matching on the state themselves.

use serde::{Deserialize, Serialize};

use crate::acquisition::AcquisitionState;
use crate::coord::PointOfInterest;

pub const CAPTURE_LABEL: &str = "Capture GPS Location";
pub const ACQUIRING_LABEL: &str = "Acquiring Location…";
pub const SUCCESS_HEADLINE: &str = "Location Captured Successfully!";

/// Content of the status region below the capture button
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusRegion {
    Error { message: String },
    Success { headline: String, detail: String },
}

/// Everything the capture screen shows for one state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    pub button_label: &'static str,
    pub button_enabled: bool,
    /// Spinner next to the button label
    pub loading: bool,
    pub region: Option<StatusRegion>,
    /// The map is only shown once a coordinate exists
    pub show_map: bool,
}

impl StatusView {
    pub fn from_state(state: &AcquisitionState) -> Self {
        let loading = state.is_pending();
        let region = match state {
            AcquisitionState::Idle | AcquisitionState::Pending => None,
            AcquisitionState::Failed { reason } => Some(StatusRegion::Error {
                message: reason.clone(),
            }),
            AcquisitionState::Succeeded { coordinate } => Some(StatusRegion::Success {
                headline: SUCCESS_HEADLINE.to_string(),
                detail: format!("Lat: {:.6}, Lon: {:.6}", coordinate.lat, coordinate.lon),
            }),
        };

        Self {
            button_label: if loading { ACQUIRING_LABEL } else { CAPTURE_LABEL },
            button_enabled: !loading,
            loading,
            show_map: state.coordinate().is_some(),
            region,
        }
    }
}

/// One card in the supplier list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierCard {
    pub id: String,
    pub title: String,
    pub subtitle: String,
}

impl SupplierCard {
    pub fn from_poi(poi: &PointOfInterest) -> Self {
        Self {
            id: poi.id.clone(),
            title: poi.name.clone(),
            subtitle: format!("Lat: {:.3}, Lon: {:.3}", poi.lat, poi.lon),
        }
    }
}

pub fn supplier_cards(pois: &[PointOfInterest]) -> Vec<SupplierCard> {
    pois.iter().map(SupplierCard::from_poi).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;

    #[test]
    fn test_idle_view() {
        let view = StatusView::from_state(&AcquisitionState::Idle);
        assert_eq!(view.button_label, CAPTURE_LABEL);
        assert!(view.button_enabled);
        assert!(!view.loading);
        assert_eq!(view.region, None);
        assert!(!view.show_map);
    }

    #[test]
    fn test_pending_disables_button() {
        let view = StatusView::from_state(&AcquisitionState::Pending);
        assert_eq!(view.button_label, ACQUIRING_LABEL);
        assert!(!view.button_enabled);
        assert!(view.loading);
        assert_eq!(view.region, None);
    }

    #[test]
    fn test_success_formats_six_decimals() {
        let view = StatusView::from_state(&AcquisitionState::Succeeded {
            coordinate: Coordinate::new(-1.286389, 36.817223),
        });
        assert_eq!(
            view.region,
            Some(StatusRegion::Success {
                headline: SUCCESS_HEADLINE.into(),
                detail: "Lat: -1.286389, Lon: 36.817223".into(),
            })
        );
        assert!(view.show_map);
        assert!(view.button_enabled);
    }

    #[test]
    fn test_failure_shows_reason() {
        let view = StatusView::from_state(&AcquisitionState::Failed {
            reason: "User denied Geolocation".into(),
        });
        assert_eq!(
            view.region,
            Some(StatusRegion::Error {
                message: "User denied Geolocation".into()
            })
        );
        assert!(!view.show_map);
    }

    #[test]
    fn test_supplier_card_three_decimals() {
        let cards = supplier_cards(&[PointOfInterest::new(
            "SUP001",
            "Supplier Hub A",
            -1.286389,
            36.817223,
        )]);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Supplier Hub A");
        assert_eq!(cards[0].subtitle, "Lat: -1.286, Lon: 36.817");
    }
}
