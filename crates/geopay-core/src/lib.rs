//! GeoPay Core - location acquisition and supplier map
//!
//! WASM-safe library shared by the native host (`geopay` CLI) and the browser
//! UI (`geopay-web`). No runtime, no I/O: providers are injected.
//!
//! ```text
//!  ┌────────────────┐  request_location   ┌──────────────────┐
//!  │ capture button │ ──────────────────► │  LocationSource  │
//!  └────────────────┘                     │  (watch state)   │
//!          ▲                              └────────┬─────────┘
//!          │ StatusView                            │ PositionProvider
//!          │                                       ▼
//!  ┌───────┴────────┐   Succeeded(coord)  ┌──────────────────┐
//!  │    MapView     │ ◄────────────────── │ platform location│
//!  │  (pure render) │                     └──────────────────┘
//!  └────────────────┘
//! ```

pub mod acquisition;
pub mod coord;
pub mod map_view;
pub mod provider;
pub mod source;
pub mod status;
pub mod tiles;
pub mod verification;

pub use acquisition::{
    transition, AcquisitionEvent, AcquisitionState, TransitionError, TransitionResult,
    CANCELLED_MESSAGE, FALLBACK_FAILURE_MESSAGE, UNSUPPORTED_MESSAGE,
};
pub use coord::{haversine_m, Coordinate, PointOfInterest};
pub use map_view::{MapSettings, MapSettingsError, MapView, Marker, MarkerKey, ViewOutput};
pub use provider::{FailureKind, PositionFailure, PositionOptions, PositionProvider};
pub use source::{LocationSource, RequestOutcome};
pub use status::{supplier_cards, StatusRegion, StatusView, SupplierCard};
pub use tiles::{covering, tile_for, TileCoord};
pub use verification::{nearest_verified, verify, ProximityCheck};
