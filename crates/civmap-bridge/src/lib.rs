//! Host-side core of the facility map screen.
//!
//! The map itself renders inside an isolated web surface. This crate keeps
//! that surface's markers in step with host state over an asynchronous
//! message channel, and owns the selection and detail-panel state machines
//! that react to what the user does on the map.

pub mod bridge;
pub mod debounce;
pub mod error;
pub mod lifecycle;
pub mod markers;
pub mod protocol;
pub mod screen;
pub mod selection;
pub mod sheet;

pub use bridge::MarkerBridge;
pub use debounce::Debouncer;
pub use error::BridgeError;
pub use lifecycle::Liveness;
pub use markers::{bucket, icon_size, visible_markers, FilterKey, FilterSet, MarkerConfig, MarkerQuery};
pub use protocol::{InboundMessage, MapType, MarkerPayload, OutboundCall, RecordingSink, SurfaceSink};
pub use screen::{HostAction, MapScreen, ScreenConfig, SheetState};
pub use selection::{Phase, SelectOutcome, Selection, Tab};
pub use sheet::{BottomSheet, Detent, EaseOutCubic, Easing, Linear, SheetConfig, SheetPhase};
