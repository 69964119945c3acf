//! Outbound half of the host/surface channel.
//!
//! The surface cannot accept injected calls until it has posted `mapLoaded`.
//! Until then only the latest requested state of each call kind is kept;
//! intermediate states are never replayed.

use crate::protocol::{MapType, MarkerPayload, OutboundCall, SurfaceSink};

pub struct MarkerBridge<S> {
    sink: S,
    ready: bool,
    active: bool,
    pending_markers: Option<Vec<MarkerPayload>>,
    pending_map_type: Option<MapType>,
    pending_focus: Option<OutboundCall>,
}

impl<S: SurfaceSink> MarkerBridge<S> {
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            ready: false,
            active: true,
            pending_markers: None,
            pending_map_type: None,
            pending_focus: None,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending_markers.is_some()
            || self.pending_map_type.is_some()
            || self.pending_focus.is_some()
    }

    /// Replace the surface's marker set, or remember it until the surface is
    /// ready. Re-sending an identical set is harmless.
    pub fn push_markers(&mut self, markers: Vec<MarkerPayload>) {
        if !self.active {
            return;
        }
        if self.ready {
            tracing::debug!(count = markers.len(), "pushing markers to surface");
            self.sink.inject(&OutboundCall::AddMarkers(markers));
        } else {
            tracing::debug!(
                count = markers.len(),
                "surface not ready, holding marker update"
            );
            self.pending_markers = Some(markers);
        }
    }

    /// Send a non-marker call, holding the latest of each kind until ready.
    pub fn inject(&mut self, call: OutboundCall) {
        if !self.active {
            return;
        }
        if self.ready {
            tracing::debug!(call = call.name(), "injecting call into surface");
            self.sink.inject(&call);
            return;
        }
        match call {
            OutboundCall::AddMarkers(markers) => self.pending_markers = Some(markers),
            OutboundCall::ChangeMapType(map_type) => self.pending_map_type = Some(map_type),
            focus @ OutboundCall::FocusOnFacility { .. } => self.pending_focus = Some(focus),
        }
    }

    /// Record that the surface has loaded and flush anything held back.
    ///
    /// Returns `true` if a held marker set was delivered. A `false` return
    /// tells the caller the surface has no markers yet (first load with
    /// nothing pending, or a reload of the surface) and a fresh push is due.
    pub fn mark_ready(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.ready = true;

        if let Some(map_type) = self.pending_map_type.take() {
            self.sink.inject(&OutboundCall::ChangeMapType(map_type));
        }
        let flushed = match self.pending_markers.take() {
            Some(markers) => {
                tracing::debug!(count = markers.len(), "flushing held marker update");
                self.sink.inject(&OutboundCall::AddMarkers(markers));
                true
            }
            None => false,
        };
        if let Some(focus) = self.pending_focus.take() {
            self.sink.inject(&focus);
        }
        flushed
    }

    /// Stop talking to the surface. Pending state is discarded and every later
    /// call is a no-op.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.pending_markers = None;
        self.pending_map_type = None;
        self.pending_focus = None;
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
