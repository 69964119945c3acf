//! Host-side controller for the facility map screen.
//!
//! Owns the facility data, filters, search, zoom mirror, selection state
//! machine, detail panel, and the outbound bridge, and keeps the surface's
//! markers consistent with all of them. Every entry point runs on the UI
//! event loop; inbound surface messages are resolved against the live state
//! at the moment they are handled.

use std::time::{Duration, Instant};

use civmap_core::{AppConfig, Coordinates, Facility, FacilityId, FacilitySet};
use tokio::sync::mpsc;

use crate::bridge::MarkerBridge;
use crate::debounce::Debouncer;
use crate::lifecycle::Liveness;
use crate::markers::{matches_keyword, visible_markers, FilterKey, FilterSet, MarkerConfig, MarkerQuery};
use crate::protocol::{InboundMessage, MapType, OutboundCall, SurfaceSink};
use crate::selection::{Phase, SelectOutcome, Selection, Tab};
use crate::sheet::{BottomSheet, Detent, EaseOutCubic, Easing, SheetConfig};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenConfig {
    pub markers: MarkerConfig,
    pub sheet: SheetConfig,
    /// Zoom assumed until the surface reports one.
    pub initial_zoom: u8,
    pub search_debounce: Duration,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            markers: MarkerConfig::default(),
            sheet: SheetConfig::default(),
            initial_zoom: 13,
            search_debounce: Duration::from_millis(300),
        }
    }
}

impl From<&AppConfig> for ScreenConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            markers: MarkerConfig::from(config),
            sheet: SheetConfig::from(config),
            initial_zoom: config.initial_zoom,
            search_debounce: Duration::from_millis(config.search_debounce_ms),
        }
    }
}

/// Something the UI layer around the map has to act on.
#[derive(Debug, Clone, PartialEq)]
pub enum HostAction {
    /// Open the review composer for a facility.
    OpenReviewComposer(FacilityId),
    /// Writing a review needs a signed-in user; route to sign-in.
    SignInRequired(FacilityId),
    /// The user tapped empty map space.
    MapTapped(Coordinates),
}

/// Snapshot of the detail panel for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetState {
    pub visible: bool,
    pub expanded: bool,
    pub active_tab: Tab,
    pub height: f32,
}

pub struct MapScreen<S, E = EaseOutCubic> {
    config: ScreenConfig,
    facilities: FacilitySet,
    filters: FilterSet,
    keyword: String,
    search_results: Vec<FacilityId>,
    zoom: u8,
    selection: Selection,
    sheet: BottomSheet<E>,
    bridge: MarkerBridge<S>,
    liveness: Liveness,
    search: Option<Debouncer<String>>,
    authenticated: bool,
}

impl<S: SurfaceSink> MapScreen<S, EaseOutCubic> {
    #[must_use]
    pub fn new(sink: S, config: ScreenConfig, authenticated: bool) -> Self {
        Self::with_easing(sink, config, authenticated, EaseOutCubic)
    }
}

impl<S: SurfaceSink, E: Easing> MapScreen<S, E> {
    #[must_use]
    pub fn with_easing(sink: S, config: ScreenConfig, authenticated: bool, easing: E) -> Self {
        Self {
            zoom: config.initial_zoom,
            sheet: BottomSheet::with_easing(config.sheet, easing),
            config,
            facilities: FacilitySet::default(),
            filters: FilterSet::default(),
            keyword: String::new(),
            search_results: Vec::new(),
            selection: Selection::new(),
            bridge: MarkerBridge::new(sink),
            liveness: Liveness::new(),
            search: None,
            authenticated,
        }
    }

    /// Route search input through a debouncer. Debounced keywords arrive on
    /// the returned receiver and must be fed back into
    /// [`MapScreen::apply_search`] by the owning event loop.
    ///
    /// Must be called inside a tokio runtime.
    pub fn debounce_search(&mut self) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.search = Some(Debouncer::new(
            self.config.search_debounce,
            tx,
            self.liveness.clone(),
        ));
        rx
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn facilities(&self) -> &FacilitySet {
        &self.facilities
    }

    #[must_use]
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Facilities matching the current search, in source order.
    #[must_use]
    pub fn search_results(&self) -> Vec<&Facility> {
        self.search_results
            .iter()
            .filter_map(|id| self.facilities.get(*id))
            .collect()
    }

    #[must_use]
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn selected_facility(&self) -> Option<&Facility> {
        self.selection
            .selected()
            .and_then(|id| self.facilities.get(id))
    }

    #[must_use]
    pub fn sheet(&self) -> &BottomSheet<E> {
        &self.sheet
    }

    #[must_use]
    pub fn sheet_state(&self) -> SheetState {
        SheetState {
            visible: self.selection.is_panel_visible(),
            expanded: self.selection.phase() == Phase::Expanded,
            active_tab: self.selection.active_tab(),
            height: self.sheet.height(),
        }
    }

    #[must_use]
    pub fn bridge(&self) -> &MarkerBridge<S> {
        &self.bridge
    }

    #[must_use]
    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        !self.liveness.is_alive()
    }

    // -----------------------------------------------------------------------
    // Surface messages
    // -----------------------------------------------------------------------

    /// Handle one raw message posted by the surface.
    ///
    /// Malformed messages are logged and dropped. Unknown facility ids are
    /// ignored; they are usually stale taps from before a reload.
    pub fn handle_surface_message(&mut self, raw: &str, now: Instant) -> Option<HostAction> {
        if self.is_disposed() {
            return None;
        }
        let message = match InboundMessage::decode(raw) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed surface message");
                return None;
            }
        };
        self.handle_message(message, now)
    }

    /// Handle an already decoded surface message.
    pub fn handle_message(&mut self, message: InboundMessage, now: Instant) -> Option<HostAction> {
        if self.is_disposed() {
            return None;
        }
        match message {
            InboundMessage::MapLoaded => {
                tracing::info!("map surface loaded");
                if !self.bridge.mark_ready() {
                    self.sync_markers();
                }
                None
            }
            InboundMessage::ViewFacility { facility_id } => {
                self.select(facility_id, None, now);
                None
            }
            InboundMessage::ViewReviews { facility_id } => {
                self.select(facility_id, Some(Tab::Reviews), now);
                None
            }
            InboundMessage::ReviewFacility { facility_id } => {
                if !self.facilities.contains(facility_id) {
                    tracing::debug!(%facility_id, "review requested for unknown facility");
                    return None;
                }
                if self.authenticated {
                    Some(HostAction::OpenReviewComposer(facility_id))
                } else {
                    Some(HostAction::SignInRequired(facility_id))
                }
            }
            InboundMessage::MapClick { coordinates } => Some(HostAction::MapTapped(coordinates)),
            InboundMessage::ZoomChanged { zoom } => {
                let zoom = self.config.markers.clamp_zoom(zoom);
                if zoom != self.zoom {
                    tracing::debug!(zoom, "surface zoom changed");
                    self.zoom = zoom;
                    self.sync_markers();
                }
                None
            }
            InboundMessage::FocusRequest { coordinates, zoom } => {
                let zoom = zoom.map_or(self.zoom, |z| self.config.markers.clamp_zoom(z));
                self.bridge.inject(OutboundCall::FocusOnFacility {
                    lat: coordinates.latitude,
                    lng: coordinates.longitude,
                    zoom,
                });
                None
            }
            InboundMessage::Unknown(tag) => {
                tracing::debug!(tag = %tag, "ignoring unknown surface message");
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Data, filters, search
    // -----------------------------------------------------------------------

    /// Replace the facility set with a provider result. A failed load leaves
    /// the map empty rather than stale.
    pub fn load_facilities<LoadErr>(&mut self, result: Result<Vec<Facility>, LoadErr>)
    where
        LoadErr: std::fmt::Display,
    {
        if self.is_disposed() {
            return;
        }
        let facilities = match result {
            Ok(facilities) => facilities,
            Err(e) => {
                tracing::warn!(error = %e, "facility load failed, showing empty map");
                Vec::new()
            }
        };
        self.facilities = FacilitySet::new(facilities);
        tracing::info!(count = self.facilities.len(), "facilities loaded");

        if self.selection.retain(&self.facilities) {
            self.sheet.hide();
        }
        self.refresh_search_results();
        self.sync_markers();
    }

    /// Flip a filter chip and re-push markers.
    pub fn toggle_filter(&mut self, key: FilterKey) -> bool {
        if self.is_disposed() {
            return self.filters.is_enabled(key);
        }
        let enabled = self.filters.toggle(key);
        tracing::debug!(filter = key.as_str(), enabled, "filter toggled");
        self.sync_markers();
        enabled
    }

    /// Search input changed. Debounced when [`MapScreen::debounce_search`]
    /// was set up, applied immediately otherwise.
    pub fn set_search_keyword(&mut self, keyword: impl Into<String>) {
        if self.is_disposed() {
            return;
        }
        let keyword = keyword.into();
        match self.search.as_mut() {
            Some(debouncer) => debouncer.submit(keyword),
            None => self.apply_search(keyword),
        }
    }

    /// Recompute search results for `keyword` and re-push markers.
    pub fn apply_search(&mut self, keyword: impl Into<String>) {
        if self.is_disposed() {
            return;
        }
        self.keyword = keyword.into();
        self.refresh_search_results();
        tracing::debug!(
            keyword = %self.keyword,
            results = self.search_results.len(),
            "search applied"
        );
        self.sync_markers();
    }

    fn refresh_search_results(&mut self) {
        self.search_results = if self.keyword.trim().is_empty() {
            Vec::new()
        } else {
            self.facilities
                .iter()
                .filter(|f| matches_keyword(f, &self.keyword))
                .map(|f| f.id)
                .collect()
        };
    }

    pub fn set_map_type(&mut self, map_type: MapType) {
        if self.is_disposed() {
            return;
        }
        self.bridge.inject(OutboundCall::ChangeMapType(map_type));
    }

    // -----------------------------------------------------------------------
    // Selection and detail panel
    // -----------------------------------------------------------------------

    /// Select a facility by id. Returns `false` if the id is unknown.
    pub fn select(&mut self, facility_id: FacilityId, tab: Option<Tab>, now: Instant) -> bool {
        if self.is_disposed() {
            return false;
        }
        if !self.facilities.contains(facility_id) {
            tracing::debug!(%facility_id, "ignoring selection of unknown facility");
            return false;
        }

        let outcome = self.selection.select(facility_id, tab);
        match outcome {
            SelectOutcome::Entered => self.sheet.show(),
            SelectOutcome::Switched { .. } => {
                self.sheet.reset_scroll();
                if !self.sheet.collapse(now) {
                    self.sheet.show();
                }
            }
            SelectOutcome::Unchanged => {}
        }
        if outcome.changed() {
            self.sync_markers();
        }
        true
    }

    /// Tap on a search result: select it and center the map on it.
    pub fn select_search_result(&mut self, facility_id: FacilityId, now: Instant) -> bool {
        if !self.select(facility_id, None, now) {
            return false;
        }
        if let Some(facility) = self.facilities.get(facility_id) {
            let call = OutboundCall::FocusOnFacility {
                lat: facility.coordinates.latitude,
                lng: facility.coordinates.longitude,
                zoom: self.config.markers.focus_zoom,
            };
            self.bridge.inject(call);
        }
        true
    }

    /// Close button or explicit close request.
    pub fn close_panel(&mut self) {
        if self.is_disposed() {
            return;
        }
        if let Some(previous) = self.selection.dismiss() {
            tracing::debug!(facility_id = %previous, "detail panel dismissed");
            self.sheet.hide();
            self.sync_markers();
        }
    }

    pub fn set_tab(&mut self, tab: Tab) -> bool {
        if self.is_disposed() {
            return false;
        }
        self.selection.set_tab(tab)
    }

    /// Record how far a tab pane has scrolled.
    pub fn set_scroll(&mut self, tab: Tab, offset: f32) {
        if self.is_disposed() {
            return;
        }
        self.sheet.set_scroll(tab, offset);
    }

    #[must_use]
    pub fn scroll_offset(&self, tab: Tab) -> f32 {
        self.sheet.scroll_offset(tab)
    }

    /// Tap on the panel handle.
    pub fn tap_handle(&mut self, now: Instant) {
        if self.is_disposed() || !self.selection.is_panel_visible() {
            return;
        }
        if let Some(detent) = self.sheet.toggle(now) {
            self.commit_detent(detent);
        }
    }

    pub fn drag_begin(&mut self, now: Instant) -> bool {
        if self.is_disposed() || !self.selection.is_panel_visible() {
            return false;
        }
        self.sheet.drag_begin(now)
    }

    pub fn drag_move(&mut self, dx: f32, dy: f32) -> bool {
        if self.is_disposed() {
            return false;
        }
        self.sheet.drag_move(dx, dy)
    }

    pub fn drag_end(&mut self, dy: f32, now: Instant) -> Option<Detent> {
        if self.is_disposed() {
            return None;
        }
        let detent = self.sheet.drag_end(dy, now)?;
        self.commit_detent(detent);
        Some(detent)
    }

    fn commit_detent(&mut self, detent: Detent) {
        match detent {
            Detent::Expanded => self.selection.expand(),
            Detent::Collapsed => self.selection.collapse(),
        };
    }

    /// Advance panel animation; returns the panel height.
    pub fn tick(&mut self, now: Instant) -> f32 {
        self.sheet.tick(now)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Screen teardown. Stops timers and animations and silences the bridge;
    /// any continuation that arrives afterwards is a no-op.
    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.liveness.kill();
        if let Some(mut debouncer) = self.search.take() {
            debouncer.cancel();
        }
        self.sheet.cancel();
        self.bridge.deactivate();
        tracing::info!("map screen disposed");
    }

    fn sync_markers(&mut self) {
        if self.is_disposed() {
            return;
        }
        let query = MarkerQuery {
            filters: &self.filters,
            keyword: &self.keyword,
            selected: self.selection.selected(),
            zoom: self.zoom,
        };
        let markers = visible_markers(&self.facilities, &query, &self.config.markers);
        self.bridge.push_markers(markers);
    }
}
