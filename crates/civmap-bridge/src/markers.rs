//! Which facilities become markers, and how they look at a given zoom.

use civmap_core::{AppConfig, Facility, FacilityId, FacilitySet, FacilityType};

use crate::protocol::MarkerPayload;

/// Filter chip a facility category belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Restaurant,
    Hotel,
    Shop,
}

impl FilterKey {
    pub const ALL: [FilterKey; 3] = [FilterKey::Restaurant, FilterKey::Hotel, FilterKey::Shop];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FilterKey::Restaurant => "restaurant",
            FilterKey::Hotel => "hotel",
            FilterKey::Shop => "shop",
        }
    }
}

impl std::str::FromStr for FilterKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "restaurant" => Ok(FilterKey::Restaurant),
            "hotel" => Ok(FilterKey::Hotel),
            "shop" => Ok(FilterKey::Shop),
            other => Err(format!("unknown filter '{other}'")),
        }
    }
}

/// Filter bucket for a category. `Other` has none, so it is never shown.
#[must_use]
pub fn bucket(facility_type: FacilityType) -> Option<FilterKey> {
    match facility_type {
        FacilityType::Restaurant => Some(FilterKey::Restaurant),
        FacilityType::Hotel => Some(FilterKey::Hotel),
        FacilityType::Shop => Some(FilterKey::Shop),
        FacilityType::Other => None,
    }
}

/// Visibility toggle per filter chip. Everything starts enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSet {
    restaurant: bool,
    hotel: bool,
    shop: bool,
}

impl Default for FilterSet {
    fn default() -> Self {
        Self {
            restaurant: true,
            hotel: true,
            shop: true,
        }
    }
}

impl FilterSet {
    #[must_use]
    pub fn is_enabled(&self, key: FilterKey) -> bool {
        match key {
            FilterKey::Restaurant => self.restaurant,
            FilterKey::Hotel => self.hotel,
            FilterKey::Shop => self.shop,
        }
    }

    pub fn set(&mut self, key: FilterKey, enabled: bool) {
        let slot = match key {
            FilterKey::Restaurant => &mut self.restaurant,
            FilterKey::Hotel => &mut self.hotel,
            FilterKey::Shop => &mut self.shop,
        };
        *slot = enabled;
    }

    /// Flip a chip and return its new state.
    pub fn toggle(&mut self, key: FilterKey) -> bool {
        let enabled = !self.is_enabled(key);
        self.set(key, enabled);
        enabled
    }

    #[must_use]
    pub fn admits(&self, facility_type: FacilityType) -> bool {
        bucket(facility_type).is_some_and(|key| self.is_enabled(key))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerConfig {
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Below this zoom no markers are rendered at all.
    pub marker_min_zoom: u8,
    /// Name labels appear at or above this zoom.
    pub label_min_zoom: u8,
    /// Zoom used when the host re-centers on a facility.
    pub focus_zoom: u8,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            min_zoom: 3,
            max_zoom: 19,
            marker_min_zoom: 10,
            label_min_zoom: 15,
            focus_zoom: 16,
        }
    }
}

impl From<&AppConfig> for MarkerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            marker_min_zoom: config.marker_min_zoom,
            label_min_zoom: config.label_min_zoom,
            focus_zoom: config.focus_zoom,
        }
    }
}

impl MarkerConfig {
    /// Round a surface-reported zoom and clamp it into the provider's bounds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn clamp_zoom(&self, zoom: f64) -> u8 {
        if !zoom.is_finite() {
            return self.min_zoom;
        }
        let clamped = zoom
            .round()
            .clamp(f64::from(self.min_zoom), f64::from(self.max_zoom));
        clamped as u8
    }
}

const SELECTED_SIZE_BONUS: u16 = 12;

/// Marker icon edge length in pixels. Grows in discrete bands with zoom.
#[must_use]
pub fn icon_size(zoom: u8) -> u16 {
    match zoom {
        0..=11 => 24,
        12..=13 => 32,
        14..=15 => 40,
        _ => 48,
    }
}

/// View-dependent inputs to [`visible_markers`].
#[derive(Debug, Clone, Copy)]
pub struct MarkerQuery<'a> {
    pub filters: &'a FilterSet,
    /// Search text; blank matches everything.
    pub keyword: &'a str,
    pub selected: Option<FacilityId>,
    pub zoom: u8,
}

/// Case-insensitive substring match on the facility name.
#[must_use]
pub fn matches_keyword(facility: &Facility, keyword: &str) -> bool {
    let needle = keyword.trim();
    needle.is_empty()
        || facility
            .name
            .to_lowercase()
            .contains(&needle.to_lowercase())
}

fn to_payload(facility: &Facility, selected: bool, zoom: u8, config: &MarkerConfig) -> MarkerPayload {
    let appearance = facility.facility_type.appearance();
    let base = icon_size(zoom);
    MarkerPayload {
        id: facility.id,
        name: facility.name.clone(),
        facility_type: facility.facility_type,
        latitude: facility.coordinates.latitude,
        longitude: facility.coordinates.longitude,
        icon: appearance.icon,
        color: if selected { "#F39C12" } else { appearance.color },
        icon_size: if selected { base + SELECTED_SIZE_BONUS } else { base },
        show_label: zoom >= config.label_min_zoom,
        selected,
    }
}

/// The marker set the surface should display, in source order.
#[must_use]
pub fn visible_markers(
    facilities: &FacilitySet,
    query: &MarkerQuery<'_>,
    config: &MarkerConfig,
) -> Vec<MarkerPayload> {
    if query.zoom < config.marker_min_zoom {
        return Vec::new();
    }

    facilities
        .iter()
        .filter(|f| query.filters.admits(f.facility_type))
        .filter(|f| matches_keyword(f, query.keyword))
        .map(|f| to_payload(f, query.selected == Some(f.id), query.zoom, config))
        .collect()
}
