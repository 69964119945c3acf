use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Stable backend identifier of a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityId(pub i64);

impl std::fmt::Display for FacilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Checks that both components are finite and inside the WGS84 range.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when either component is out of range.
    pub fn validate(&self) -> Result<(), String> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(format!("latitude {} outside [-90, 90]", self.latitude));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(format!("longitude {} outside [-180, 180]", self.longitude));
        }
        Ok(())
    }
}

/// Facility category. Drives marker icon, color, and the filter bucket.
///
/// Deserialization is case-insensitive and maps anything unrecognized to
/// [`FacilityType::Other`], so a new backend category never fails a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum FacilityType {
    Restaurant,
    Hotel,
    Shop,
    Other,
}

impl From<String> for FacilityType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<&str> for FacilityType {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "restaurant" => FacilityType::Restaurant,
            "hotel" => FacilityType::Hotel,
            "shop" => FacilityType::Shop,
            _ => FacilityType::Other,
        }
    }
}

impl std::fmt::Display for FacilityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker iconography for a facility category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appearance {
    /// Icon name understood by the map surface's icon set.
    pub icon: &'static str,
    /// CSS hex color.
    pub color: &'static str,
}

impl FacilityType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FacilityType::Restaurant => "restaurant",
            FacilityType::Hotel => "hotel",
            FacilityType::Shop => "shop",
            FacilityType::Other => "other",
        }
    }

    #[must_use]
    pub fn appearance(self) -> Appearance {
        match self {
            FacilityType::Restaurant => Appearance {
                icon: "utensils",
                color: "#E74C3C",
            },
            FacilityType::Hotel => Appearance {
                icon: "bed",
                color: "#3498DB",
            },
            FacilityType::Shop => Appearance {
                icon: "shopping-bag",
                color: "#2ECC71",
            },
            FacilityType::Other => Appearance {
                icon: "map-pin",
                color: "#95A5A6",
            },
        }
    }
}

/// Contact details shown in the detail panel. Not used for markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    #[serde(rename = "type")]
    pub facility_type: FacilityType,
    #[serde(flatten)]
    pub coordinates: Coordinates,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact: Contact,
}

/// Ordered, immutable facility collection with id lookup.
///
/// Reloads replace the whole set; records are never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct FacilitySet {
    facilities: Vec<Facility>,
    index: HashMap<FacilityId, usize>,
}

impl FacilitySet {
    /// Builds a set preserving source order. If an id repeats, the first
    /// record wins and later duplicates are discarded.
    #[must_use]
    pub fn new(facilities: Vec<Facility>) -> Self {
        let mut kept = Vec::with_capacity(facilities.len());
        let mut index = HashMap::with_capacity(facilities.len());
        for facility in facilities {
            if index.contains_key(&facility.id) {
                continue;
            }
            index.insert(facility.id, kept.len());
            kept.push(facility);
        }
        Self {
            facilities: kept,
            index,
        }
    }

    #[must_use]
    pub fn get(&self, id: FacilityId) -> Option<&Facility> {
        self.index.get(&id).map(|&i| &self.facilities[i])
    }

    #[must_use]
    pub fn contains(&self, id: FacilityId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Facility> {
        self.facilities.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }
}

impl<'a> IntoIterator for &'a FacilitySet {
    type Item = &'a Facility;
    type IntoIter = std::slice::Iter<'a, Facility>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Deserialize)]
pub struct FacilitiesFile {
    pub facilities: Vec<Facility>,
}

/// Load and validate the facility seed file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_facilities(path: &Path) -> Result<FacilitiesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FacilitiesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: FacilitiesFile = serde_yaml::from_str(&content)?;

    validate_facilities(&file)?;

    Ok(file)
}

fn validate_facilities(file: &FacilitiesFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for facility in &file.facilities {
        if facility.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "facility {} has an empty name",
                facility.id
            )));
        }

        if !seen_ids.insert(facility.id) {
            return Err(ConfigError::Validation(format!(
                "duplicate facility id: {}",
                facility.id
            )));
        }

        facility.coordinates.validate().map_err(|reason| {
            ConfigError::Validation(format!("facility '{}': {reason}", facility.name))
        })?;
    }

    Ok(())
}

#[cfg(test)]
#[path = "facilities_test.rs"]
mod tests;
