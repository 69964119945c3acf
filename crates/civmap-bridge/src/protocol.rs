//! Wire format between the host and the embedded map surface.
//!
//! Inbound traffic is one JSON object per message, tagged by `type`.
//! Outbound traffic is a script snippet injected into the surface's page,
//! calling one of the functions the surface exposes on `window`.

use civmap_core::{Coordinates, FacilityId, FacilityType};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::BridgeError;

/// A message posted by the map surface.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// The surface finished loading and can accept injected calls.
    MapLoaded,
    /// A marker was tapped.
    ViewFacility { facility_id: FacilityId },
    /// The user asked for the reviews tab of a facility directly.
    ViewReviews { facility_id: FacilityId },
    /// The user asked to write a review. The host decides whether that
    /// needs a sign-in first.
    ReviewFacility { facility_id: FacilityId },
    /// A tap on empty map space.
    MapClick { coordinates: Coordinates },
    /// The surface's zoom level changed.
    ZoomChanged { zoom: f64 },
    /// The surface asks the host to re-center.
    FocusRequest {
        coordinates: Coordinates,
        zoom: Option<f64>,
    },
    /// Any tag this host does not understand.
    Unknown(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FacilityRef {
    #[serde(deserialize_with = "lenient_facility_id")]
    facility_id: FacilityId,
}

#[derive(Deserialize)]
struct ZoomPayload {
    zoom: f64,
}

#[derive(Deserialize)]
struct FocusPayload {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    zoom: Option<f64>,
}

/// Page scripts stringify ids inconsistently, so accept `3` and `"3"`.
fn lenient_facility_id<'de, D>(deserializer: D) -> Result<FacilityId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(n) => Ok(FacilityId(n)),
        RawId::Text(s) => s
            .trim()
            .parse::<i64>()
            .map(FacilityId)
            .map_err(|_| serde::de::Error::custom(format!("facility id '{s}' is not numeric"))),
    }
}

fn payload<T>(tag: &str, value: serde_json::Value) -> Result<T, BridgeError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(value).map_err(|source| BridgeError::InvalidPayload {
        tag: tag.to_string(),
        source,
    })
}

impl InboundMessage {
    /// Decode one raw message from the surface.
    ///
    /// Unknown tags are not an error; they decode to [`InboundMessage::Unknown`]
    /// so the caller can ignore them.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::Malformed`] if `raw` is not JSON.
    /// - [`BridgeError::MissingType`] if there is no string `type` field.
    /// - [`BridgeError::InvalidPayload`] if a known tag lacks or mistypes a field.
    pub fn decode(raw: &str) -> Result<Self, BridgeError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let tag = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or(BridgeError::MissingType)?
            .to_string();

        let message = match tag.as_str() {
            "mapLoaded" => InboundMessage::MapLoaded,
            "viewFacility" => InboundMessage::ViewFacility {
                facility_id: payload::<FacilityRef>(&tag, value)?.facility_id,
            },
            "viewReviews" => InboundMessage::ViewReviews {
                facility_id: payload::<FacilityRef>(&tag, value)?.facility_id,
            },
            "reviewFacility" => InboundMessage::ReviewFacility {
                facility_id: payload::<FacilityRef>(&tag, value)?.facility_id,
            },
            "mapClick" => {
                let coordinates: Coordinates = payload(&tag, value)?;
                InboundMessage::MapClick { coordinates }
            }
            "zoomChanged" => InboundMessage::ZoomChanged {
                zoom: payload::<ZoomPayload>(&tag, value)?.zoom,
            },
            "focusRequest" => {
                let focus: FocusPayload = payload(&tag, value)?;
                InboundMessage::FocusRequest {
                    coordinates: Coordinates::new(focus.latitude, focus.longitude),
                    zoom: focus.zoom,
                }
            }
            _ => InboundMessage::Unknown(tag),
        };
        Ok(message)
    }
}

/// Tile layer shown by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapType {
    #[default]
    Default,
    Satellite,
    Terrain,
}

impl MapType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MapType::Default => "default",
            MapType::Satellite => "satellite",
            MapType::Terrain => "terrain",
        }
    }
}

impl std::str::FromStr for MapType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(MapType::Default),
            "satellite" => Ok(MapType::Satellite),
            "terrain" => Ok(MapType::Terrain),
            other => Err(format!("unknown map type '{other}'")),
        }
    }
}

/// One marker as the surface renders it.
///
/// `id`, `name`, `type`, `latitude`, and `longitude` are the contract with the
/// surface; the remaining fields carry styling computed on the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerPayload {
    pub id: FacilityId,
    pub name: String,
    #[serde(rename = "type")]
    pub facility_type: FacilityType,
    pub latitude: f64,
    pub longitude: f64,
    pub icon: &'static str,
    pub color: &'static str,
    pub icon_size: u16,
    pub show_label: bool,
    pub selected: bool,
}

/// A call into the surface, delivered by script injection.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundCall {
    /// Replace the rendered marker set.
    AddMarkers(Vec<MarkerPayload>),
    ChangeMapType(MapType),
    FocusOnFacility { lat: f64, lng: f64, zoom: u8 },
}

impl OutboundCall {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            OutboundCall::AddMarkers(_) => "addMarkers",
            OutboundCall::ChangeMapType(_) => "changeMapType",
            OutboundCall::FocusOnFacility { .. } => "focusOnFacility",
        }
    }

    /// Render the script injected into the surface. The trailing `true;` keeps
    /// the injected expression from evaluating to a non-serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Malformed`] if the marker payload cannot be
    /// serialized.
    pub fn to_script(&self) -> Result<String, BridgeError> {
        let args = match self {
            OutboundCall::AddMarkers(markers) => js_safe(serde_json::to_string(markers)?),
            OutboundCall::ChangeMapType(map_type) => js_safe(serde_json::to_string(map_type)?),
            OutboundCall::FocusOnFacility { lat, lng, zoom } => format!("{lat}, {lng}, {zoom}"),
        };
        Ok(format!("window.{}({args}); true;", self.name()))
    }
}

/// JSON allows raw U+2028 and U+2029 inside strings; older script engines
/// treat them as line terminators.
fn js_safe(json: String) -> String {
    if json.contains(['\u{2028}', '\u{2029}']) {
        json.replace('\u{2028}', "\\u2028")
            .replace('\u{2029}', "\\u2029")
    } else {
        json
    }
}

/// Where outbound calls go. Fire-and-forget: the surface never answers.
pub trait SurfaceSink {
    fn inject(&mut self, call: &OutboundCall);
}

impl<F> SurfaceSink for F
where
    F: FnMut(&OutboundCall),
{
    fn inject(&mut self, call: &OutboundCall) {
        (self)(call);
    }
}

/// Sink that keeps every call it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<OutboundCall>,
}

impl RecordingSink {
    /// Marker sets in the order they were pushed.
    #[must_use]
    pub fn marker_pushes(&self) -> Vec<&[MarkerPayload]> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                OutboundCall::AddMarkers(markers) => Some(markers.as_slice()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn last_markers(&self) -> Option<&[MarkerPayload]> {
        self.marker_pushes().last().copied()
    }
}

impl SurfaceSink for RecordingSink {
    fn inject(&mut self, call: &OutboundCall) {
        self.calls.push(call.clone());
    }
}
