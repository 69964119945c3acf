//! Wire types for the directory backend.
//!
//! These mirror the backend's DTOs and are converted into `civmap-core`
//! domain types before leaving this crate.

use chrono::{DateTime, NaiveDateTime, Utc};
use civmap_core::{Contact, Coordinates, Facility, FacilityId, FacilityType, Review};
use serde::Deserialize;

/// Top-level envelope wrapped around every backend response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbpResponse<T> {
    pub result: Option<T>,
    pub success: bool,
    #[serde(default)]
    pub error: Option<AbpError>,
}

#[derive(Debug, Deserialize)]
pub struct AbpError {
    #[serde(default)]
    pub message: Option<String>,
}

/// `result` shape of list endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

// ---------------------------------------------------------------------------
// Facility/GetAll
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityDto {
    pub id: i64,
    pub name: String,
    /// Free-form category name, e.g. `"Restaurant"`.
    #[serde(rename = "type", default)]
    pub facility_type: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
}

impl From<FacilityDto> for Facility {
    fn from(dto: FacilityDto) -> Self {
        Facility {
            id: FacilityId(dto.id),
            name: dto.name,
            facility_type: dto
                .facility_type
                .as_deref()
                .map_or(FacilityType::Other, FacilityType::from),
            coordinates: Coordinates::new(dto.latitude, dto.longitude),
            address: non_blank(dto.address),
            contact: Contact {
                phone: non_blank(dto.phone_number),
                email: non_blank(dto.email),
                website: non_blank(dto.website),
                facebook: non_blank(dto.facebook),
                instagram: non_blank(dto.instagram),
            },
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Review/GetByFacility
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    #[serde(default)]
    pub reviewer_name: Option<String>,
    pub rating: u8,
    #[serde(default)]
    pub text: String,
    pub creation_time: String,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub reply_count: u32,
}

impl ReviewDto {
    /// Convert to the domain type. Returns `None` when the timestamp cannot be
    /// parsed or the rating is outside 1 to 5.
    #[must_use]
    pub fn into_review(self) -> Option<Review> {
        let Some(date) = parse_timestamp(&self.creation_time) else {
            tracing::warn!(creation_time = %self.creation_time, "skipping review with bad timestamp");
            return None;
        };
        let review = Review {
            reviewer: self
                .reviewer_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Anonymous".to_string()),
            rating: self.rating,
            text: self.text,
            date,
            like_count: self.like_count,
            reply_count: self.reply_count,
        };
        if !review.is_valid_rating() {
            tracing::warn!(rating = review.rating, "skipping review with out-of-range rating");
            return None;
        }
        Some(review)
    }
}

/// The backend emits both RFC 3339 timestamps and naive ones that are UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
