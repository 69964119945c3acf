//! HTTP client for the directory backend's application services.
//!
//! Wraps `reqwest` with envelope unwrapping and typed deserialization. Every
//! endpoint checks the `"success"` flag and surfaces backend-reported
//! failures as [`ClientError::Api`].

use std::time::Duration;

use civmap_core::{
    Facility, FacilityId, FacilityProvider, Review, ReviewProvider, SessionProvider,
};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::types::{AbpResponse, FacilityDto, PagedResult, ReviewDto};

const FACILITIES_PATH: &str = "api/services/app/Facility/GetAll";
const REVIEWS_PATH: &str = "api/services/app/Review/GetByFacility";

/// Client for the directory backend.
///
/// Holds the HTTP client, the normalised base URL, and an optional bearer
/// token. A client with a token counts as a signed-in session.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("civmap/0.1 (facility-map)")
            .build()?;

        // One trailing slash so `Url::join` appends instead of replacing the
        // last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            token: token.map(str::to_owned).filter(|t| !t.trim().is_empty()),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetches every facility.
    ///
    /// Records with out-of-range coordinates are dropped with a warning
    /// rather than failing the whole load.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] if the backend reports failure.
    /// - [`ClientError::Http`] on network failure or non-2xx status.
    /// - [`ClientError::Deserialize`] if the body does not match the expected
    ///   shape.
    pub async fn fetch_facilities(&self) -> Result<Vec<Facility>, ClientError> {
        let url = self.build_url(FACILITIES_PATH, &[])?;
        let page: PagedResult<FacilityDto> = self.get_result(&url, "Facility/GetAll").await?;

        let facilities: Vec<Facility> = page
            .items
            .into_iter()
            .map(Facility::from)
            .filter(|facility| match facility.coordinates.validate() {
                Ok(()) => true,
                Err(reason) => {
                    tracing::warn!(facility_id = %facility.id, reason = %reason, "skipping facility");
                    false
                }
            })
            .collect();

        tracing::debug!(count = facilities.len(), "fetched facilities");
        Ok(facilities)
    }

    /// Fetches reviews for one facility, newest first as the backend returns
    /// them. Reviews with unparseable timestamps are skipped.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::fetch_facilities`].
    pub async fn fetch_reviews(&self, facility_id: FacilityId) -> Result<Vec<Review>, ClientError> {
        let id = facility_id.to_string();
        let url = self.build_url(REVIEWS_PATH, &[("facilityId", &id)])?;
        let context = format!("Review/GetByFacility(facilityId={facility_id})");
        let page: PagedResult<ReviewDto> = self.get_result(&url, &context).await?;

        Ok(page
            .items
            .into_iter()
            .filter_map(ReviewDto::into_review)
            .collect())
    }

    fn build_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// GET `url`, unwrap the envelope, and deserialize its `result`.
    async fn get_result<T>(&self, url: &Url, context: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let body = self.request_json(url).await?;
        let envelope: AbpResponse<T> =
            serde_json::from_value(body).map_err(|e| ClientError::Deserialize {
                context: context.to_string(),
                source: e,
            })?;
        Self::unwrap_envelope(envelope)
    }

    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, ClientError> {
        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    fn unwrap_envelope<T>(envelope: AbpResponse<T>) -> Result<T, ClientError> {
        if !envelope.success {
            let msg = envelope
                .error
                .and_then(|e| e.message)
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(ClientError::Api(msg));
        }
        envelope
            .result
            .ok_or_else(|| ClientError::Api("response has no result".to_string()))
    }
}

impl FacilityProvider for ApiClient {
    type Error = ClientError;

    async fn get_facilities(&self) -> Result<Vec<Facility>, Self::Error> {
        self.fetch_facilities().await
    }
}

impl ReviewProvider for ApiClient {
    type Error = ClientError;

    async fn get_reviews(&self, facility_id: FacilityId) -> Result<Vec<Review>, Self::Error> {
        self.fetch_reviews(facility_id).await
    }
}

impl SessionProvider for ApiClient {
    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
