//! Where facility and review data comes from.
//!
//! With `CIVMAP_API_BASE_URL` set the REST backend is used; otherwise the
//! seed file at `CIVMAP_FACILITIES_PATH` backs a static provider.

use anyhow::Context;
use civmap_client::ApiClient;
use civmap_core::{
    AppConfig, Facility, FacilityId, FacilityProvider, Review, ReviewProvider, StaticFacilities,
};

pub(crate) enum FacilitySource {
    Rest(ApiClient),
    Seed(StaticFacilities),
}

impl FacilitySource {
    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        if let Some(base_url) = config.api_base_url.as_deref() {
            tracing::info!(base_url, "using REST facility source");
            let client = ApiClient::new(
                base_url,
                config.api_token.as_deref(),
                config.http_timeout_secs,
            )?;
            return Ok(Self::Rest(client));
        }

        let path = &config.facilities_path;
        tracing::info!(path = %path.display(), "using facility seed file");
        let file = civmap_core::load_facilities(path)
            .with_context(|| format!("loading facilities from {}", path.display()))?;
        Ok(Self::Seed(StaticFacilities::new(file.facilities)))
    }

    pub(crate) async fn facilities(&self) -> anyhow::Result<Vec<Facility>> {
        match self {
            Self::Rest(client) => fetch(client).await,
            Self::Seed(provider) => fetch(provider).await,
        }
    }

    pub(crate) async fn reviews(&self, facility_id: FacilityId) -> anyhow::Result<Vec<Review>> {
        match self {
            Self::Rest(client) => Ok(client.get_reviews(facility_id).await?),
            Self::Seed(_) => anyhow::bail!("reviews need a backend; set CIVMAP_API_BASE_URL"),
        }
    }
}

async fn fetch<P: FacilityProvider>(provider: &P) -> anyhow::Result<Vec<Facility>> {
    Ok(provider.get_facilities().await?)
}
