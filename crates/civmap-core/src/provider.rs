//! Collaborator contracts consumed by the map screen.
//!
//! The map core never talks to the backend directly; it is handed data by a
//! [`FacilityProvider`] and asks a [`SessionProvider`] whether write actions
//! are allowed. Both the static seed-file path and the REST client implement
//! these traits.

use std::convert::Infallible;
use std::future::Future;

use crate::facilities::{Facility, FacilityId};
use crate::reviews::Review;

pub trait FacilityProvider {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get_facilities(&self) -> impl Future<Output = Result<Vec<Facility>, Self::Error>> + Send;
}

pub trait ReviewProvider {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get_reviews(
        &self,
        facility_id: FacilityId,
    ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send;
}

pub trait SessionProvider {
    fn is_authenticated(&self) -> bool;
}

/// In-memory facilities, typically loaded from the seed file.
#[derive(Debug, Clone, Default)]
pub struct StaticFacilities {
    facilities: Vec<Facility>,
}

impl StaticFacilities {
    #[must_use]
    pub fn new(facilities: Vec<Facility>) -> Self {
        Self { facilities }
    }
}

impl FacilityProvider for StaticFacilities {
    type Error = Infallible;

    async fn get_facilities(&self) -> Result<Vec<Facility>, Self::Error> {
        Ok(self.facilities.clone())
    }
}

/// Fixed session state: `StaticSession(false)` is a guest.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSession(pub bool);

impl SessionProvider for StaticSession {
    fn is_authenticated(&self) -> bool {
        self.0
    }
}
