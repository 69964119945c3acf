pub mod app_config;
pub mod config;
pub mod facilities;
pub mod provider;
pub mod reviews;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use facilities::{
    load_facilities, Appearance, Contact, Coordinates, Facility, FacilityId, FacilitySet,
    FacilityType, FacilitiesFile,
};
pub use provider::{
    FacilityProvider, ReviewProvider, SessionProvider, StaticFacilities, StaticSession,
};
pub use reviews::Review;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read facilities file {path}: {source}")]
    FacilitiesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse facilities file: {0}")]
    FacilitiesFileParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
