//! REST client for the directory backend.
//!
//! The backend follows the ABP application-service conventions: every
//! response is wrapped in `{ "result": ..., "success": bool, "error": ... }`
//! and list endpoints return `{ "items": [...], "totalCount": n }` as the
//! result. [`ApiClient`] unwraps that envelope and maps the wire records onto
//! the domain types from `civmap-core`.

pub mod client;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use error::ClientError;
