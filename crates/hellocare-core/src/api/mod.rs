//! REST gateway for the HelloCare backend.
//!
//! Every backend call goes through `ApiClient`, which attaches the active
//! session's bearer credential and tears the session down when the backend
//! rejects it.

pub mod client;
pub mod error;
pub mod request;
mod resources;

pub use client::{ApiClient, LOGIN_PATH};
pub use error::ApiError;
pub use request::OutboundRequest;
