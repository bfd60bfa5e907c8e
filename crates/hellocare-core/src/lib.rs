//! Core library for the HelloCare admin console.
//!
//! - `auth`: the session store, its durable storage backends and the
//!   credential exchange with the identity provider
//! - `api`: the gateway client every backend call goes through
//! - `models`: identity and remote resource records
//! - `config`: configuration loading

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, OutboundRequest};
pub use auth::{LoginResult, Session, SessionEvent, SessionState, SessionStore};
pub use config::Config;
