//! Authentication module for managing the admin session.
//!
//! This module provides:
//! - `SessionStore`: the single process-wide session with login, demo login,
//!   logout and restore-on-startup
//! - `SessionStorage`: durable key/value persistence for the session
//!   (file, OS keychain or memory)
//! - `CredentialExchanger`: trades the backend's short-lived login token for
//!   a durable bearer credential from the identity provider
//!
//! The session is persisted under two keys, `token` (raw bearer string) and
//! `user` (identity JSON). Both present means signed in.

pub mod exchange;
pub mod session;
pub mod storage;

pub use exchange::{CredentialExchanger, FirebaseExchanger, PassthroughExchanger};
pub use session::{
    LoginResult, Session, SessionEvent, SessionState, SessionStore, DEMO_TOKEN, LOGIN_ROUTE,
};
pub use storage::{FileStorage, KeyringStorage, MemoryStorage, SessionStorage, TOKEN_KEY, USER_KEY};
