use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use super::exchange::{self, CredentialExchanger};
use super::storage::{self, SessionStorage, TOKEN_KEY, USER_KEY};
use crate::api::{ApiClient, ApiError, LOGIN_PATH};
use crate::config::Config;
use crate::models::{Identity, Role};

/// Where the host should send the user once the session is invalidated
pub const LOGIN_ROUTE: &str = "/login";

/// Sentinel credential installed by `demo_login`
pub const DEMO_TOKEN: &str = "demo-token";

const DEMO_USER_ID: &str = "demo-admin";
const DEMO_NAME: &str = "Demo Admin";
const DEMO_EMAIL: &str = "admin@hellocare.com";

const LOGIN_FALLBACK_MESSAGE: &str = "Login failed";

const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub identity: Identity,
    pub credential: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    /// `restore` has not run yet
    #[default]
    Uninitialized,
    Empty,
    Authenticated(Session),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    SignedOut,
    /// The backend rejected the credential; the session has been cleared
    Invalidated { redirect_to: &'static str },
}

/// Outcome of `login`. Failures carry a message fit to show the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoginResult {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    data: LoginData,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
    #[serde(flatten)]
    identity: Identity,
}

#[derive(Error, Debug)]
enum LoginError {
    #[error(transparent)]
    Backend(ApiError),

    #[error("Credential exchange failed: {0}")]
    Exchange(ApiError),

    #[error("Failed to save session: {0}")]
    Storage(anyhow::Error),
}

impl LoginError {
    /// Structured server message first, then the error itself, then a fallback
    fn user_message(&self) -> String {
        let structured = match self {
            LoginError::Backend(e) | LoginError::Exchange(e) => e.message().map(str::to_string),
            LoginError::Storage(_) => None,
        };
        structured
            .or_else(|| Some(self.to_string()))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| LOGIN_FALLBACK_MESSAGE.to_string())
    }
}

/// The single authenticated session, shared by every clone of the handle.
///
/// Mutated only through `restore`, `login`, `demo_login`, `logout` and
/// `invalidate`; writes are last-write-wins.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<SessionState>>,
    storage: Arc<dyn SessionStorage>,
    exchanger: Arc<dyn CredentialExchanger>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>, exchanger: Arc<dyn CredentialExchanger>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(SessionState::Uninitialized)),
            storage,
            exchanger,
            events,
        }
    }

    /// Build a store with the storage backend and exchanger the config selects
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage = storage::open(config)?;
        let exchanger = exchange::for_config(config)?;
        Ok(Self::new(storage, exchanger))
    }

    // ===== Queries =====

    pub fn state(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current(&self) -> Option<Session> {
        match self.state() {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.current().map(|s| s.identity)
    }

    /// The bearer credential, if signed in
    pub fn credential(&self) -> Option<String> {
        match *self.state.read().unwrap_or_else(PoisonError::into_inner) {
            SessionState::Authenticated(ref session) => Some(session.credential.clone()),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state(), SessionState::Authenticated(_))
    }

    /// True until `restore` has run
    pub fn loading(&self) -> bool {
        matches!(self.state(), SessionState::Uninitialized)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    // ===== Operations =====

    /// Load a previously persisted session. No network call is made; a stale
    /// credential is discovered by the gateway's first rejected request.
    pub fn restore(&self) -> SessionState {
        let state = match self.read_persisted() {
            Some(session) => {
                debug!(user_id = %session.identity.user_id, "Session restored");
                SessionState::Authenticated(session)
            }
            None => {
                debug!("No stored session");
                SessionState::Empty
            }
        };
        self.set_state(state.clone());
        state
    }

    /// Two-phase login: backend credentials check, then credential exchange
    /// with the identity provider. Never returns an error; failures are
    /// reported in the result and leave no partial session behind.
    pub async fn login(&self, api: &ApiClient, email: &str, password: &str) -> LoginResult {
        if email.trim().is_empty() || password.is_empty() {
            return LoginResult::failed("Email and password are required");
        }

        match self.try_login(api, email.trim(), password).await {
            Ok(session) => {
                info!(user_id = %session.identity.user_id, "Login successful");
                self.set_state(SessionState::Authenticated(session));
                self.emit(SessionEvent::SignedIn);
                LoginResult::ok()
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                if matches!(e, LoginError::Storage(_)) {
                    // persist() already cleared both keys
                    self.set_state(SessionState::Empty);
                }
                LoginResult::failed(e.user_message())
            }
        }
    }

    async fn try_login(
        &self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<Session, LoginError> {
        let response: LoginResponse = api
            .post(LOGIN_PATH, &LoginRequest { email, password })
            .await
            .map_err(LoginError::Backend)?;

        let credential = self
            .exchanger
            .exchange(&response.data.token)
            .await
            .map_err(LoginError::Exchange)?;

        let session = Session {
            identity: response.data.identity,
            credential,
        };
        self.persist(&session).map_err(LoginError::Storage)?;
        Ok(session)
    }

    /// Install a fixed admin identity without touching the network
    pub fn demo_login(&self) -> Session {
        let session = Session {
            identity: Identity::new(DEMO_USER_ID, DEMO_NAME, DEMO_EMAIL, Role::Admin),
            credential: DEMO_TOKEN.to_string(),
        };
        if let Err(e) = self.persist(&session) {
            warn!(error = %e, "Failed to save demo session");
        }
        info!("Demo login");
        self.set_state(SessionState::Authenticated(session.clone()));
        self.emit(SessionEvent::SignedIn);
        session
    }

    pub fn logout(&self) {
        self.clear_storage();
        self.set_state(SessionState::Empty);
        info!("Logged out");
        self.emit(SessionEvent::SignedOut);
    }

    /// Tear the session down after the backend rejected its credential
    pub fn invalidate(&self) {
        self.clear_storage();
        self.set_state(SessionState::Empty);
        warn!("Session invalidated by the backend");
        self.emit(SessionEvent::Invalidated {
            redirect_to: LOGIN_ROUTE,
        });
    }

    // ===== Persistence =====

    fn read_persisted(&self) -> Option<Session> {
        let read = |key: &str| match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, error = %e, "Failed to read stored session");
                None
            }
        };

        match (read(TOKEN_KEY), read(USER_KEY)) {
            (Some(credential), Some(user)) => match serde_json::from_str::<Identity>(&user) {
                Ok(identity) => Some(Session {
                    identity,
                    credential,
                }),
                Err(e) => {
                    warn!(error = %e, "Stored identity is unreadable, discarding session");
                    self.clear_storage();
                    None
                }
            },
            (None, None) => None,
            _ => {
                warn!("Found partial session in storage, discarding");
                self.clear_storage();
                None
            }
        }
    }

    /// Write both keys or neither
    fn persist(&self, session: &Session) -> Result<()> {
        let user =
            serde_json::to_string(&session.identity).context("Failed to serialize identity")?;
        let written = self
            .storage
            .set(TOKEN_KEY, &session.credential)
            .and_then(|_| self.storage.set(USER_KEY, &user));
        if let Err(e) = written {
            self.clear_storage();
            return Err(e);
        }
        Ok(())
    }

    fn clear_storage(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "Failed to clear stored session");
            }
        }
    }

    fn set_state(&self, state: SessionState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
