#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use hellocare_core::auth::{
    CredentialExchanger, FirebaseExchanger, MemoryStorage, PassthroughExchanger,
};
use hellocare_core::{ApiClient, Config, SessionStore};
use wiremock::MockServer;

pub const API_PREFIX: &str = "/v1";
pub const FIREBASE_KEY: &str = "test-api-key";

pub struct Harness {
    pub api: ApiClient,
    pub session: SessionStore,
    pub storage: Arc<MemoryStorage>,
}

pub fn config_for(server: &MockServer) -> Config {
    Config {
        api_url: format!("{}{}", server.uri(), API_PREFIX),
        identity_url: server.uri(),
        firebase_api_key: Some(FIREBASE_KEY.to_string()),
        request_timeout_secs: 5,
        ..Config::default()
    }
}

pub fn harness_with(config: &Config, exchanger: Arc<dyn CredentialExchanger>) -> Harness {
    let storage = Arc::new(MemoryStorage::default());
    let session = SessionStore::new(storage.clone(), exchanger);
    session.restore();
    let api = ApiClient::new(config, session.clone()).unwrap();
    Harness {
        api,
        session,
        storage,
    }
}

/// Backend plus Firebase exchange, both served by the mock server
pub fn harness(server: &MockServer) -> Harness {
    let config = config_for(server);
    let exchanger =
        FirebaseExchanger::new(&config.identity_url, FIREBASE_KEY, Duration::from_secs(5))
            .unwrap();
    harness_with(&config, Arc::new(exchanger))
}

pub fn passthrough_harness(server: &MockServer) -> Harness {
    harness_with(&config_for(server), Arc::new(PassthroughExchanger))
}

pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}
