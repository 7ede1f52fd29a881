//! Shared fixtures: one mock server standing in for all three backends

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use voketag_client::{Clients, MemorySessionStore, Session};
use voketag_config::{Config, Endpoints, HttpSettings, PollingSettings};
use voketag_core::DEFAULT_VERIFY_URL;
use wiremock::MockServer;

pub fn config_for(server: &MockServer) -> Config {
    let uri = server.uri();
    Config {
        endpoints: Endpoints {
            admin_api: Url::parse(&uri).unwrap(),
            factory_api: Url::parse(&format!("{uri}/v1")).unwrap(),
            scan_api: Url::parse(&uri).unwrap(),
            verify_url: Url::parse(DEFAULT_VERIFY_URL).unwrap(),
        },
        polling: PollingSettings {
            interval: Duration::from_millis(10),
            error_backoff: Duration::from_millis(10),
            max_attempts: 20,
        },
        http: HttpSettings {
            timeout: Duration::from_secs(5),
            scan_timeout: Duration::from_millis(300),
            scan_retry_delay: Duration::from_millis(20),
        },
        session_file: PathBuf::from("unused-session.json"),
    }
}

/// Session with an access token, refresh token and cached CSRF token
pub fn logged_in() -> Session {
    Session {
        access_token: Some("old-token".into()),
        refresh_token: Some("refresh-1".into()),
        csrf_token: Some("csrf-1".into()),
        email: Some("admin@voketag.com.br".into()),
        role: None,
    }
}

pub fn clients(server: &MockServer, session: Session) -> (Clients, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new(session));
    let clients = Clients::new(&config_for(server), store.clone()).unwrap();
    (clients, store)
}
