//! HTTP clients for the voketag backends
//!
//! ## Key Components
//!
//! - **`auth`**: login, refresh and CSRF acquisition against the admin service.
//! - **`http`**: [`ApiClient`], the authenticated request path shared by the
//!   admin and factory surfaces (refresh-once on 401, CSRF on mutations).
//! - **`admin`**, **`factory`**, **`scan`**: one typed wrapper per backend.
//! - **`sse`**: live audit log stream.
//! - **`session`**: where tokens live between invocations.

pub mod admin;
pub mod auth;
pub mod csrf;
pub mod factory;
pub mod health;
pub mod http;
pub mod jwt;
pub mod scan;
pub mod session;
pub mod sse;

pub use admin::AdminApi;
pub use auth::Auth;
pub use factory::FactoryApi;
pub use health::HealthTargets;
pub use http::{build_http, ApiClient, ApiRequest};
pub use jwt::Role;
pub use scan::ScanApi;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};

use std::sync::Arc;
use voketag_config::Config;
use voketag_core::Result;

/// Every API surface wired to one HTTP client, cookie jar and session
#[derive(Clone)]
pub struct Clients {
    pub auth: Arc<Auth>,
    pub admin: AdminApi,
    pub factory: FactoryApi,
    pub scan: ScanApi,
    pub health: HealthTargets,
    http: reqwest::Client,
}

impl Clients {
    pub fn new(config: &Config, store: Arc<dyn SessionStore>) -> Result<Self> {
        let (http, jar) = build_http(&config.http)?;
        let endpoints = &config.endpoints;
        let timeout = config.http.timeout;

        let auth = Arc::new(Auth::new(
            http.clone(),
            Arc::clone(&jar),
            endpoints.admin_api.clone(),
            store,
            timeout,
        ));
        let admin = AdminApi::new(ApiClient::new(
            http.clone(),
            endpoints.admin_api.clone(),
            Arc::clone(&auth),
            timeout,
        ));
        let factory = FactoryApi::new(ApiClient::new(
            http.clone(),
            endpoints.factory_api.clone(),
            Arc::clone(&auth),
            timeout,
        ));
        let scan = ScanApi::new(http.clone(), jar, endpoints.scan_api.clone(), config.http);
        let health = HealthTargets {
            admin: endpoints.admin_api.clone(),
            factory: endpoints.factory_api.clone(),
            scan: endpoints.scan_api.clone(),
        };

        tracing::debug!(
            admin = %endpoints.admin_api,
            factory = %endpoints.factory_api,
            scan = %endpoints.scan_api,
            "clients ready"
        );
        Ok(Self {
            auth,
            admin,
            factory,
            scan,
            health,
            http,
        })
    }

    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}
