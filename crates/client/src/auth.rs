//! Login, token refresh and CSRF acquisition against the admin service
//!
//! All three front ends share one session: the admin service issues the JWT
//! (the factory service accepts it), and the CSRF token comes from the
//! `csrf_token` cookie or, failing that, from the CSRF endpoint.

use reqwest::cookie::Jar;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;
use voketag_core::{
    CsrfResponse, Error, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, Result,
    CSRF_HEADER,
};

use crate::csrf::token_from_jar;
use crate::http::{detail_message, join_url, transport_error};
use crate::jwt::{role_from_jwt, Role};
use crate::session::{Session, SessionStore};

pub const LOGIN_PATH: &str = "/v1/admin/auth/login";
pub const REFRESH_PATH: &str = "/v1/admin/auth/refresh";
pub const CSRF_PATH: &str = "/v1/admin/auth/csrf";

pub struct Auth {
    http: reqwest::Client,
    jar: Arc<Jar>,
    admin_base: Url,
    store: Arc<dyn SessionStore>,
    timeout: Duration,
    /// Serializes refreshes so concurrent 401s do not race on the store
    refresh_lock: Mutex<()>,
}

impl Auth {
    pub fn new(
        http: reqwest::Client,
        jar: Arc<Jar>,
        admin_base: Url,
        store: Arc<dyn SessionStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            jar,
            admin_base,
            store,
            timeout,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn session(&self) -> Result<Session> {
        self.store.load()
    }

    pub fn access_token(&self) -> Result<Option<String>> {
        Ok(self.store.load()?.access_token)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }

    /// Drop the cached CSRF token so the next mutation fetches a new one
    pub fn forget_csrf(&self) -> Result<()> {
        let mut session = self.store.load()?;
        if session.csrf_token.take().is_some() {
            self.store.save(&session)?;
        }
        Ok(())
    }

    /// Cookie value if the jar has one, else the cached token, else a fresh
    /// one from the CSRF endpoint (cached until the session is cleared).
    pub async fn csrf_token(&self) -> Result<String> {
        if let Some(token) = token_from_jar(&self.jar, &self.admin_base) {
            return Ok(token);
        }
        let mut session = self.store.load()?;
        if let Some(token) = &session.csrf_token {
            return Ok(token.clone());
        }
        let token = self.fetch_csrf(session.access_token.as_deref()).await?;
        session.csrf_token = Some(token.clone());
        self.store.save(&session)?;
        Ok(token)
    }

    async fn fetch_csrf(&self, bearer: Option<&str>) -> Result<String> {
        let url = join_url(&self.admin_base, CSRF_PATH);
        let mut request = self.http.get(&url).timeout(self.timeout);
        if let Some(bearer) = bearer {
            request = request.bearer_auth(bearer);
        }
        let response = request.send().await.map_err(|e| transport_error(&url, &e))?;
        if !response.status().is_success() {
            return Err(Error::api(
                response.status().as_u16(),
                "Failed to get CSRF token",
            ));
        }
        let body: CsrfResponse = response
            .json()
            .await
            .map_err(|e| transport_error(&url, &e))?;
        Ok(body.csrf_token)
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// `stale` is the access token the caller was using. If the stored token
    /// no longer matches it, a concurrent caller already refreshed and that
    /// token is returned without another exchange.
    ///
    /// Returns `Ok(None)` when there is no refresh token or the exchange fails
    /// for any reason; only session store errors are propagated.
    pub async fn refresh(&self, stale: Option<&str>) -> Result<Option<String>> {
        let _guard = self.refresh_lock.lock().await;

        let session = self.store.load()?;
        if let Some(current) = session.access_token.as_deref() {
            if Some(current) != stale {
                tracing::debug!("access token already refreshed");
                return Ok(Some(current.to_string()));
            }
        }
        let Some(refresh_token) = session.refresh_token else {
            tracing::debug!("no refresh token, skipping refresh");
            return Ok(None);
        };

        let csrf = match self.csrf_token().await {
            Ok(csrf) => csrf,
            Err(e) => {
                tracing::warn!(error = %e, "could not obtain CSRF token for refresh");
                return Ok(None);
            }
        };

        let url = join_url(&self.admin_base, REFRESH_PATH);
        let response = match self
            .http
            .post(&url)
            .timeout(self.timeout)
            .header(CSRF_HEADER, csrf)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "token refresh request failed");
                return Ok(None);
            }
        };
        if !response.status().is_success() {
            tracing::info!(status = response.status().as_u16(), "token refresh rejected");
            return Ok(None);
        }
        let refreshed: RefreshResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "unreadable token refresh response");
                return Ok(None);
            }
        };

        let mut session = self.store.load()?;
        session.access_token = Some(refreshed.access_token.clone());
        self.store.save(&session)?;
        tracing::debug!("access token refreshed");
        Ok(Some(refreshed.access_token))
    }

    /// Log in and persist the new session. A 401 here means bad credentials,
    /// not an expired session, so nothing is cleared.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let csrf_url = join_url(&self.admin_base, CSRF_PATH);
        let csrf = match token_from_jar(&self.jar, &self.admin_base) {
            Some(token) => token,
            None => self.fetch_csrf(None).await.map_err(|_| {
                Error::network(
                    &csrf_url,
                    "Não foi possível conectar ao Admin API. Verifique se o admin-service está rodando (porta 8082).",
                )
            })?,
        };

        let url = join_url(&self.admin_base, LOGIN_PATH);
        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .header(CSRF_HEADER, &csrf)
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await
            .map_err(|_| {
                Error::network(
                    &url,
                    "Erro de conexão com o Admin API. Verifique se o admin-service está rodando.",
                )
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::unauthorized(
                "Email ou senha inválidos. Verifique as credenciais.",
            ));
        }
        if !status.is_success() {
            let message = match response.json::<serde_json::Value>().await {
                Ok(body) if body.get("detail").is_some_and(|d| d.is_string()) => detail_message(&body),
                _ => "Login failed".to_string(),
            };
            return Err(Error::api(status.as_u16(), message));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| transport_error(&url, &e))?;

        let role = match login.role.as_deref() {
            Some(claim) => Role::from_claim(Some(claim)),
            None => role_from_jwt(&login.access_token),
        };
        self.store.save(&Session {
            access_token: Some(login.access_token.clone()),
            refresh_token: login.refresh_token.clone(),
            csrf_token: Some(csrf),
            email: login.email.clone().or_else(|| Some(email.to_string())),
            role: Some(role),
        })?;
        tracing::info!(email, %role, "logged in");
        Ok(login)
    }

    /// Forget the local session
    pub fn logout(&self) -> Result<()> {
        tracing::info!("session cleared");
        self.store.clear()
    }
}
