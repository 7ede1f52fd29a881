//! Authenticated JSON client shared by the admin and factory APIs
//!
//! Every call goes through [`ApiClient::send`]: bearer token from the session,
//! CSRF header on mutations, one refresh on 401, and error bodies mapped to
//! [`Error`] variants.

use reqwest::cookie::Jar;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use url::Url;
use voketag_config::HttpSettings;
use voketag_core::{Error, Result, CSRF_HEADER};
use voketag_utils::tracing::request_span;

use crate::auth::Auth;
use crate::csrf::is_mutation;

/// Build the process-wide HTTP client. The cookie jar is shared so cookies
/// set by one backend are visible to CSRF lookups. Total request timeouts are
/// applied per request so event streams can stay open.
pub fn build_http(settings: &HttpSettings) -> Result<(reqwest::Client, Arc<Jar>)> {
    let jar = Arc::new(Jar::default());
    let client = reqwest::Client::builder()
        .connect_timeout(settings.timeout)
        .cookie_provider(Arc::clone(&jar))
        .user_agent(concat!("voketag/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::configuration(format!("failed to build HTTP client: {e}")))?;
    Ok((client, jar))
}

/// `base` + `path` without losing a path prefix such as `/v1`
#[must_use]
pub fn join_url(base: &Url, path: &str) -> String {
    format!("{}{}", base.as_str().trim_end_matches('/'), path)
}

pub(crate) fn transport_error(url: &str, error: &reqwest::Error) -> Error {
    Error::network(url, error.to_string())
}

/// Human message from an error body: `detail` when it is a string, otherwise
/// the JSON of `detail` (or of the whole body), otherwise the status text.
pub async fn error_message(response: Response) -> String {
    let status = response.status();
    let fallback = status
        .canonical_reason()
        .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string);
    match response.bytes().await {
        Ok(body) => match serde_json::from_slice::<Value>(&body) {
            Ok(json) => detail_message(&json),
            Err(_) => fallback,
        },
        Err(_) => fallback,
    }
}

#[must_use]
pub fn detail_message(body: &Value) -> String {
    match body.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(detail) if is_truthy(detail) => detail.to_string(),
        _ => body.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug, Clone)]
enum Body {
    Empty,
    Json(Value),
    File {
        field: String,
        file_name: String,
        content: Vec<u8>,
        mime: String,
    },
}

/// Description of one call, replayable for the post-refresh retry
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Body,
    timeout: Option<Duration>,
    streaming: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: Body::Empty,
            timeout: None,
            streaming: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Add the parameter only when it is set and not empty
    #[must_use]
    pub fn query_opt<T: ToString>(self, key: &str, value: Option<T>) -> Self {
        match value.map(|v| v.to_string()) {
            Some(v) if !v.is_empty() => self.query(key, v),
            _ => self,
        }
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Body::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    #[must_use]
    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        content: Vec<u8>,
        mime: impl Into<String>,
    ) -> Self {
        self.body = Body::File {
            field: field.into(),
            file_name: file_name.into(),
            content,
            mime: mime.into(),
        };
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Long-lived response body: no total timeout
    #[must_use]
    pub fn streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    fn apply(&self, mut builder: RequestBuilder, default_timeout: Duration) -> Result<RequestBuilder> {
        if !self.query.is_empty() {
            builder = builder.query(&self.query);
        }
        if !self.streaming {
            builder = builder.timeout(self.timeout.unwrap_or(default_timeout));
        }
        Ok(match &self.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::File {
                field,
                file_name,
                content,
                mime,
            } => {
                let part = Part::bytes(content.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime)
                    .map_err(|e| Error::validation("mime", e.to_string()))?;
                builder.multipart(Form::new().part(field.clone(), part))
            }
        })
    }
}

/// Client bound to one backend base URL
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    auth: Arc<Auth>,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base: Url, auth: Arc<Auth>, timeout: Duration) -> Self {
        Self {
            http,
            base,
            auth,
            timeout,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base, path)
    }

    /// Send with authentication and return the successful response.
    ///
    /// 401 triggers exactly one refresh and one retry. A second 401, or a
    /// failed refresh, clears the session and yields [`Error::SessionExpired`].
    pub async fn send(&self, request: &ApiRequest) -> Result<Response> {
        let url = self.url(&request.path);
        let span = request_span(request.method.as_str(), &url);
        self.send_authorized(&url, request).instrument(span).await
    }

    async fn send_authorized(&self, url: &str, request: &ApiRequest) -> Result<Response> {
        let mutating = is_mutation(&request.method);

        let mut token = self.auth.access_token()?;
        if token.is_none() {
            token = self.auth.refresh(None).await?;
        }
        let mut csrf = if mutating {
            Some(self.auth.csrf_token().await?)
        } else {
            None
        };

        let mut response = self
            .send_once(url, request, token.as_deref(), csrf.as_deref())
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!("access token rejected, refreshing");
            if let Some(fresh) = self.auth.refresh(token.as_deref()).await? {
                if mutating {
                    csrf = Some(self.auth.csrf_token().await?);
                }
                response = self
                    .send_once(url, request, Some(&fresh), csrf.as_deref())
                    .await?;
            }
            if response.status() == StatusCode::UNAUTHORIZED {
                tracing::warn!("session no longer accepted, clearing it");
                self.auth.clear()?;
                return Err(Error::SessionExpired);
            }
        }

        let status = response.status();
        if status == StatusCode::FORBIDDEN && mutating {
            self.auth.forget_csrf()?;
            return Err(Error::CsrfRejected);
        }
        if !status.is_success() {
            let message = error_message(response).await;
            tracing::debug!(status = status.as_u16(), %message, "request failed");
            return Err(Error::api(status.as_u16(), message));
        }
        Ok(response)
    }

    async fn send_once(
        &self,
        url: &str,
        request: &ApiRequest,
        token: Option<&str>,
        csrf: Option<&str>,
    ) -> Result<Response> {
        let mut builder = self.http.request(request.method.clone(), url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(csrf) = csrf {
            builder = builder.header(CSRF_HEADER, csrf);
        }
        request
            .apply(builder, self.timeout)?
            .send()
            .await
            .map_err(|e| transport_error(url, &e))
    }

    /// Decode a JSON body; 204 decodes as `{}`
    pub async fn json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let response = self.send(request).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(serde_json::from_value(Value::Object(Map::new()))?);
        }
        let url = response.url().to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(&url, &e))?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn text(&self, request: &ApiRequest) -> Result<String> {
        let response = self.send(request).await?;
        let url = response.url().to_string();
        response.text().await.map_err(|e| transport_error(&url, &e))
    }

    pub async fn bytes(&self, request: &ApiRequest) -> Result<Vec<u8>> {
        let response = self.send(request).await?;
        let url = response.url().to_string();
        Ok(response
            .bytes()
            .await
            .map_err(|e| transport_error(&url, &e))?
            .to_vec())
    }
}
