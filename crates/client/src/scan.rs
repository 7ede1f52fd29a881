//! Consumer scan, report and token verification API
//!
//! These endpoints are public: no bearer token and no refresh. A CSRF cookie
//! already in the shared jar is still echoed on POSTs.

use reqwest::cookie::Jar;
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::Instrument;
use url::Url;
use voketag_config::HttpSettings;
use voketag_core::{
    Error, FraudReport, ReportRequest, Result, ScanMetadata, ScanProduct, ScanResponse,
    ScanStatus, VerificationResponse, CSRF_HEADER, FINGERPRINT_HEADER, LATITUDE_HEADER,
    LONGITUDE_HEADER,
};
use voketag_utils::tracing::request_span;
use voketag_utils::{retry_async, RetryConfig};

use crate::csrf::token_from_jar;
use crate::http::join_url;

pub const SCAN_PATH: &str = "/v1/scan";
pub const REPORT_PATH: &str = "/v1/report";
pub const VERIFY_PATH: &str = "/api/verify";
pub const FRAUD_REPORT_PATH: &str = "/api/fraud/report";

const TOO_MANY_SCANS: &str = "Muitas tentativas. Tente novamente em alguns instantes.";
const SCAN_UNAVAILABLE: &str = "Verificação temporariamente indisponível.";
const SCAN_TIMED_OUT: &str = "Tempo esgotado. Verifique sua conexão.";
const SCAN_FAILED: &str = "Erro ao verificar produto.";
const REPORT_FAILED: &str = "Erro ao enviar reporte.";

/// Code carried by a QR/NFC payload: the `serial` query parameter, then
/// `tag_id`, then the last path segment. Anything that is not a URL is used
/// as-is after trimming.
#[must_use]
pub fn extract_code(payload: &str) -> String {
    let trimmed = payload.trim();
    if let Ok(url) = Url::parse(trimmed) {
        let param = |key: &str| {
            url.query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
        };
        let code = param("serial")
            .or_else(|| param("tag_id"))
            .or_else(|| url.path().rsplit('/').next().map(str::to_string));
        if let Some(code) = code.filter(|c| !c.is_empty()) {
            return code;
        }
    }
    trimmed.to_string()
}

#[derive(Debug, Default, Deserialize)]
struct RawProduct {
    name: Option<String>,
    batch: Option<String>,
    factory: Option<String>,
    manufactured_at: Option<String>,
}

/// Scan service body; every field is optional and filled in by [`RawScan::into_response`]
#[derive(Debug, Default, Deserialize)]
struct RawScan {
    status: Option<ScanStatus>,
    valid: Option<bool>,
    scan_count: Option<u64>,
    product: Option<RawProduct>,
    batch_id: Option<String>,
    manufactured_at: Option<String>,
    first_scan_at: Option<String>,
    timestamp: Option<String>,
    risk_score: Option<f64>,
}

impl RawScan {
    fn into_response(self) -> ScanResponse {
        let status = self.status.unwrap_or_else(|| {
            ScanStatus::from_validity(self.valid.unwrap_or(false), self.scan_count.unwrap_or(1))
        });
        let batch_id = self.batch_id;
        let manufactured_at = self.manufactured_at;
        let product = self.product.map(|p| ScanProduct {
            name: p.name.unwrap_or_else(|| "Produto".to_string()),
            batch: p.batch.or(batch_id).unwrap_or_else(|| "-".to_string()),
            factory: p.factory.unwrap_or_else(|| "Voke Brasil".to_string()),
            manufactured_at: p
                .manufactured_at
                .or(manufactured_at)
                .unwrap_or_else(|| "-".to_string()),
        });
        ScanResponse {
            status,
            product,
            scan_count: Some(self.scan_count.unwrap_or(1)),
            first_scan_at: self.first_scan_at.or(self.timestamp),
            risk_score: Some(self.risk_score.unwrap_or(0.0)),
        }
    }
}

/// Browser-style context sent with a token verification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerifyContext {
    pub screen_resolution: Option<String>,
    pub timezone: Option<String>,
    pub language: Option<String>,
}

impl VerifyContext {
    /// Context for a terminal: local UTC offset and `LANG`
    #[must_use]
    pub fn from_environment() -> Self {
        Self {
            screen_resolution: None,
            timezone: Some(chrono::Local::now().offset().to_string()),
            language: std::env::var("LANG")
                .ok()
                .map(|lang| lang.split('.').next().unwrap_or_default().replace('_', "-"))
                .filter(|lang| !lang.is_empty()),
        }
    }
}

#[derive(Clone)]
pub struct ScanApi {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base: Url,
    settings: HttpSettings,
}

impl ScanApi {
    pub fn new(http: reqwest::Client, jar: Arc<Jar>, base: Url, settings: HttpSettings) -> Self {
        Self {
            http,
            jar,
            base,
            settings,
        }
    }

    fn post(&self, url: &str) -> RequestBuilder {
        let request = self.http.post(url).timeout(self.settings.timeout);
        match token_from_jar(&self.jar, &self.base) {
            Some(csrf) => request.header(CSRF_HEADER, csrf),
            None => request,
        }
    }

    /// Verify one scanned payload. Unknown or malformed codes come back as a
    /// `fake` result rather than an error.
    pub async fn scan(&self, payload: &str, metadata: &ScanMetadata) -> Result<ScanResponse> {
        let code = extract_code(payload);
        let url = join_url(&self.base, SCAN_PATH);
        let span = request_span("POST", &url);
        self.scan_code(&url, &code, metadata).instrument(span).await
    }

    async fn scan_code(&self, url: &str, code: &str, metadata: &ScanMetadata) -> Result<ScanResponse> {
        let mut request = self
            .post(url)
            .timeout(self.settings.scan_timeout)
            .json(&serde_json::json!({ "code": code }));
        if let Some(fingerprint) = metadata.fingerprint.as_deref().filter(|f| !f.is_empty()) {
            request = request.header(FINGERPRINT_HEADER, fingerprint);
        }
        if let Some(lat) = metadata.latitude {
            request = request.header(LATITUDE_HEADER, lat.to_string());
        }
        if let Some(lng) = metadata.longitude {
            request = request.header(LONGITUDE_HEADER, lng.to_string());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::network(url, SCAN_TIMED_OUT)
            } else {
                tracing::debug!(error = %e, "scan request failed");
                Error::network(url, SCAN_FAILED)
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            tracing::info!(code, status = status.as_u16(), "unknown code reported as fake");
            return Ok(ScanResponse::fake());
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::api(status.as_u16(), TOO_MANY_SCANS));
        }
        if !status.is_success() {
            return Err(Error::api(status.as_u16(), SCAN_UNAVAILABLE));
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                Error::network(url, SCAN_TIMED_OUT)
            } else {
                Error::network(url, SCAN_FAILED)
            }
        })?;
        let raw: RawScan = serde_json::from_slice(&body)?;
        Ok(raw.into_response())
    }

    /// [`ScanApi::scan`] with one more attempt after a short pause, whatever the error
    pub async fn scan_with_retry(&self, payload: &str, metadata: &ScanMetadata) -> Result<ScanResponse> {
        retry_async(
            &RetryConfig::once_after(self.settings.scan_retry_delay),
            |_| true,
            || self.scan(payload, metadata),
        )
        .await
    }

    pub async fn report(&self, report: &ReportRequest) -> Result<()> {
        let url = join_url(&self.base, REPORT_PATH);
        let response = self
            .post(&url)
            .json(report)
            .send()
            .await
            .map_err(|_| Error::network(&url, REPORT_FAILED))?;
        let status = response.status();
        if status.is_success() {
            tracing::info!(code = %report.code, "report sent");
            return Ok(());
        }
        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("message")
                    .and_then(serde_json::Value::as_str)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| REPORT_FAILED.to_string());
        Err(Error::api(status.as_u16(), message))
    }

    /// Verify a signed product token
    pub async fn verify(&self, token: &str, context: &VerifyContext) -> Result<VerificationResponse> {
        let url = join_url(
            &self.base,
            &format!("{VERIFY_PATH}/{}", urlencoding::encode(token)),
        );
        let mut request = self.http.post(&url).timeout(self.settings.timeout);
        if let Some(resolution) = &context.screen_resolution {
            request = request.header("X-Screen-Resolution", resolution);
        }
        if let Some(timezone) = &context.timezone {
            request = request.header("X-Timezone", timezone);
        }
        if let Some(language) = &context.language {
            request = request.header(reqwest::header::ACCEPT_LANGUAGE, language);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::network(&url, e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = match status.as_u16() {
                400 => "Invalid verification token",
                410 => "Verification token expired",
                429 => "Too many verification attempts. Please try again later.",
                _ => "Verification failed. Please try again.",
            };
            return Err(Error::api(status.as_u16(), message));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::network(&url, e.to_string()))?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn report_fraud(&self, report: &FraudReport) -> Result<()> {
        let url = join_url(&self.base, FRAUD_REPORT_PATH);
        let response = self
            .post(&url)
            .json(report)
            .send()
            .await
            .map_err(|e| Error::network(&url, e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::api(
                response.status().as_u16(),
                "Failed to submit fraud report",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_code_prefers_serial() {
        assert_eq!(
            extract_code("https://verify.voketag.com.br/t/ABC?tag_id=T1&serial=SN-9"),
            "SN-9"
        );
        assert_eq!(extract_code("https://v.example/t/ABC?tag_id=T1"), "T1");
        assert_eq!(extract_code("https://v.example/t/ABC"), "ABC");
    }

    #[test]
    fn test_extract_code_raw_text() {
        assert_eq!(
            extract_code("  3f2a9c1e-8b1d-4c7e-9a60-1d2e3f4a5b6c \n"),
            "3f2a9c1e-8b1d-4c7e-9a60-1d2e3f4a5b6c"
        );
    }

    #[test]
    fn test_extract_code_empty_segment_falls_back() {
        assert_eq!(extract_code("https://v.example/"), "https://v.example/");
    }

    #[test]
    fn test_mapping_defaults() {
        let raw: RawScan = serde_json::from_value(serde_json::json!({
            "valid": true,
            "batch_id": "B-7",
            "timestamp": "2026-01-01T00:00:00Z",
            "product": {}
        }))
        .unwrap();
        let response = raw.into_response();
        assert_eq!(response.status, ScanStatus::Original);
        assert_eq!(response.scan_count, Some(1));
        assert_eq!(response.risk_score, Some(0.0));
        assert_eq!(response.first_scan_at.as_deref(), Some("2026-01-01T00:00:00Z"));
        let product = response.product.unwrap();
        assert_eq!(product.name, "Produto");
        assert_eq!(product.batch, "B-7");
        assert_eq!(product.factory, "Voke Brasil");
        assert_eq!(product.manufactured_at, "-");
    }

    #[test]
    fn test_mapping_derives_warning_and_keeps_explicit_status() {
        let raw: RawScan =
            serde_json::from_value(serde_json::json!({"valid": true, "scan_count": 4})).unwrap();
        assert_eq!(raw.into_response().status, ScanStatus::Warning);

        let raw: RawScan =
            serde_json::from_value(serde_json::json!({"status": "fake", "valid": true})).unwrap();
        let response = raw.into_response();
        assert_eq!(response.status, ScanStatus::Fake);
        assert!(response.product.is_none());
    }
}
