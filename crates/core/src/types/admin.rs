use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::DEFAULT_VERIFY_URL;

/// Free-form JSON object returned by dashboard and analytics endpoints
pub type JsonObject = Map<String, Value>;

/// Plain `{ "message": ... }` acknowledgement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
    #[serde(flatten)]
    pub extra: JsonObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    #[serde(default)]
    pub risk_score: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginHistoryEntry {
    pub id: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub service: String,
    #[serde(default)]
    pub url: Option<String>,
    pub status: String,
    #[serde(default)]
    pub latency_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub services: Vec<ServiceStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatusExtended {
    pub uptime_seconds: f64,
    pub redis_status: String,
    pub postgres_status: String,
    #[serde(default)]
    pub metrics_24h: JsonObject,
    #[serde(default)]
    pub services: Vec<ServiceStatus>,
    #[serde(default)]
    pub api_latency_avg_ms: Option<f64>,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub memory_used_mb: f64,
    pub memory_total_mb: f64,
}

/// Audit entry. Backends attach varying extra fields which are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub changes: Option<Value>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Audit entry as exposed by the factory service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryAuditLog {
    pub id: String,
    pub action: String,
    pub actor: String,
    #[serde(default)]
    pub ip: String,
    pub timestamp: String,
    #[serde(default)]
    pub details: Option<JsonObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryAuditLogList {
    pub items: Vec<FactoryAuditLog>,
    pub total: u64,
}

/// Admin dashboard with its batch and scan breakdowns, fetched together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub summary: JsonObject,
    pub batches: JsonObject,
    pub scans: JsonObject,
}

/// Super-admin emergency controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GodModeState {
    pub kill_switch: bool,
    pub investigation_mode: bool,
    pub max_alert_mode: bool,
    pub risk_limit: f64,
    #[serde(default)]
    pub blocked_countries: Vec<String>,
}

/// Body of `/v1/health` and `/v1/ready`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NtagModel {
    #[serde(rename = "213")]
    Ntag213,
    #[serde(rename = "215")]
    Ntag215,
    #[serde(rename = "216")]
    Ntag216,
}

/// Factory-level configuration shown in the operator portal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorySettings {
    pub verification_url: String,
    pub ntag_default: NtagModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    pub antifraud_scan_threshold: u32,
    pub sandbox_mode: bool,
}

impl Default for FactorySettings {
    fn default() -> Self {
        Self {
            verification_url: DEFAULT_VERIFY_URL.to_string(),
            ntag_default: NtagModel::Ntag216,
            webhook_url: None,
            antifraud_scan_threshold: 5,
            sandbox_mode: false,
        }
    }
}

/// Partial settings change; unset fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub verification_url: Option<String>,
    pub ntag_default: Option<NtagModel>,
    pub webhook_url: Option<String>,
    pub antifraud_scan_threshold: Option<u32>,
    pub sandbox_mode: Option<bool>,
}

impl FactorySettings {
    #[must_use]
    pub fn merged(mut self, update: SettingsUpdate) -> Self {
        if let Some(v) = update.verification_url {
            self.verification_url = v;
        }
        if let Some(v) = update.ntag_default {
            self.ntag_default = v;
        }
        if let Some(v) = update.webhook_url {
            self.webhook_url = Some(v);
        }
        if let Some(v) = update.antifraud_scan_threshold {
            self.antifraud_scan_threshold = v;
        }
        if let Some(v) = update.sandbox_mode {
            self.sandbox_mode = v;
        }
        self
    }
}
