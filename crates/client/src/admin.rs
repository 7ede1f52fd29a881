//! Admin console API (`/v1/admin/...`)

use serde_json::json;
use voketag_core::{
    AnchorList, AuditLogEntry, Batch, BatchList, DashboardOverview, GodModeState, JsonObject,
    LoginHistoryEntry, MerkleTreeResponse, MessageResponse, Result, ScanList, SystemStatus,
    SystemStatusExtended, TagModeration, User, UserCreate, UserUpdate,
};

use crate::http::{ApiClient, ApiRequest};

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub role: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BatchFilter {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AnchorFilter {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub batch_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub product_id: Option<String>,
    pub country: Option<String>,
    pub risk_min: Option<f64>,
    pub risk_max: Option<f64>,
    pub days: Option<u32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub action: Option<String>,
    pub user_id: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

#[derive(Clone)]
pub struct AdminApi {
    client: ApiClient,
}

impl AdminApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    // Dashboard

    pub async fn dashboard(&self, days: u32) -> Result<JsonObject> {
        self.client
            .json(&ApiRequest::get("/v1/admin/dashboard").query("days", days))
            .await
    }

    pub async fn dashboard_batches(&self, days: u32) -> Result<JsonObject> {
        self.client
            .json(&ApiRequest::get("/v1/admin/dashboard/batches").query("days", days))
            .await
    }

    pub async fn dashboard_scans(&self, days: u32) -> Result<JsonObject> {
        self.client
            .json(&ApiRequest::get("/v1/admin/dashboard/scans").query("days", days))
            .await
    }

    /// All three dashboard reads at once; any failure fails the whole overview
    pub async fn dashboard_overview(&self, days: u32) -> Result<DashboardOverview> {
        let (summary, batches, scans) = futures::try_join!(
            self.dashboard(days),
            self.dashboard_batches(days),
            self.dashboard_scans(days)
        )?;
        Ok(DashboardOverview {
            summary,
            batches,
            scans,
        })
    }

    // System

    pub async fn system_status(&self) -> Result<SystemStatus> {
        self.client.json(&ApiRequest::get("/v1/admin/system/status")).await
    }

    pub async fn system_status_extended(&self) -> Result<SystemStatusExtended> {
        self.client
            .json(&ApiRequest::get("/v1/admin/system/status/extended"))
            .await
    }

    pub async fn system_config(&self) -> Result<JsonObject> {
        self.client.json(&ApiRequest::get("/v1/admin/system/config")).await
    }

    /// Prometheus exposition text
    pub async fn prometheus_metrics(&self) -> Result<String> {
        self.client.text(&ApiRequest::get("/v1/admin/system/metrics")).await
    }

    pub async fn retry_batch(&self, batch_id: &str) -> Result<JsonObject> {
        self.client
            .json(&ApiRequest::post(format!("/v1/admin/system/batches/{batch_id}/retry")))
            .await
    }

    pub async fn retry_anchor(&self, anchor_id: &str) -> Result<JsonObject> {
        self.client
            .json(&ApiRequest::post(format!("/v1/admin/system/anchors/{anchor_id}/retry")))
            .await
    }

    // Users

    pub async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>> {
        let request = ApiRequest::get("/v1/admin/users")
            .query_opt("skip", filter.skip)
            .query_opt("limit", filter.limit)
            .query_opt("role", filter.role.as_deref())
            .query_opt("search", filter.search.as_deref());
        self.client.json(&request).await
    }

    pub async fn create_user(&self, user: &UserCreate) -> Result<User> {
        self.client
            .json(&ApiRequest::post("/v1/admin/users").json(user)?)
            .await
    }

    pub async fn update_user(&self, user_id: &str, update: &UserUpdate) -> Result<User> {
        self.client
            .json(&ApiRequest::patch(format!("/v1/admin/users/{user_id}")).json(update)?)
            .await
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<MessageResponse> {
        self.client
            .json(&ApiRequest::delete(format!("/v1/admin/users/{user_id}")))
            .await
    }

    pub async fn block_user(&self, user_id: &str) -> Result<MessageResponse> {
        self.user_action(user_id, "block").await
    }

    pub async fn unblock_user(&self, user_id: &str) -> Result<MessageResponse> {
        self.user_action(user_id, "unblock").await
    }

    pub async fn force_logout(&self, user_id: &str) -> Result<MessageResponse> {
        self.user_action(user_id, "force-logout").await
    }

    pub async fn reset_password(&self, user_id: &str, new_password: &str) -> Result<MessageResponse> {
        let request = ApiRequest::post(format!("/v1/admin/users/{user_id}/admin-reset-password"))
            .json(&json!({ "new_password": new_password }))?;
        self.client.json(&request).await
    }

    pub async fn login_history(&self, user_id: &str, limit: u32) -> Result<Vec<LoginHistoryEntry>> {
        self.client
            .json(
                &ApiRequest::get(format!("/v1/admin/users/{user_id}/login-history"))
                    .query("limit", limit),
            )
            .await
    }

    async fn user_action(&self, user_id: &str, action: &str) -> Result<MessageResponse> {
        self.client
            .json(&ApiRequest::post(format!("/v1/admin/users/{user_id}/{action}")))
            .await
    }

    // Factory data

    pub async fn list_batches(&self, filter: &BatchFilter) -> Result<BatchList> {
        let request = ApiRequest::get("/v1/admin/factory/batches")
            .query_opt("skip", filter.skip)
            .query_opt("limit", filter.limit)
            .query_opt("status", filter.status.as_deref());
        self.client.json(&request).await
    }

    pub async fn batch_detail(&self, batch_id: &str) -> Result<Batch> {
        self.client
            .json(&ApiRequest::get(format!("/v1/admin/factory/batches/{batch_id}")))
            .await
    }

    pub async fn merkle_tree(&self, batch_id: &str) -> Result<MerkleTreeResponse> {
        self.client
            .json(&ApiRequest::get(format!(
                "/v1/admin/factory/batches/{batch_id}/merkle-tree"
            )))
            .await
    }

    pub async fn list_anchors(&self, filter: &AnchorFilter) -> Result<AnchorList> {
        let request = ApiRequest::get("/v1/admin/factory/anchors")
            .query_opt("skip", filter.skip)
            .query_opt("limit", filter.limit)
            .query_opt("status", filter.status.as_deref())
            .query_opt("batch_id", filter.batch_id.as_deref());
        self.client.json(&request).await
    }

    // Scans

    pub async fn list_scans(&self, filter: &ScanFilter) -> Result<ScanList> {
        let request = ApiRequest::get("/v1/admin/scans")
            .query_opt("skip", filter.skip)
            .query_opt("limit", filter.limit)
            .query_opt("product_id", filter.product_id.as_deref())
            .query_opt("country", filter.country.as_deref())
            .query_opt("risk_min", filter.risk_min)
            .query_opt("risk_max", filter.risk_max)
            .query_opt("days", filter.days)
            .query_opt("status", filter.status.as_deref());
        self.client.json(&request).await
    }

    pub async fn block_scan(&self, tag_id: &str) -> Result<MessageResponse> {
        self.scan_action(tag_id, "block").await
    }

    pub async fn observe_scan(&self, tag_id: &str) -> Result<MessageResponse> {
        self.scan_action(tag_id, "observation").await
    }

    pub async fn mark_fraud(&self, tag_id: &str) -> Result<MessageResponse> {
        self.scan_action(tag_id, "fraud").await
    }

    pub async fn set_scan_status(&self, tag_id: &str, status: TagModeration) -> Result<MessageResponse> {
        self.client
            .json(
                &ApiRequest::patch(format!("/v1/admin/scans/{tag_id}/status"))
                    .query("status", status.as_str()),
            )
            .await
    }

    async fn scan_action(&self, tag_id: &str, action: &str) -> Result<MessageResponse> {
        self.client
            .json(&ApiRequest::post(format!("/v1/admin/scans/{tag_id}/{action}")))
            .await
    }

    // Analytics

    pub async fn analytics_fraud(&self, days: Option<u32>, min_risk_score: Option<u32>) -> Result<JsonObject> {
        let request = ApiRequest::get("/v1/admin/analytics/fraud")
            .query("days", days.unwrap_or(30))
            .query("min_risk_score", min_risk_score.unwrap_or(70));
        self.client.json(&request).await
    }

    pub async fn analytics_geographic(&self, days: u32) -> Result<JsonObject> {
        self.analytics("geographic", "days", days).await
    }

    pub async fn analytics_trends(&self, days: u32) -> Result<JsonObject> {
        self.analytics("trends", "days", days).await
    }

    pub async fn analytics_heatmap(&self, days: Option<u32>, min_risk: Option<u32>) -> Result<JsonObject> {
        let request = ApiRequest::get("/v1/admin/analytics/heatmap")
            .query("days", days.unwrap_or(7))
            .query("min_risk", min_risk.unwrap_or(50));
        self.client.json(&request).await
    }

    pub async fn analytics_scans_per_minute(&self, hours: u32) -> Result<JsonObject> {
        self.analytics("scans-per-minute", "hours", hours).await
    }

    pub async fn analytics_frauds_per_hour(&self, days: u32) -> Result<JsonObject> {
        self.analytics("frauds-per-hour", "days", days).await
    }

    pub async fn analytics_risk_evolution(&self, days: u32) -> Result<JsonObject> {
        self.analytics("risk-evolution", "days", days).await
    }

    async fn analytics(&self, report: &str, key: &str, value: u32) -> Result<JsonObject> {
        self.client
            .json(&ApiRequest::get(format!("/v1/admin/analytics/{report}")).query(key, value))
            .await
    }

    // Audit

    pub async fn audit_logs(&self, filter: &AuditFilter) -> Result<Vec<AuditLogEntry>> {
        let request = ApiRequest::get("/v1/admin/audit/logs")
            .query_opt("skip", filter.skip)
            .query_opt("limit", filter.limit)
            .query_opt("entity_type", filter.entity_type.as_deref())
            .query_opt("entity_id", filter.entity_id.as_deref())
            .query_opt("action", filter.action.as_deref())
            .query_opt("user_id", filter.user_id.as_deref())
            .query_opt("search", filter.search.as_deref());
        self.client.json(&request).await
    }

    /// Raw export file contents
    pub async fn export_audit_logs(&self, format: ExportFormat, entity_type: Option<&str>) -> Result<Vec<u8>> {
        let request = ApiRequest::get("/v1/admin/audit/export")
            .query("format", format.as_str())
            .query_opt("entity_type", entity_type);
        self.client.bytes(&request).await
    }

    // God mode (super admin)

    pub async fn god_mode_state(&self) -> Result<GodModeState> {
        self.client.json(&ApiRequest::get("/v1/admin/god-mode/state")).await
    }

    pub async fn set_kill_switch(&self, active: bool) -> Result<MessageResponse> {
        self.god_mode("kill-switch", json!({ "active": active })).await
    }

    pub async fn set_investigation_mode(&self, active: bool) -> Result<MessageResponse> {
        self.god_mode("investigation", json!({ "active": active })).await
    }

    pub async fn set_max_alert_mode(&self, active: bool) -> Result<MessageResponse> {
        self.god_mode("max-alert", json!({ "active": active })).await
    }

    pub async fn set_risk_limit(&self, limit: u32) -> Result<MessageResponse> {
        self.god_mode("risk-limit", json!({ "limit": limit })).await
    }

    pub async fn block_country(&self, country: &str) -> Result<MessageResponse> {
        self.god_mode("block-country", json!({ "country": country })).await
    }

    pub async fn unblock_country(&self, country: &str) -> Result<MessageResponse> {
        self.god_mode("unblock-country", json!({ "country": country })).await
    }

    pub async fn invalidate_all_jwt(&self) -> Result<MessageResponse> {
        self.client
            .json(&ApiRequest::post("/v1/admin/god-mode/invalidate-all-jwt"))
            .await
    }

    async fn god_mode(&self, action: &str, body: serde_json::Value) -> Result<MessageResponse> {
        let request = ApiRequest::post(format!("/v1/admin/god-mode/{action}")).json(&body)?;
        self.client.json(&request).await
    }
}
