//! Factory operator API (`{factory_api}/...`, version prefix included in the base)

use async_trait::async_trait;
use serde::Serialize;
use voketag_anchor::BatchBackend;
use voketag_core::{
    AntifraudEvent, Batch, BatchCreateRequest, BatchCreateResponse, BatchProduct, BatchStatus,
    BatchStatusResponse, FactoryAuditLogList, FactorySettings, JsonObject, MessageResponse,
    Result, RiskStatus, ScanEvent, ScanEventList, SettingsUpdate,
};

use crate::http::{ApiClient, ApiRequest};

#[derive(Debug, Clone, Default)]
pub struct BatchQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub risk: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ScanQuery {
    pub batch_id: Option<String>,
    pub country: Option<String>,
    pub risk_status: Option<RiskStatus>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub limit: Option<u32>,
    pub skip: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub action: Option<String>,
    pub actor: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// Batch counters for the operator dashboard, derived from the latest batches
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_batches: usize,
    pub pending_batches: usize,
    pub error_batches: usize,
    pub total_tags: u64,
    pub last_anchorages: Vec<Batch>,
}

impl BatchSummary {
    const RECENT: usize = 5;

    #[must_use]
    pub fn from_batches(batches: &[Batch]) -> Self {
        let pending = batches
            .iter()
            .filter(|b| {
                matches!(
                    b.status,
                    BatchStatus::Pending | BatchStatus::Processing | BatchStatus::Anchoring
                )
            })
            .count();
        let failed = batches.iter().filter(|b| b.status.is_failure()).count();
        Self {
            total_batches: batches.len(),
            pending_batches: pending,
            error_batches: failed,
            total_tags: batches.iter().map(|b| b.product_count).sum(),
            last_anchorages: batches.iter().take(Self::RECENT).cloned().collect(),
        }
    }

    /// Percentage of batches that are not settled yet or failed, capped at 100
    #[must_use]
    pub fn risk_rate(&self) -> u32 {
        let unsettled = (self.error_batches + self.pending_batches) as f64;
        let rate = (unsettled / self.total_batches.max(1) as f64 * 100.0).round();
        rate.min(100.0) as u32
    }
}

#[derive(Clone)]
pub struct FactoryApi {
    client: ApiClient,
}

impl FactoryApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn list_batches(&self, query: &BatchQuery) -> Result<Vec<Batch>> {
        let request = ApiRequest::get("/batches")
            .query_opt("skip", query.skip)
            .query_opt("limit", query.limit)
            .query_opt("status", query.status.as_deref())
            .query_opt("risk", query.risk.as_deref())
            .query_opt("date_from", query.date_from.as_deref())
            .query_opt("date_to", query.date_to.as_deref())
            .query_opt("search", query.search.as_deref());
        self.client.json(&request).await
    }

    pub async fn get_batch(&self, batch_id: &str) -> Result<Batch> {
        self.client
            .json(&ApiRequest::get(format!("/batches/{batch_id}")))
            .await
    }

    pub async fn batch_status(&self, batch_id: &str) -> Result<BatchStatusResponse> {
        self.client
            .json(&ApiRequest::get(format!("/batches/{batch_id}/status")))
            .await
    }

    pub async fn create_batch(&self, request: &BatchCreateRequest) -> Result<BatchCreateResponse> {
        self.client
            .json(&ApiRequest::post("/batches").json(request)?)
            .await
    }

    /// Multipart upload of the raw CSV in the `file` field
    pub async fn upload_csv(&self, batch_id: &str, file_name: &str, content: Vec<u8>) -> Result<JsonObject> {
        let request = ApiRequest::post(format!("/batches/{batch_id}/csv")).file(
            "file",
            file_name,
            content,
            "text/csv",
        );
        self.client.json(&request).await
    }

    pub async fn retry_batch(&self, batch_id: &str) -> Result<MessageResponse> {
        self.client
            .json(&ApiRequest::post(format!("/batches/{batch_id}/retry")))
            .await
    }

    /// Empty when the products cannot be read
    pub async fn batch_products(&self, batch_id: &str) -> Vec<BatchProduct> {
        self.client
            .json(&ApiRequest::get(format!("/batches/{batch_id}/products")))
            .await
            .unwrap_or_else(|e| {
                tracing::debug!(batch_id, error = %e, "batch products unavailable");
                Vec::new()
            })
    }

    /// Empty when the events cannot be read
    pub async fn antifraud_events(&self, batch_id: &str) -> Vec<AntifraudEvent> {
        self.client
            .json(&ApiRequest::get(format!("/batches/{batch_id}/antifraud-events")))
            .await
            .unwrap_or_else(|e| {
                tracing::debug!(batch_id, error = %e, "antifraud events unavailable");
                Vec::new()
            })
    }

    pub async fn batch_summary(&self) -> Result<BatchSummary> {
        let batches = self
            .list_batches(&BatchQuery {
                limit: Some(100),
                ..BatchQuery::default()
            })
            .await?;
        Ok(BatchSummary::from_batches(&batches))
    }

    pub async fn list_scans(&self, query: &ScanQuery) -> Result<ScanEventList> {
        let risk = query.risk_status.map(|r| match r {
            RiskStatus::Low => "low",
            RiskStatus::Medium => "medium",
            RiskStatus::High => "high",
        });
        let request = ApiRequest::get("/scans")
            .query_opt("batch_id", query.batch_id.as_deref())
            .query_opt("country", query.country.as_deref())
            .query_opt("risk_status", risk)
            .query_opt("date_from", query.date_from.as_deref())
            .query_opt("date_to", query.date_to.as_deref())
            .query_opt("limit", query.limit)
            .query_opt("skip", query.skip);
        self.client.json(&request).await
    }

    pub async fn get_scan(&self, scan_id: &str) -> Result<ScanEvent> {
        self.client
            .json(&ApiRequest::get(format!("/scans/{scan_id}")))
            .await
    }

    /// Server settings, or the defaults when they cannot be read
    pub async fn settings(&self) -> FactorySettings {
        match self.client.json(&ApiRequest::get("/settings")).await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "using default factory settings");
                FactorySettings::default()
            }
        }
    }

    /// Merge `update` into the current settings and store the result. When the
    /// write fails the merged value is still returned, so the caller sees what
    /// it asked for.
    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<FactorySettings> {
        let next = self.settings().await.merged(update);
        let request = ApiRequest::put("/settings").json(&next)?;
        match self.client.json(&request).await {
            Ok(saved) => Ok(saved),
            Err(e) => {
                tracing::warn!(error = %e, "settings not saved on the server");
                Ok(next)
            }
        }
    }

    pub async fn audit_logs(&self, query: &LogQuery) -> Result<FactoryAuditLogList> {
        let request = ApiRequest::get("/audit/logs")
            .query_opt("skip", query.skip)
            .query_opt("limit", query.limit)
            .query_opt("action", query.action.as_deref())
            .query_opt("actor", query.actor.as_deref())
            .query_opt("date_from", query.date_from.as_deref())
            .query_opt("date_to", query.date_to.as_deref());
        self.client.json(&request).await
    }
}

#[async_trait]
impl BatchBackend for FactoryApi {
    async fn create_batch(&self, request: &BatchCreateRequest) -> Result<BatchCreateResponse> {
        FactoryApi::create_batch(self, request).await
    }

    async fn upload_csv(&self, batch_id: &str, file_name: &str, content: Vec<u8>) -> Result<()> {
        FactoryApi::upload_csv(self, batch_id, file_name, content)
            .await
            .map(|_| ())
    }

    async fn batch_status(&self, batch_id: &str) -> Result<BatchStatusResponse> {
        FactoryApi::batch_status(self, batch_id).await
    }

    async fn retry_batch(&self, batch_id: &str) -> Result<()> {
        FactoryApi::retry_batch(self, batch_id).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(id: &str, status: BatchStatus, count: u64) -> Batch {
        serde_json::from_value(serde_json::json!({
            "id": id, "status": status.as_str(), "product_count": count
        }))
        .unwrap()
    }

    #[test]
    fn test_summary_counts() {
        let batches = vec![
            batch("a", BatchStatus::Completed, 10),
            batch("b", BatchStatus::Processing, 5),
            batch("c", BatchStatus::AnchorFailed, 3),
            batch("d", BatchStatus::Pending, 2),
        ];
        let summary = BatchSummary::from_batches(&batches);
        assert_eq!(summary.total_batches, 4);
        assert_eq!(summary.pending_batches, 2);
        assert_eq!(summary.error_batches, 1);
        assert_eq!(summary.total_tags, 20);
        assert_eq!(summary.risk_rate(), 75);
    }

    #[test]
    fn test_summary_keeps_five_most_recent() {
        let batches: Vec<_> = (0..8)
            .map(|i| batch(&format!("b{i}"), BatchStatus::Completed, 1))
            .collect();
        let summary = BatchSummary::from_batches(&batches);
        assert_eq!(summary.last_anchorages.len(), 5);
        assert_eq!(summary.last_anchorages[0].id, "b0");
    }

    #[test]
    fn test_empty_summary_has_zero_risk() {
        assert_eq!(BatchSummary::from_batches(&[]).risk_rate(), 0);
    }
}
