use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a batch as reported by the factory/blockchain backends.
///
/// The client never computes a status; it only reads it and decides whether to
/// keep polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Pending,
    Processing,
    Anchoring,
    Completed,
    Failed,
    AnchorFailed,
    /// Any status string this client does not know yet
    #[serde(other)]
    Unknown,
}

impl BatchStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Pending => "pending",
            BatchStatus::Processing => "processing",
            BatchStatus::Anchoring => "anchoring",
            BatchStatus::Completed => "completed",
            BatchStatus::Failed => "failed",
            BatchStatus::AnchorFailed => "anchor_failed",
            BatchStatus::Unknown => "unknown",
        }
    }

    /// `failed` or `anchor_failed`; the only states from which a retry is offered
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, BatchStatus::Failed | BatchStatus::AnchorFailed)
    }

    /// Polling stops on these
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        *self == BatchStatus::Completed || self.is_failure()
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Batch record. Factory and admin APIs return slightly different shapes, so
/// everything beyond id/status/count is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: String,
    pub status: BatchStatus,
    pub product_count: u64,
    #[serde(default)]
    pub factory_id: Option<String>,
    #[serde(default)]
    pub blockchain_tx: Option<String>,
    #[serde(default)]
    pub merkle_root: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub processing_completed_at: Option<String>,
    #[serde(default)]
    pub anchored_at: Option<String>,
    #[serde(default)]
    pub blockchain_task_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchCreateRequest {
    pub product_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchCreateResponse {
    pub batch_id: String,
    pub job_id: String,
    pub status: BatchStatus,
    pub product_count: u64,
    #[serde(default)]
    pub estimated_completion: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchStatusResponse {
    pub batch_id: String,
    pub status: BatchStatus,
    #[serde(default)]
    pub product_count: u64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub processing_completed_at: Option<String>,
    #[serde(default)]
    pub anchored_at: Option<String>,
    #[serde(default)]
    pub blockchain_tx: Option<String>,
    #[serde(default)]
    pub merkle_root: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub celery_task_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchList {
    pub batches: Vec<Batch>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchProduct {
    pub serial_number: String,
    pub batch_id: String,
    #[serde(default)]
    pub product_code: Option<String>,
    #[serde(default)]
    pub qr_code_url: Option<String>,
    #[serde(default)]
    pub nfc_payload: Option<String>,
    #[serde(default)]
    pub blockchain_hash: Option<String>,
    #[serde(default)]
    pub verification_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntifraudEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: String,
    #[serde(default)]
    pub details: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub severity: Option<Severity>,
}

/// Record of committing a batch's Merkle root to the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub id: String,
    pub batch_id: String,
    pub merkle_root: String,
    pub product_count: u64,
    pub status: BatchStatus,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub anchored_at: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorList {
    pub anchors: Vec<Anchor>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminality() {
        assert!(BatchStatus::Completed.is_terminal());
        assert!(BatchStatus::Failed.is_terminal());
        assert!(BatchStatus::AnchorFailed.is_terminal());
        assert!(!BatchStatus::Anchoring.is_terminal());
        assert!(!BatchStatus::Completed.is_failure());
    }

    #[test]
    fn test_unknown_status_does_not_break_decoding() {
        let status: BatchStatus = serde_json::from_str("\"queued_for_review\"").unwrap();
        assert_eq!(status, BatchStatus::Unknown);
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_admin_batch_shape_decodes() {
        let json = r#"{
            "id": "b-1", "factory_id": "f-9", "product_count": 3,
            "status": "anchor_failed", "merkle_root": null,
            "blockchain_tx": null, "created_at": null,
            "anchored_at": null, "error": "rpc timeout"
        }"#;
        let batch: Batch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.status, BatchStatus::AnchorFailed);
        assert_eq!(batch.error.as_deref(), Some("rpc timeout"));
        assert_eq!(batch.factory_id.as_deref(), Some("f-9"));
    }

    #[test]
    fn test_create_request_omits_empty_fields() {
        let req = BatchCreateRequest {
            product_count: 2,
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"product_count":2}"#);
    }
}
