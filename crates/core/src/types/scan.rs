use serde::{Deserialize, Serialize};
use std::fmt;

/// Consumer-facing verdict for a scanned tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Original,
    Warning,
    Fake,
}

impl ScanStatus {
    /// Verdict used when the backend does not send one: invalid tags are fake,
    /// more than three scans of a valid tag is suspicious.
    #[must_use]
    pub fn from_validity(valid: bool, scan_count: u64) -> Self {
        if !valid {
            ScanStatus::Fake
        } else if scan_count > 3 {
            ScanStatus::Warning
        } else {
            ScanStatus::Original
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScanStatus::Original => "original",
            ScanStatus::Warning => "warning",
            ScanStatus::Fake => "fake",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanProduct {
    pub name: String,
    pub batch: String,
    pub factory: String,
    pub manufactured_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResponse {
    pub status: ScanStatus,
    #[serde(default)]
    pub product: Option<ScanProduct>,
    #[serde(default)]
    pub scan_count: Option<u64>,
    #[serde(default)]
    pub first_scan_at: Option<String>,
    #[serde(default)]
    pub risk_score: Option<f64>,
}

impl ScanResponse {
    /// Result reported for unknown or malformed codes
    #[must_use]
    pub fn fake() -> Self {
        Self {
            status: ScanStatus::Fake,
            product: None,
            scan_count: None,
            first_scan_at: None,
            risk_score: Some(1.0),
        }
    }
}

/// Optional device context attached to a scan as headers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanMetadata {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Irregularity,
    Fake,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub code: String,
    pub reason: String,
    pub details: String,
    pub report_type: ReportType,
}

/// Moderation state an admin can put a tag in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagModeration {
    Ok,
    Blocked,
    Observation,
    Fraud,
}

impl TagModeration {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TagModeration::Ok => "ok",
            TagModeration::Blocked => "blocked",
            TagModeration::Observation => "observation",
            TagModeration::Fraud => "fraud",
        }
    }
}

/// Per-tag aggregate shown in the admin console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanItem {
    pub tag_id: String,
    pub product_id: String,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub first_scan_at: Option<String>,
    pub scan_count: u64,
    pub valid: bool,
    pub status: String,
    pub risk_score: f64,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_token: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanList {
    pub scans: Vec<ScanItem>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskStatus {
    Low,
    Medium,
    High,
}

/// Individual scan as listed by the factory portal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanEvent {
    pub id: String,
    pub serial_number: String,
    pub batch_id: String,
    pub scanned_at: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    pub risk_status: RiskStatus,
    #[serde(default)]
    pub is_duplicate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanEventList {
    pub items: Vec<ScanEvent>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationProduct {
    pub id: String,
    pub name: String,
    pub batch_id: String,
    #[serde(default)]
    pub manufactured_at: Option<String>,
}

/// Result of verifying a signed product token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResponse {
    pub valid: bool,
    /// `authentic`, `warning` or `high_risk`
    pub status: String,
    pub risk_score: f64,
    #[serde(default)]
    pub product: Option<VerificationProduct>,
    pub verification_id: String,
    pub timestamp: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub risk_factors: Option<std::collections::BTreeMap<String, f64>>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudReport {
    pub verification_id: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_validity() {
        assert_eq!(ScanStatus::from_validity(false, 1), ScanStatus::Fake);
        assert_eq!(ScanStatus::from_validity(true, 3), ScanStatus::Original);
        assert_eq!(ScanStatus::from_validity(true, 4), ScanStatus::Warning);
    }

    #[test]
    fn test_report_type_wire_format() {
        let req = ReportRequest {
            code: "SN-1".into(),
            reason: "lacre".into(),
            details: "rompido".into(),
            report_type: ReportType::Irregularity,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["report_type"], "irregularity");
    }
}
