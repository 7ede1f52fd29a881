//! Consumer scan, report and verification calls

mod common;

use common::clients;
use serde_json::json;
use std::time::Duration;
use voketag_client::scan::VerifyContext;
use voketag_client::Session;
use voketag_core::{FraudReport, ReportRequest, ReportType, ScanMetadata, ScanStatus};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_scan_sends_code_and_device_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scan"))
        .and(body_json(json!({"code": "SN-42"})))
        .and(header("X-Device-Fingerprint", "fp-1"))
        .and(header("X-Latitude", "-23.5"))
        .and(header("X-Longitude", "-46.6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": true,
            "scan_count": 2,
            "product": {"name": "Camiseta", "batch": "L-1", "factory": "Fab SP", "manufactured_at": "2026-01-10"},
            "first_scan_at": "2026-02-01T10:00:00Z",
            "risk_score": 0.1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (clients, _store) = clients(&server, Session::default());
    let metadata = ScanMetadata {
        latitude: Some(-23.5),
        longitude: Some(-46.6),
        fingerprint: Some("fp-1".into()),
    };
    let result = clients
        .scan
        .scan("https://verify.voketag.com.br/p?serial=SN-42", &metadata)
        .await
        .unwrap();

    assert_eq!(result.status, ScanStatus::Original);
    assert_eq!(result.scan_count, Some(2));
    assert_eq!(result.product.unwrap().factory, "Fab SP");
}

#[tokio::test]
async fn test_unknown_code_is_fake() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scan"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (clients, _store) = clients(&server, Session::default());
    let result = clients.scan.scan("nope", &ScanMetadata::default()).await.unwrap();

    assert_eq!(result.status, ScanStatus::Fake);
    assert_eq!(result.risk_score, Some(1.0));
    assert!(result.product.is_none());
}

#[tokio::test]
async fn test_rate_limited_and_unavailable_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scan"))
        .and(body_json(json!({"code": "busy"})))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/scan"))
        .and(body_json(json!({"code": "down"})))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (clients, _store) = clients(&server, Session::default());
    let busy = clients.scan.scan("busy", &ScanMetadata::default()).await.unwrap_err();
    assert_eq!(
        busy.to_string(),
        "Muitas tentativas. Tente novamente em alguns instantes."
    );

    let down = clients.scan.scan("down", &ScanMetadata::default()).await.unwrap_err();
    assert_eq!(down.to_string(), "Verificação temporariamente indisponível.");
}

#[tokio::test]
async fn test_scan_retries_once_after_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scan"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": false})))
        .expect(1)
        .mount(&server)
        .await;

    let (clients, _store) = clients(&server, Session::default());
    let result = clients
        .scan
        .scan_with_retry("SN-1", &ScanMetadata::default())
        .await
        .unwrap();
    assert_eq!(result.status, ScanStatus::Fake);
}

#[tokio::test]
async fn test_scan_timeout_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scan"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let (clients, _store) = clients(&server, Session::default());
    let err = clients.scan.scan("slow", &ScanMetadata::default()).await.unwrap_err();
    assert!(err.to_string().ends_with("Tempo esgotado. Verifique sua conexão."));
}

#[tokio::test]
async fn test_report_error_uses_body_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/report"))
        .and(body_json(json!({
            "code": "SN-1", "reason": "lacre", "details": "rompido", "report_type": "fake"
        })))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"message": "Código inválido"})))
        .mount(&server)
        .await;

    let (clients, _store) = clients(&server, Session::default());
    let report = ReportRequest {
        code: "SN-1".into(),
        reason: "lacre".into(),
        details: "rompido".into(),
        report_type: ReportType::Fake,
    };
    let err = clients.scan.report(&report).await.unwrap_err();
    assert_eq!(err.to_string(), "Código inválido");
}

#[tokio::test]
async fn test_verify_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/verify/tok-123"))
        .and(header("X-Timezone", "-03:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": true,
            "status": "authentic",
            "risk_score": 5.0,
            "product": {"id": "p1", "name": "Tênis", "batch_id": "b1"},
            "verification_id": "v-1",
            "timestamp": "2026-03-01T12:00:00Z",
            "message": "Produto autêntico",
            "risk_factors": {"velocity": 0.2}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/verify/expired"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let (clients, _store) = clients(&server, Session::default());
    let context = VerifyContext {
        timezone: Some("-03:00".into()),
        ..VerifyContext::default()
    };
    let verified = clients.scan.verify("tok-123", &context).await.unwrap();
    assert!(verified.valid);
    assert_eq!(verified.status, "authentic");
    assert_eq!(verified.product.unwrap().name, "Tênis");

    let err = clients.scan.verify("expired", &context).await.unwrap_err();
    assert_eq!(err.to_string(), "Verification token expired");
}

#[tokio::test]
async fn test_fraud_report_omits_missing_details() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/fraud/report"))
        .and(body_json(json!({"verification_id": "v-1", "reason": "counterfeit"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let (clients, _store) = clients(&server, Session::default());
    clients
        .scan
        .report_fraud(&FraudReport {
            verification_id: "v-1".into(),
            reason: "counterfeit".into(),
            details: None,
        })
        .await
        .unwrap();
}
