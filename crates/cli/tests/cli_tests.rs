use clap::Parser;
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;
use voketag::commands::admin::AdminCommands;
use voketag::commands::consumer::ReportKind;
use voketag::commands::csv::CsvCommands;
use voketag::{Cli, Commands, Context};
use voketag_config::ConfigLoader;
use voketag_core::Error;

fn context(dir: &TempDir) -> Context {
    let config_path = dir.path().join("config.json");
    let session = dir.path().join("session.json");
    fs::write(
        &config_path,
        format!(
            r#"{{ "verify_url": "https://verify.test", "session_file": {} }}"#,
            serde_json::to_string(&session).unwrap()
        ),
    )
    .unwrap();
    let config = ConfigLoader::new()
        .file(&config_path)
        .env(HashMap::new())
        .load()
        .unwrap();
    Context::new(config, false).unwrap()
}

#[test]
fn test_scan_accepts_negative_coordinates() {
    let cli = Cli::try_parse_from([
        "voketag", "scan", "https://app.test/r/ABC", "--lat", "-23.55", "--lng", "-46.63",
    ])
    .unwrap();
    match cli.command {
        Commands::Scan { code, lat, lng, no_retry, .. } => {
            assert_eq!(code, "https://app.test/r/ABC");
            assert_eq!(lat, Some(-23.55));
            assert_eq!(lng, Some(-46.63));
            assert!(!no_retry);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_report_defaults_to_irregularity() {
    let cli = Cli::try_parse_from(["voketag", "report", "SN-1", "--reason", "lacre rompido"]).unwrap();
    match cli.command {
        Commands::Report { kind, details, .. } => {
            assert_eq!(kind, ReportKind::Irregularity);
            assert_eq!(details, "");
        }
        other => panic!("unexpected command: {other:?}"),
    }

    let cli = Cli::try_parse_from([
        "voketag", "report", "SN-1", "--reason", "x", "--type", "fake",
    ])
    .unwrap();
    assert!(matches!(cli.command, Commands::Report { kind: ReportKind::Fake, .. }));
}

#[test]
fn test_verify_details_need_fraud_reason() {
    assert!(Cli::try_parse_from(["voketag", "verify", "tok", "--details", "x"]).is_err());
    assert!(Cli::try_parse_from([
        "voketag", "verify", "tok", "--report-fraud", "clone", "--details", "x"
    ])
    .is_ok());
}

#[test]
fn test_audit_follow_and_export_conflict() {
    assert!(Cli::try_parse_from(["voketag", "admin", "audit", "--follow", "--export", "csv"]).is_err());
    assert!(Cli::try_parse_from(["voketag", "admin", "audit", "--out", "a.csv"]).is_err());

    let cli = Cli::try_parse_from(["voketag", "--json", "admin", "audit", "--follow"]).unwrap();
    assert!(cli.json);
    assert!(matches!(
        cli.command,
        Commands::Admin { command: AdminCommands::Audit { follow: true, .. } }
    ));
}

#[test]
fn test_global_endpoint_flags() {
    let cli = Cli::try_parse_from([
        "voketag", "health", "--ready", "--admin-api", "http://admin.test",
    ])
    .unwrap();
    assert_eq!(cli.admin_api.as_deref(), Some("http://admin.test"));
    assert!(matches!(cli.command, Commands::Health { ready: true }));
}

#[test]
fn test_merkle_expand_paths() {
    let cli = Cli::try_parse_from([
        "voketag", "merkle", "b-1", "--expand", "L", "--expand", "LR",
    ])
    .unwrap();
    match cli.command {
        Commands::Merkle { batch_id, expand } => {
            assert_eq!(batch_id, "b-1");
            assert_eq!(expand, vec!["L", "LR"]);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[tokio::test]
async fn test_csv_validate_clean_file() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let file = dir.path().join("batch.csv");
    fs::write(&file, "serial_number,product_code\nSN1,P1\nSN2,P1\n").unwrap();

    let command = CsvCommands::Validate { file, per_row: false };
    command.execute(&ctx).await.unwrap();
}

#[tokio::test]
async fn test_csv_validate_rejects_duplicates() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let file = dir.path().join("batch.csv");
    fs::write(&file, "serial_number,product_code\nSN1,P1\nSN1,P1\n").unwrap();

    let err = CsvCommands::Validate { file, per_row: true }
        .execute(&ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
}

#[tokio::test]
async fn test_csv_missing_file() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let err = CsvCommands::Validate {
        file: dir.path().join("nope.csv"),
        per_row: false,
    }
    .execute(&ctx)
    .await
    .unwrap_err();
    assert!(matches!(err, Error::FileSystem { .. }));
}

#[tokio::test]
async fn test_ntag_export_written() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let file = dir.path().join("batch.csv");
    let out = dir.path().join("export.csv");
    fs::write(&file, "Serial Number,Product Code\nSN1,P1\n").unwrap();

    CsvCommands::Ntag {
        file,
        batch_id: "b-123".into(),
        out: Some(out.clone()),
    }
    .execute(&ctx)
    .await
    .unwrap();

    let export = fs::read_to_string(out).unwrap();
    assert!(export.contains("SN1,https://verify.test/verify?serial=SN1,b-123"));
}
