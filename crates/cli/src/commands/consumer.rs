//! Public consumer calls: scan, report, verify

use clap::ValueEnum;
use voketag_client::scan::VerifyContext;
use voketag_core::{FraudReport, ReportRequest, ReportType, Result, ScanMetadata};

use crate::context::Context;
use crate::output::{field, or_dash, print_json, scan_result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    Irregularity,
    Fake,
}

impl From<ReportKind> for ReportType {
    fn from(kind: ReportKind) -> Self {
        match kind {
            ReportKind::Irregularity => ReportType::Irregularity,
            ReportKind::Fake => ReportType::Fake,
        }
    }
}

pub async fn scan(
    ctx: &Context,
    code: &str,
    latitude: Option<f64>,
    longitude: Option<f64>,
    fingerprint: Option<String>,
    no_retry: bool,
) -> Result<()> {
    let metadata = ScanMetadata {
        latitude,
        longitude,
        fingerprint,
    };
    let scan = &ctx.clients.scan;
    let result = if no_retry {
        scan.scan(code, &metadata).await?
    } else {
        scan.scan_with_retry(code, &metadata).await?
    };
    if ctx.json {
        return print_json(&result);
    }
    scan_result(&result);
    Ok(())
}

pub async fn report(
    ctx: &Context,
    code: String,
    reason: String,
    details: String,
    kind: ReportKind,
) -> Result<()> {
    ctx.clients
        .scan
        .report(&ReportRequest {
            code,
            reason,
            details,
            report_type: kind.into(),
        })
        .await?;
    println!("Reporte enviado. Obrigado.");
    Ok(())
}

pub async fn verify(
    ctx: &Context,
    token: &str,
    report_fraud: Option<String>,
    details: Option<String>,
) -> Result<()> {
    let scan = &ctx.clients.scan;
    let verification = scan.verify(token, &VerifyContext::from_environment()).await?;

    if ctx.json {
        print_json(&verification)?;
    } else {
        println!("{}", verification.message);
        field("Válido", verification.valid);
        field("Status", &verification.status);
        field("Risco", verification.risk_score);
        field("Verificação", &verification.verification_id);
        if let Some(product) = &verification.product {
            field("Produto", &product.name);
            field("Lote", &product.batch_id);
            field("Fabricado em", or_dash(product.manufactured_at.as_deref()));
        }
        if let Some(factors) = &verification.risk_factors {
            for (factor, weight) in factors {
                field(factor, weight);
            }
        }
    }

    if let Some(reason) = report_fraud {
        scan.report_fraud(&FraudReport {
            verification_id: verification.verification_id.clone(),
            reason,
            details,
        })
        .await?;
        tracing::info!(verification_id = %verification.verification_id, "fraud reported");
    }
    Ok(())
}
