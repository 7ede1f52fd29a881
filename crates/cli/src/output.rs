//! Terminal rendering shared by the commands

use serde::Serialize;
use voketag_core::{Batch, BatchStatusResponse, Result, ScanResponse, ScanStatus};

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[must_use]
pub fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("  {label:<18} {value}");
}

pub fn batch_line(batch: &Batch) {
    println!(
        "{:<38} {:<14} {:>7}  {}",
        batch.id,
        batch.status,
        batch.product_count,
        or_dash(batch.created_at.as_deref())
    );
}

pub fn batch_status(status: &BatchStatusResponse) {
    println!("Lote {}", status.batch_id);
    field("Status", status.status);
    field("Produtos", status.product_count);
    field("Criado em", or_dash(status.created_at.as_deref()));
    field("Processado em", or_dash(status.processing_completed_at.as_deref()));
    field("Ancorado em", or_dash(status.anchored_at.as_deref()));
    field("Merkle root", or_dash(status.merkle_root.as_deref()));
    field("Transação", or_dash(status.blockchain_tx.as_deref()));
    if let Some(error) = &status.error {
        field("Erro", error);
    }
}

#[must_use]
pub fn verdict(status: ScanStatus) -> &'static str {
    match status {
        ScanStatus::Original => "Produto original",
        ScanStatus::Warning => "Atenção: produto já escaneado várias vezes",
        ScanStatus::Fake => "Produto não reconhecido",
    }
}

pub fn scan_result(result: &ScanResponse) {
    println!("{}", verdict(result.status));
    if let Some(product) = &result.product {
        field("Produto", &product.name);
        field("Lote", &product.batch);
        field("Fábrica", &product.factory);
        field("Fabricado em", &product.manufactured_at);
    }
    if let Some(count) = result.scan_count {
        field("Leituras", count);
    }
    if let Some(first) = &result.first_scan_at {
        field("Primeira leitura", first);
    }
    if let Some(risk) = result.risk_score {
        field("Risco", risk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("")), "-");
        assert_eq!(or_dash(Some("0xabc")), "0xabc");
    }
}
