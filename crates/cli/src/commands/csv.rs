use clap::Subcommand;
use std::path::{Path, PathBuf};
use voketag_anchor::{
    ntag_export, ntag_file_name, parse_csv, validate_csv_with, InvalidCounting, ValidationResult,
};
use voketag_core::{Error, Result};
use voketag_utils::write_atomic;

use crate::context::Context;
use crate::output::{field, print_json};

#[derive(Debug, Subcommand)]
pub enum CsvCommands {
    /// Count rows the backend will obviously reject
    Validate {
        file: PathBuf,

        /// Count a row with both required fields blank once instead of twice
        #[arg(long)]
        per_row: bool,
    },

    /// Write the NTAG programming export for an anchored batch
    Ntag {
        file: PathBuf,

        #[arg(long)]
        batch_id: String,

        /// Output file (default: ntag_export_<batch>.csv)
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
}

impl CsvCommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            CsvCommands::Validate { file, per_row } => {
                let counting = if per_row {
                    InvalidCounting::PerRow
                } else {
                    InvalidCounting::PerField
                };
                let rows = parse_csv(&read_csv(&file).await?);
                let result = validate_csv_with(&rows, counting);
                if ctx.json {
                    print_json(&result)?;
                } else {
                    print_validation(&file, &result);
                }
                if result.is_clean() {
                    Ok(())
                } else {
                    Err(Error::validation(
                        "csv",
                        format!(
                            "{} inválido(s), {} duplicado(s)",
                            result.invalid, result.duplicates
                        ),
                    ))
                }
            }
            CsvCommands::Ntag {
                file,
                batch_id,
                out,
            } => {
                let rows = parse_csv(&read_csv(&file).await?);
                let export = ntag_export(&rows, &batch_id, ctx.config.endpoints.verify_url.as_str());
                let out = out.unwrap_or_else(|| PathBuf::from(ntag_file_name(&batch_id)));
                write_atomic(&out, export.as_bytes())?;
                tracing::info!(rows = rows.len(), path = %out.display(), "NTAG export written");
                println!("{}", out.display());
                Ok(())
            }
        }
    }
}

pub(crate) async fn read_csv(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::file_system(path, "read", e))
}

fn print_validation(path: &Path, result: &ValidationResult) {
    println!("{}", path.display());
    field("Total", result.total);
    field("Válidos", result.valid);
    field("Inválidos", result.invalid);
    field("Duplicados", result.duplicates);
    field("Risco", format!("{}%", result.risk_score));
    if !result.errors.is_empty() {
        println!("Erros:");
        for error in &result.errors {
            println!("  - {error}");
        }
    }
}
