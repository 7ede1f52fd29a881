use clap::{Subcommand, ValueEnum};
use voketag_client::factory::{LogQuery, ScanQuery};
use voketag_core::{NtagModel, Result, RiskStatus, SettingsUpdate};

use crate::context::Context;
use crate::output::{field, or_dash, print_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Risk {
    Low,
    Medium,
    High,
}

impl From<Risk> for RiskStatus {
    fn from(risk: Risk) -> Self {
        match risk {
            Risk::Low => RiskStatus::Low,
            Risk::Medium => RiskStatus::Medium,
            Risk::High => RiskStatus::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Ntag {
    #[value(name = "213")]
    Ntag213,
    #[value(name = "215")]
    Ntag215,
    #[value(name = "216")]
    Ntag216,
}

impl From<Ntag> for NtagModel {
    fn from(model: Ntag) -> Self {
        match model {
            Ntag::Ntag213 => NtagModel::Ntag213,
            Ntag::Ntag215 => NtagModel::Ntag215,
            Ntag::Ntag216 => NtagModel::Ntag216,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum FactoryCommands {
    /// Scans of this factory's tags
    Scans {
        #[arg(long)]
        batch_id: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long, value_enum)]
        risk: Option<Risk>,
        #[arg(long)]
        date_from: Option<String>,
        #[arg(long)]
        date_to: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long)]
        skip: Option<u32>,
    },

    /// One scan event
    Scan { scan_id: String },

    /// Factory audit log
    Logs {
        #[arg(long)]
        action: Option<String>,
        #[arg(long)]
        actor: Option<String>,
        #[arg(long)]
        date_from: Option<String>,
        #[arg(long)]
        date_to: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long)]
        skip: Option<u32>,
    },

    /// Show or change factory settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommands {
    Show,

    /// Change only the given fields
    Set {
        #[arg(long)]
        verification_url: Option<String>,
        #[arg(long, value_enum)]
        ntag: Option<Ntag>,
        #[arg(long)]
        webhook_url: Option<String>,
        #[arg(long)]
        scan_threshold: Option<u32>,
        #[arg(long)]
        sandbox: Option<bool>,
    },
}

impl FactoryCommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let factory = &ctx.clients.factory;
        match self {
            FactoryCommands::Scans {
                batch_id,
                country,
                risk,
                date_from,
                date_to,
                limit,
                skip,
            } => {
                let scans = factory
                    .list_scans(&ScanQuery {
                        batch_id,
                        country,
                        risk_status: risk.map(Into::into),
                        date_from,
                        date_to,
                        limit: Some(limit),
                        skip,
                    })
                    .await?;
                if ctx.json {
                    return print_json(&scans);
                }
                for scan in &scans.items {
                    println!(
                        "{:<24} {:<24} {:<6} {:<7} {}{}",
                        scan.scanned_at,
                        scan.serial_number,
                        or_dash(scan.country.as_deref()),
                        format!("{:?}", scan.risk_status).to_lowercase(),
                        or_dash(scan.device.as_deref()),
                        if scan.is_duplicate { " (duplicada)" } else { "" }
                    );
                }
                println!("{} leitura(s)", scans.total);
                Ok(())
            }
            FactoryCommands::Scan { scan_id } => print_json(&factory.get_scan(&scan_id).await?),
            FactoryCommands::Logs {
                action,
                actor,
                date_from,
                date_to,
                limit,
                skip,
            } => {
                let logs = factory
                    .audit_logs(&LogQuery {
                        skip,
                        limit: Some(limit),
                        action,
                        actor,
                        date_from,
                        date_to,
                    })
                    .await?;
                if ctx.json {
                    return print_json(&logs);
                }
                for log in &logs.items {
                    println!("{:<24} {:<20} {:<24} {}", log.timestamp, log.action, log.actor, log.ip);
                }
                Ok(())
            }
            FactoryCommands::Settings { command } => {
                let settings = match command.unwrap_or(SettingsCommands::Show) {
                    SettingsCommands::Show => factory.settings().await,
                    SettingsCommands::Set {
                        verification_url,
                        ntag,
                        webhook_url,
                        scan_threshold,
                        sandbox,
                    } => {
                        factory
                            .update_settings(SettingsUpdate {
                                verification_url,
                                ntag_default: ntag.map(Into::into),
                                webhook_url,
                                antifraud_scan_threshold: scan_threshold,
                                sandbox_mode: sandbox,
                            })
                            .await?
                    }
                };
                if ctx.json {
                    return print_json(&settings);
                }
                field("URL de verificação", &settings.verification_url);
                field("NTAG padrão", serde_json::to_value(settings.ntag_default)?.as_str().unwrap_or("-"));
                field("Webhook", or_dash(settings.webhook_url.as_deref()));
                field("Limite antifraude", settings.antifraud_scan_threshold);
                field("Sandbox", settings.sandbox_mode);
                Ok(())
            }
        }
    }
}
