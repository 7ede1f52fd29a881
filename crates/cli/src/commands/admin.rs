use clap::{Subcommand, ValueEnum};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use voketag_client::admin::{AuditFilter, BatchFilter, ExportFormat, ScanFilter, UserFilter};
use voketag_core::{AuditLogEntry, Result, TagModeration, UserCreate, UserUpdate};
use voketag_utils::write_atomic;

use crate::context::{cancel_on_ctrl_c, Context};
use crate::output::{batch_line, field, or_dash, print_json};

#[derive(Debug, Subcommand)]
pub enum AdminCommands {
    /// Dashboard counters for the last N days
    Dashboard {
        #[arg(long, default_value_t = 7)]
        days: u32,

        /// Fetch summary, batches and scans together
        #[arg(long)]
        overview: bool,
    },

    /// Service status
    Status {
        /// Include host metrics and dependency status
        #[arg(long)]
        extended: bool,
    },

    /// Raw Prometheus metrics
    Metrics,

    /// Running configuration of the admin service
    Config,

    /// Manage users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// List batches across factories
    Batches {
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long)]
        skip: Option<u32>,
    },

    /// Reprocess a failed batch
    RetryBatch { batch_id: String },

    /// Inspect and moderate scanned tags
    Scans {
        #[command(subcommand)]
        command: ScanCommands,
    },

    /// Fraud and traffic analytics
    Analytics {
        #[arg(value_enum)]
        report: AnalyticsReport,

        #[arg(long)]
        days: Option<u32>,

        /// Hours window for scans-per-minute
        #[arg(long, default_value_t = 1)]
        hours: u32,

        /// Minimum risk score for the fraud and heatmap reports
        #[arg(long)]
        min_risk: Option<u32>,
    },

    /// Audit log: list, export or follow
    Audit {
        #[arg(long)]
        entity_type: Option<String>,
        #[arg(long)]
        entity_id: Option<String>,
        #[arg(long)]
        action: Option<String>,
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long)]
        skip: Option<u32>,

        /// Stream new entries until interrupted
        #[arg(long, conflicts_with = "export")]
        follow: bool,

        /// Download the log in this format instead of listing it
        #[arg(long, value_enum)]
        export: Option<Format>,

        /// Export destination (default: stdout)
        #[arg(long, requires = "export")]
        out: Option<PathBuf>,
    },

    /// Platform-wide emergency controls
    GodMode {
        #[command(subcommand)]
        command: GodModeCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum UserCommands {
    #[command(visible_alias = "ls")]
    List {
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long)]
        skip: Option<u32>,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "VOKETAG_NEW_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "operator")]
        role: String,
    },
    Update {
        user_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete {
        user_id: String,
    },
    Block {
        user_id: String,
    },
    Unblock {
        user_id: String,
    },
    ResetPassword {
        user_id: String,
        #[arg(long, env = "VOKETAG_NEW_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Revoke every session of a user
    ForceLogout {
        user_id: String,
    },
    History {
        user_id: String,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

#[derive(Debug, Subcommand)]
pub enum ScanCommands {
    #[command(visible_alias = "ls")]
    List {
        #[arg(long)]
        product_id: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        risk_min: Option<f64>,
        #[arg(long)]
        risk_max: Option<f64>,
        #[arg(long)]
        days: Option<u32>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long)]
        skip: Option<u32>,
    },
    Block {
        tag_id: String,
    },
    Observe {
        tag_id: String,
    },
    Fraud {
        tag_id: String,
    },
    SetStatus {
        tag_id: String,
        #[arg(value_enum)]
        status: Moderation,
    },
}

#[derive(Debug, Subcommand)]
pub enum GodModeCommands {
    State,
    KillSwitch {
        #[arg(value_enum)]
        state: Switch,
    },
    Investigation {
        #[arg(value_enum)]
        state: Switch,
    },
    MaxAlert {
        #[arg(value_enum)]
        state: Switch,
    },
    RiskLimit {
        limit: u32,
    },
    BlockCountry {
        country: String,
    },
    UnblockCountry {
        country: String,
    },
    /// Force every user to log in again
    InvalidateJwt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    fn active(self) -> bool {
        self == Switch::On
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Moderation {
    Ok,
    Blocked,
    Observation,
    Fraud,
}

impl From<Moderation> for TagModeration {
    fn from(m: Moderation) -> Self {
        match m {
            Moderation::Ok => TagModeration::Ok,
            Moderation::Blocked => TagModeration::Blocked,
            Moderation::Observation => TagModeration::Observation,
            Moderation::Fraud => TagModeration::Fraud,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Csv,
    Json,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => ExportFormat::Csv,
            Format::Json => ExportFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnalyticsReport {
    Fraud,
    Geographic,
    Trends,
    Heatmap,
    ScansPerMinute,
    FraudsPerHour,
    RiskEvolution,
}

impl AdminCommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let admin = &ctx.clients.admin;
        match self {
            AdminCommands::Dashboard { days, overview } => {
                if overview {
                    print_json(&admin.dashboard_overview(days).await?)
                } else {
                    print_json(&admin.dashboard(days).await?)
                }
            }
            AdminCommands::Status { extended } => {
                if extended {
                    let status = admin.system_status_extended().await?;
                    if ctx.json {
                        return print_json(&status);
                    }
                    field("Uptime (s)", status.uptime_seconds);
                    field("Redis", &status.redis_status);
                    field("Postgres", &status.postgres_status);
                    field("CPU", format!("{:.1}%", status.cpu_percent));
                    field(
                        "Memória",
                        format!(
                            "{:.1}% ({:.0}/{:.0} MB)",
                            status.memory_percent, status.memory_used_mb, status.memory_total_mb
                        ),
                    );
                    if let Some(latency) = status.api_latency_avg_ms {
                        field("Latência média", format!("{latency:.1}ms"));
                    }
                    print_services(&status.services);
                } else {
                    let status = admin.system_status().await?;
                    if ctx.json {
                        return print_json(&status);
                    }
                    print_services(&status.services);
                }
                Ok(())
            }
            AdminCommands::Metrics => {
                print!("{}", admin.prometheus_metrics().await?);
                Ok(())
            }
            AdminCommands::Config => print_json(&admin.system_config().await?),
            AdminCommands::Users { command } => command.execute(ctx).await,
            AdminCommands::Batches {
                status,
                limit,
                skip,
            } => {
                let batches = admin
                    .list_batches(&BatchFilter {
                        skip,
                        limit: Some(limit),
                        status,
                    })
                    .await?;
                if ctx.json {
                    return print_json(&batches);
                }
                batches.batches.iter().for_each(batch_line);
                println!("{} lote(s)", batches.total);
                Ok(())
            }
            AdminCommands::RetryBatch { batch_id } => print_json(&admin.retry_batch(&batch_id).await?),
            AdminCommands::Scans { command } => command.execute(ctx).await,
            AdminCommands::Analytics {
                report,
                days,
                hours,
                min_risk,
            } => {
                let window = days.unwrap_or(30);
                let data = match report {
                    AnalyticsReport::Fraud => admin.analytics_fraud(days, min_risk).await?,
                    AnalyticsReport::Geographic => admin.analytics_geographic(window).await?,
                    AnalyticsReport::Trends => admin.analytics_trends(window).await?,
                    AnalyticsReport::Heatmap => admin.analytics_heatmap(days, min_risk).await?,
                    AnalyticsReport::ScansPerMinute => admin.analytics_scans_per_minute(hours).await?,
                    AnalyticsReport::FraudsPerHour => admin.analytics_frauds_per_hour(days.unwrap_or(7)).await?,
                    AnalyticsReport::RiskEvolution => admin.analytics_risk_evolution(window).await?,
                };
                print_json(&data)
            }
            AdminCommands::Audit {
                entity_type,
                entity_id,
                action,
                user_id,
                search,
                limit,
                skip,
                follow,
                export,
                out,
            } => {
                if let Some(format) = export {
                    let content = admin
                        .export_audit_logs(format.into(), entity_type.as_deref())
                        .await?;
                    return match out {
                        Some(path) => {
                            write_atomic(&path, &content)?;
                            println!("{}", path.display());
                            Ok(())
                        }
                        None => {
                            use std::io::Write;
                            std::io::stdout().write_all(&content)?;
                            Ok(())
                        }
                    };
                }

                if follow {
                    let cancel = CancellationToken::new();
                    cancel_on_ctrl_c(cancel.clone());
                    let json = ctx.json;
                    return admin
                        .follow_audit_logs(entity_type.as_deref(), action.as_deref(), cancel, |entry| {
                            if json {
                                if let Ok(line) = serde_json::to_string(&entry) {
                                    println!("{line}");
                                }
                            } else {
                                audit_line(&entry);
                            }
                        })
                        .await;
                }

                let logs = admin
                    .audit_logs(&AuditFilter {
                        skip,
                        limit: Some(limit),
                        entity_type,
                        entity_id,
                        action,
                        user_id,
                        search,
                    })
                    .await?;
                if ctx.json {
                    return print_json(&logs);
                }
                logs.iter().for_each(audit_line);
                Ok(())
            }
            AdminCommands::GodMode { command } => command.execute(ctx).await,
        }
    }
}

impl UserCommands {
    async fn execute(self, ctx: &Context) -> Result<()> {
        let admin = &ctx.clients.admin;
        let response = match self {
            UserCommands::List {
                role,
                search,
                limit,
                skip,
            } => {
                let users = admin
                    .list_users(&UserFilter {
                        skip,
                        limit: Some(limit),
                        role,
                        search,
                    })
                    .await?;
                if ctx.json {
                    return print_json(&users);
                }
                for user in &users {
                    println!(
                        "{:<38} {:<32} {:<10} {}",
                        user.id,
                        user.email,
                        user.role,
                        if user.is_active { "ativo" } else { "bloqueado" }
                    );
                }
                return Ok(());
            }
            UserCommands::Create {
                name,
                email,
                password,
                role,
            } => {
                let user = admin
                    .create_user(&UserCreate {
                        name,
                        email,
                        password,
                        role,
                    })
                    .await?;
                return print_json(&user);
            }
            UserCommands::Update {
                user_id,
                name,
                email,
                role,
                active,
            } => {
                let user = admin
                    .update_user(
                        &user_id,
                        &UserUpdate {
                            name,
                            email,
                            role,
                            is_active: active,
                        },
                    )
                    .await?;
                return print_json(&user);
            }
            UserCommands::Delete { user_id } => admin.delete_user(&user_id).await?,
            UserCommands::Block { user_id } => admin.block_user(&user_id).await?,
            UserCommands::Unblock { user_id } => admin.unblock_user(&user_id).await?,
            UserCommands::ResetPassword { user_id, password } => {
                admin.reset_password(&user_id, &password).await?
            }
            UserCommands::ForceLogout { user_id } => admin.force_logout(&user_id).await?,
            UserCommands::History { user_id, limit } => {
                let history = admin.login_history(&user_id, limit).await?;
                if ctx.json {
                    return print_json(&history);
                }
                for entry in &history {
                    println!(
                        "{:<26} {:<16} {}",
                        entry.created_at,
                        or_dash(entry.ip_address.as_deref()),
                        entry.user_agent
                    );
                }
                return Ok(());
            }
        };
        println!("{}", or_dash(Some(response.message.as_str())));
        Ok(())
    }
}

impl ScanCommands {
    async fn execute(self, ctx: &Context) -> Result<()> {
        let admin = &ctx.clients.admin;
        let response = match self {
            ScanCommands::List {
                product_id,
                country,
                risk_min,
                risk_max,
                days,
                status,
                limit,
                skip,
            } => {
                let scans = admin
                    .list_scans(&ScanFilter {
                        skip,
                        limit: Some(limit),
                        product_id,
                        country,
                        risk_min,
                        risk_max,
                        days,
                        status,
                    })
                    .await?;
                if ctx.json {
                    return print_json(&scans);
                }
                for scan in &scans.scans {
                    println!(
                        "{:<24} {:<12} {:>5} {:>6.1} {}",
                        scan.tag_id,
                        scan.status,
                        scan.scan_count,
                        scan.risk_score,
                        or_dash(scan.product_name.as_deref())
                    );
                }
                println!("{} tag(s)", scans.total);
                return Ok(());
            }
            ScanCommands::Block { tag_id } => admin.block_scan(&tag_id).await?,
            ScanCommands::Observe { tag_id } => admin.observe_scan(&tag_id).await?,
            ScanCommands::Fraud { tag_id } => admin.mark_fraud(&tag_id).await?,
            ScanCommands::SetStatus { tag_id, status } => {
                admin.set_scan_status(&tag_id, status.into()).await?
            }
        };
        println!("{}", or_dash(Some(response.message.as_str())));
        Ok(())
    }
}

impl GodModeCommands {
    async fn execute(self, ctx: &Context) -> Result<()> {
        let admin = &ctx.clients.admin;
        let response = match self {
            GodModeCommands::State => {
                let state = admin.god_mode_state().await?;
                if ctx.json {
                    return print_json(&state);
                }
                field("Kill switch", state.kill_switch);
                field("Investigação", state.investigation_mode);
                field("Alerta máximo", state.max_alert_mode);
                field("Limite de risco", state.risk_limit);
                field("Países bloqueados", state.blocked_countries.join(", "));
                return Ok(());
            }
            GodModeCommands::KillSwitch { state } => admin.set_kill_switch(state.active()).await?,
            GodModeCommands::Investigation { state } => {
                admin.set_investigation_mode(state.active()).await?
            }
            GodModeCommands::MaxAlert { state } => admin.set_max_alert_mode(state.active()).await?,
            GodModeCommands::RiskLimit { limit } => admin.set_risk_limit(limit).await?,
            GodModeCommands::BlockCountry { country } => admin.block_country(&country).await?,
            GodModeCommands::UnblockCountry { country } => admin.unblock_country(&country).await?,
            GodModeCommands::InvalidateJwt => admin.invalidate_all_jwt().await?,
        };
        tracing::warn!(message = %response.message, "god mode change applied");
        println!("{}", or_dash(Some(response.message.as_str())));
        Ok(())
    }
}

fn print_services(services: &[voketag_core::ServiceStatus]) {
    for service in services {
        let latency = service
            .latency_ms
            .map_or_else(|| "-".to_string(), |ms| format!("{ms:.0}ms"));
        println!("  {:<16} {:<10} {latency}", service.service, service.status);
    }
}

fn audit_line(entry: &AuditLogEntry) {
    println!(
        "{:<26} {:<12} {:<20} {:<38} {}",
        or_dash(entry.created_at.as_deref()),
        or_dash(entry.entity_type.as_deref()),
        or_dash(entry.action.as_deref()),
        or_dash(entry.entity_id.as_deref()),
        or_dash(entry.user_id.as_deref())
    );
}
