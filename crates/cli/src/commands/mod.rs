use clap::Subcommand;
use voketag_core::Result;

pub mod admin;
pub mod anchors;
pub mod auth;
pub mod batch;
pub mod consumer;
pub mod csv;
pub mod factory;
pub mod health;
pub mod merkle;

use self::admin::AdminCommands;
use self::anchors::AnchorsCommands;
use self::auth::AuthCommands;
use self::batch::BatchCommands;
use self::consumer::ReportKind;
use self::csv::CsvCommands;
use self::factory::FactoryCommands;
use crate::context::Context;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate CSV files and build NTAG exports
    Csv {
        #[command(subcommand)]
        command: CsvCommands,
    },

    /// Create, anchor and inspect batches
    #[command(visible_alias = "b")]
    Batch {
        #[command(subcommand)]
        command: BatchCommands,
    },

    /// Show a batch's Merkle tree
    Merkle {
        batch_id: String,

        /// Toggle these nodes, as L/R paths from the root (e.g. LLR)
        #[arg(long = "expand", value_name = "PATH")]
        expand: Vec<String>,
    },

    /// List and retry blockchain anchors
    Anchors {
        #[command(subcommand)]
        command: AnchorsCommands,
    },

    /// Factory scans, audit log and settings
    Factory {
        #[command(subcommand)]
        command: FactoryCommands,
    },

    /// Check a tag code or verification URL
    Scan {
        /// Raw code or the URL read from the QR/NFC tag
        code: String,

        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,

        #[arg(long)]
        fingerprint: Option<String>,

        /// Do not retry once on failure
        #[arg(long)]
        no_retry: bool,
    },

    /// Report an irregular or fake product
    Report {
        code: String,

        #[arg(long)]
        reason: String,

        #[arg(long, default_value = "")]
        details: String,

        #[arg(long = "type", value_enum, default_value = "irregularity")]
        kind: ReportKind,
    },

    /// Verify a signed product token
    Verify {
        token: String,

        /// Report the verification as fraud with this reason
        #[arg(long, value_name = "REASON")]
        report_fraud: Option<String>,

        /// Details sent with --report-fraud
        #[arg(long, requires = "report_fraud")]
        details: Option<String>,
    },

    /// Log in, log out, show the current session
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Admin console
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Check the backends
    Health {
        /// Also check readiness endpoints
        #[arg(long)]
        ready: bool,
    },
}

impl Commands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            Commands::Csv { command } => command.execute(ctx).await,
            Commands::Batch { command } => command.execute(ctx).await,
            Commands::Merkle { batch_id, expand } => merkle::execute(ctx, &batch_id, &expand).await,
            Commands::Anchors { command } => command.execute(ctx).await,
            Commands::Factory { command } => command.execute(ctx).await,
            Commands::Scan {
                code,
                lat,
                lng,
                fingerprint,
                no_retry,
            } => consumer::scan(ctx, &code, lat, lng, fingerprint, no_retry).await,
            Commands::Report {
                code,
                reason,
                details,
                kind,
            } => consumer::report(ctx, code, reason, details, kind).await,
            Commands::Verify {
                token,
                report_fraud,
                details,
            } => consumer::verify(ctx, &token, report_fraud, details).await,
            Commands::Auth { command } => command.execute(ctx).await,
            Commands::Admin { command } => command.execute(ctx).await,
            Commands::Health { ready } => health::execute(ctx, ready).await,
        }
    }
}
