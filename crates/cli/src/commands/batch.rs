use clap::Subcommand;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use voketag_anchor::{
    parse_csv, validate_csv, AnchorWorkflow, PollOutcome, WorkflowEvent, WorkflowState,
};
use voketag_client::factory::BatchQuery;
use voketag_client::FactoryApi;
use voketag_core::Result;

use crate::commands::csv::read_csv;
use crate::context::{cancel_on_ctrl_c, Context};
use crate::output::{batch_line, batch_status, field, or_dash, print_json};

#[derive(Debug, Subcommand)]
pub enum BatchCommands {
    /// Create a batch from a CSV, upload it and wait for anchoring
    Anchor {
        file: PathBuf,

        /// Return once the CSV is uploaded
        #[arg(long)]
        no_wait: bool,
    },

    /// Current processing status
    Status { batch_id: String },

    /// Reprocess a failed batch
    Retry {
        batch_id: String,

        /// Poll until the batch settles again
        #[arg(long)]
        wait: bool,
    },

    /// List batches
    #[command(visible_alias = "ls")]
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        risk: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        date_from: Option<String>,
        #[arg(long)]
        date_to: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long)]
        skip: Option<u32>,
    },

    /// Batch details and antifraud events
    Show { batch_id: String },

    /// Serials generated for a batch
    Products { batch_id: String },

    /// Counters over the latest batches
    Summary,
}

impl BatchCommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let factory = &ctx.clients.factory;
        match self {
            BatchCommands::Anchor { file, no_wait } => anchor(ctx, &file, no_wait).await,
            BatchCommands::Status { batch_id } => {
                let status = factory.batch_status(&batch_id).await?;
                if ctx.json {
                    return print_json(&status);
                }
                batch_status(&status);
                Ok(())
            }
            BatchCommands::Retry { batch_id, wait } => {
                if wait {
                    let (mut workflow, printer) = workflow(ctx);
                    match workflow.retry(&batch_id).await {
                        Ok(outcome) => finish(ctx, workflow, printer, &batch_id, outcome).await,
                        Err(e) => {
                            drop(workflow);
                            let _ = printer.await;
                            Err(e)
                        }
                    }
                } else {
                    let response = factory.retry_batch(&batch_id).await?;
                    println!("{}", or_dash(Some(response.message.as_str())));
                    Ok(())
                }
            }
            BatchCommands::List {
                status,
                risk,
                search,
                date_from,
                date_to,
                limit,
                skip,
            } => {
                let batches = factory
                    .list_batches(&BatchQuery {
                        skip,
                        limit: Some(limit),
                        status,
                        risk,
                        date_from,
                        date_to,
                        search,
                    })
                    .await?;
                if ctx.json {
                    return print_json(&batches);
                }
                batches.iter().for_each(batch_line);
                Ok(())
            }
            BatchCommands::Show { batch_id } => {
                let (batch, events) = tokio::join!(
                    factory.get_batch(&batch_id),
                    factory.antifraud_events(&batch_id)
                );
                let batch = batch?;
                if ctx.json {
                    return print_json(&serde_json::json!({ "batch": batch, "antifraud_events": events }));
                }
                println!("Lote {}", batch.id);
                field("Status", batch.status);
                field("Produtos", batch.product_count);
                field("Criado em", or_dash(batch.created_at.as_deref()));
                field("Ancorado em", or_dash(batch.anchored_at.as_deref()));
                field("Merkle root", or_dash(batch.merkle_root.as_deref()));
                field("Transação", or_dash(batch.blockchain_tx.as_deref()));
                if let Some(error) = &batch.error {
                    field("Erro", error);
                }
                if !events.is_empty() {
                    println!("Eventos antifraude:");
                    for event in &events {
                        let severity = event
                            .severity
                            .map(|s| format!("{s:?}").to_lowercase())
                            .unwrap_or_else(|| "-".to_string());
                        println!("  {} {:<8} {}", event.timestamp, severity, event.kind);
                    }
                }
                Ok(())
            }
            BatchCommands::Products { batch_id } => {
                let products = factory.batch_products(&batch_id).await;
                if ctx.json {
                    return print_json(&products);
                }
                for product in &products {
                    println!(
                        "{:<24} {}",
                        product.serial_number,
                        or_dash(product.verification_url.as_deref())
                    );
                }
                Ok(())
            }
            BatchCommands::Summary => {
                let summary = factory.batch_summary().await?;
                if ctx.json {
                    return print_json(&summary);
                }
                field("Lotes", summary.total_batches);
                field("Pendentes", summary.pending_batches);
                field("Com erro", summary.error_batches);
                field("Tags geradas", summary.total_tags);
                field("Taxa de risco", format!("{}%", summary.risk_rate()));
                println!("Últimas ancoragens:");
                summary.last_anchorages.iter().for_each(batch_line);
                Ok(())
            }
        }
    }
}

type Printer = JoinHandle<()>;

/// Workflow over the factory API whose log lines are printed as they happen
fn workflow(ctx: &Context) -> (AnchorWorkflow<FactoryApi>, Printer) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let workflow = AnchorWorkflow::new(Arc::new(ctx.clients.factory.clone()), ctx.config.polling)
        .with_events(tx);
    cancel_on_ctrl_c(workflow.cancellation_token());

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let WorkflowEvent::Log(line) = event {
                eprintln!("{line}");
            }
        }
    });
    (workflow, printer)
}

async fn anchor(ctx: &Context, file: &std::path::Path, no_wait: bool) -> Result<()> {
    let content = read_csv(file).await?;
    let preflight = validate_csv(&parse_csv(&content));
    if !preflight.is_clean() {
        tracing::warn!(
            invalid = preflight.invalid,
            duplicates = preflight.duplicates,
            risk = preflight.risk_score,
            "CSV has rows the backend will likely reject"
        );
    }

    let file_name = file
        .file_name()
        .map_or_else(|| "batch.csv".to_string(), |n| n.to_string_lossy().into_owned());

    let (mut workflow, printer) = workflow(ctx);
    if no_wait {
        let created = workflow.submit(&file_name, &content).await;
        drop(workflow);
        let _ = printer.await;
        let created = created?;
        if ctx.json {
            return print_json(&created);
        }
        println!("{}", created.batch_id);
        return Ok(());
    }

    let anchored = workflow.anchor(&file_name, &content).await;
    let (created, outcome) = match anchored {
        Ok(done) => done,
        Err(e) => {
            drop(workflow);
            let _ = printer.await;
            return Err(e);
        }
    };
    finish(ctx, workflow, printer, &created.batch_id, outcome).await
}

/// Flush the log, print the final state and map the outcome to an exit status
async fn finish(
    ctx: &Context,
    workflow: AnchorWorkflow<FactoryApi>,
    printer: Printer,
    batch_id: &str,
    outcome: PollOutcome,
) -> Result<()> {
    let state = workflow.state().clone();
    drop(workflow);
    let _ = printer.await;

    if ctx.json {
        print_json(&serde_json::json!({
            "batch_id": batch_id,
            "success": outcome.is_success(),
            "status": match &outcome {
                PollOutcome::Completed(s) | PollOutcome::Failed(s) => Some(s),
                _ => None,
            },
        }))?;
    } else if let WorkflowState::Success {
        merkle_root,
        blockchain_tx,
        ..
    } = &state
    {
        println!("Lote {batch_id} ancorado");
        field("Merkle root", or_dash(merkle_root.as_deref()));
        field("Transação", or_dash(blockchain_tx.as_deref()));
    }

    outcome.into_result(batch_id, &ctx.config.polling).map(|_| ())
}
