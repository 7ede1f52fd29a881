use clap::Subcommand;
use voketag_client::admin::AnchorFilter;
use voketag_core::Result;

use crate::context::Context;
use crate::output::{or_dash, print_json};

#[derive(Debug, Subcommand)]
pub enum AnchorsCommands {
    /// List anchors
    #[command(visible_alias = "ls")]
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        batch_id: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long)]
        skip: Option<u32>,
    },

    /// Resubmit a failed anchor
    Retry { anchor_id: String },
}

impl AnchorsCommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let admin = &ctx.clients.admin;
        match self {
            AnchorsCommands::List {
                status,
                batch_id,
                limit,
                skip,
            } => {
                let anchors = admin
                    .list_anchors(&AnchorFilter {
                        skip,
                        limit: Some(limit),
                        status,
                        batch_id,
                    })
                    .await?;
                if ctx.json {
                    return print_json(&anchors);
                }
                for anchor in &anchors.anchors {
                    println!(
                        "{:<38} {:<38} {:<14} {}",
                        anchor.id,
                        anchor.batch_id,
                        anchor.status,
                        or_dash(anchor.transaction_id.as_deref())
                    );
                }
                println!("{} anchor(s)", anchors.total);
                Ok(())
            }
            AnchorsCommands::Retry { anchor_id } => {
                let response = admin.retry_anchor(&anchor_id).await?;
                print_json(&response)
            }
        }
    }
}
